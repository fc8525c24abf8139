//! Platform configuration overlay.
//!
//! Operators may extend the built-in tables with a TOML file at
//! [`PLATFORM_CONFIG_PATH`]:
//!
//! ```toml
//! features = ["win32k"]
//!
//! [compatibilities]
//! # host build = guest build(s)
//! "20348" = "17763"
//! "26100" = "17763, 10.0.19041"
//! ```
//!
//! A missing file is the common case and yields an empty overlay. A file that
//! exists but cannot be read or parsed is an [`Error::Config`].
//!
//! The loader reads the file at most once; both success and failure are
//! cached for the lifetime of the loader.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::compat::WindowsOsVersion;
use crate::constants::PLATFORM_CONFIG_PATH;
use crate::error::{Error, Result};

/// Parsed and validated overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Extra host OS features, in file order.
    pub features: Vec<String>,
    /// Host build → guest builds it may run.
    pub compatibilities: BTreeMap<u32, Vec<u32>>,
}

/// On-disk shape of the overlay.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    features: Vec<String>,
    compatibilities: BTreeMap<String, String>,
}

impl PlatformConfig {
    /// Parses overlay content. `path` is only used for error reporting.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut compatibilities: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for (host, guests) in &raw.compatibilities {
            let host_build = parse_build(host).ok_or_else(|| Error::Config {
                path: path.to_path_buf(),
                reason: format!("invalid host build {:?}", host),
            })?;
            let entry = compatibilities.entry(host_build).or_default();
            for guest in guests.split(',').map(str::trim).filter(|g| !g.is_empty()) {
                let guest_build = parse_build(guest).ok_or_else(|| Error::Config {
                    path: path.to_path_buf(),
                    reason: format!("invalid guest build {:?} for host {}", guest, host),
                })?;
                entry.push(guest_build);
            }
        }

        Ok(Self {
            features: raw.features,
            compatibilities,
        })
    }

    /// Iterates `(host_build, guest_build)` pairs declared by the overlay.
    pub fn compatibility_pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.compatibilities
            .iter()
            .flat_map(|(host, guests)| guests.iter().map(move |guest| (*host, *guest)))
    }
}

/// Accepts a bare build (`20348`) or a dotted version (`10.0.20348[.rev]`).
fn parse_build(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.contains('.') {
        s.parse::<WindowsOsVersion>().ok().map(|v| v.build)
    } else {
        s.parse().ok()
    }
}

/// Memoizing overlay reader.
#[derive(Debug)]
pub struct ConfigLoader {
    path: PathBuf,
    loaded: OnceLock<Result<PlatformConfig>>,
}

impl Default for ConfigLoader {
    /// Loader for the well-known [`PLATFORM_CONFIG_PATH`].
    fn default() -> Self {
        Self::new(PLATFORM_CONFIG_PATH)
    }
}

impl ConfigLoader {
    /// Creates a loader for `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceLock::new(),
        }
    }

    /// Creates a loader that is already resolved to `config`.
    pub fn from_config(config: PlatformConfig) -> Self {
        let loader = Self::new(PathBuf::new());
        let _ = loader.loaded.set(Ok(config));
        loader
    }

    /// Returns the overlay path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the overlay, reading the file on first use.
    ///
    /// A missing file yields an empty overlay. Failures are cached; later
    /// calls return the same error without touching the filesystem again.
    pub fn load(&self) -> Result<&PlatformConfig> {
        self.loaded
            .get_or_init(|| read_config(&self.path))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the overlay or panics.
    ///
    /// For callers that must not proceed with a partially configured matrix.
    pub fn must_load(&self) -> &PlatformConfig {
        match self.load() {
            Ok(config) => config,
            Err(e) => panic!("platform config is required: {}", e),
        }
    }
}

fn read_config(path: &Path) -> Result<PlatformConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no platform config, using built-in tables");
            return Ok(PlatformConfig::default());
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read platform config");
            return Err(Error::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let config = PlatformConfig::from_toml(&content, path).inspect_err(|e| {
        warn!(path = %path.display(), error = %e, "malformed platform config");
    })?;
    debug!(
        path = %path.display(),
        features = config.features.len(),
        hosts = config.compatibilities.len(),
        "loaded platform config"
    );
    Ok(config)
}
