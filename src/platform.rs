//! OCI platform descriptor and its specifier rendering.
//!
//! [`Platform`] mirrors the `platform` object of the OCI image-spec so that
//! descriptors lifted from an image index deserialize directly:
//!
//! ```json
//! {
//!   "architecture": "amd64",
//!   "os": "windows",
//!   "os.version": "10.0.20348.3091",
//!   "os.features": ["win32k"]
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::Host;

/// Platform descriptor (OS, architecture, variant, OS version, OS features).
///
/// Empty strings mean "unspecified". Values produced by
/// [`normalize`](crate::normalize::normalize) carry canonical lowercase names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    /// CPU architecture (`amd64`, `arm64`, `arm`, `386`, `s390x`, ...).
    pub architecture: String,
    /// Operating system (`linux`, `windows`, `darwin`, ...).
    pub os: String,
    /// OS version, only meaningful for `windows` (`10.0.20348.3091`).
    #[serde(rename = "os.version", default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,
    /// Required OS capability tags.
    #[serde(rename = "os.features", default, skip_serializing_if = "Vec::is_empty")]
    pub os_features: Vec<String>,
    /// Sub-architecture refinement (`v7`, `v8`, `v3`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
}

impl Platform {
    /// Creates a platform from an OS and an architecture.
    pub fn new(os: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            architecture: architecture.into(),
            ..Default::default()
        }
    }

    /// Sets the variant.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Sets the OS version.
    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = os_version.into();
        self
    }

    /// Sets the OS features.
    pub fn with_os_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.os_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Renders `os/arch[/variant]`.
    pub fn format(&self) -> String {
        format(self)
    }

    /// Renders `os[(osVersion)]/arch[/variant]`.
    pub fn format_all(&self) -> String {
        format_all(self)
    }

    /// Returns true for the Windows OS (after normalization).
    pub fn is_windows(&self) -> bool {
        self.os == crate::constants::OS_WINDOWS
    }
}

/// Renders the v1 specifier `os/arch[/variant]`.
///
/// The OS version is dropped; use [`format_all`] to keep it.
pub fn format(platform: &Platform) -> String {
    join(&platform.os, platform)
}

/// Renders the v2 specifier `os(osVersion)/arch[/variant]`.
///
/// Identical to [`format`] when the OS version is empty.
pub fn format_all(platform: &Platform) -> String {
    if platform.os_version.is_empty() {
        return format(platform);
    }
    join(&format!("{}({})", platform.os, platform.os_version), platform)
}

fn join(os: &str, platform: &Platform) -> String {
    if platform.variant.is_empty() {
        format!("{}/{}", os, platform.architecture)
    } else {
        format!("{}/{}/{}", os, platform.architecture, platform.variant)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_all(self))
    }
}

impl FromStr for Platform {
    type Err = Error;

    /// Parses and normalizes a specifier against the shared native host.
    fn from_str(s: &str) -> Result<Self> {
        Host::shared().parse(s)
    }
}
