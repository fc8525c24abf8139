//! Host default platform.
//!
//! [`Host`] owns a [`HostInfo`] provider, a [`ConfigLoader`] and the memoized
//! CPU variant results. Everything that depends on "the machine we run on"
//! goes through it:
//!
//! | Method                         | Variant source         | Overlay |
//! |--------------------------------|------------------------|---------|
//! | [`Host::default_spec`]         | plain                  | no      |
//! | [`Host::default_matcher`]      | maximum                | no      |
//! | [`Host::configured_spec`]      | plain                  | yes     |
//! | [`Host::configured_matcher`]   | maximum                | yes     |
//!
//! Detection runs at most once per `Host`. A failure is logged once and
//! degrades to an empty variant, which matches any image variant.

use std::fmt;
use std::sync::OnceLock;

use tracing::{debug, error, warn};

use crate::compat::CompatibilityMatrix;
use crate::config::{ConfigLoader, PlatformConfig};
use crate::constants::OS_WINDOWS;
use crate::cpu::{self, HostInfo, NativeHost, UNKNOWN_VARIANT};
use crate::error::Result;
use crate::matcher::{Comparator, Matcher};
use crate::normalize::normalize;
use crate::platform::{format_all, Platform};
use crate::specifier::parse_with_defaults;

/// The machine platforms are resolved against.
pub struct Host {
    info: Box<dyn HostInfo>,
    config: ConfigLoader,
    variant: OnceLock<String>,
    maximum_variant: OnceLock<String>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("os", &self.info.os())
            .field("architecture", &self.info.architecture())
            .field("config", &self.config)
            .field("variant", &self.variant.get())
            .field("maximum_variant", &self.maximum_variant.get())
            .finish_non_exhaustive()
    }
}

impl Host {
    /// Creates a host backed by `info` and the well-known config path.
    pub fn new(info: impl HostInfo + 'static) -> Self {
        Self {
            info: Box::new(info),
            config: ConfigLoader::default(),
            variant: OnceLock::new(),
            maximum_variant: OnceLock::new(),
        }
    }

    /// Host for the machine this process runs on.
    pub fn native() -> Self {
        Self::new(NativeHost::new())
    }

    /// Process-wide native host used by the free-standing convenience
    /// functions (`str::parse::<Platform>`, [`crate::specifier::parse`]).
    pub fn shared() -> &'static Host {
        static SHARED: OnceLock<Host> = OnceLock::new();
        SHARED.get_or_init(Host::native)
    }

    /// Replaces the configuration overlay loader.
    pub fn with_config(mut self, config: ConfigLoader) -> Self {
        self.config = config;
        self
    }

    /// The configuration overlay loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Plain CPU variant (`v7`, `v8`; empty on AMD64).
    pub fn cpu_variant(&self) -> &str {
        self.variant
            .get_or_init(|| self.detect("variant", cpu::detect_variant))
    }

    /// Maximum CPU variant, including the AMD64 microarchitecture level.
    pub fn cpu_variant_maximum(&self) -> &str {
        self.maximum_variant
            .get_or_init(|| self.detect("maximum variant", cpu::detect_maximum_variant))
    }

    fn detect(&self, query: &str, detector: fn(&dyn HostInfo) -> Result<String>) -> String {
        let os = self.info.os();
        let arch = self.info.architecture();
        match detector(self.info.as_ref()) {
            Ok(variant) if variant == UNKNOWN_VARIANT => {
                warn!(%os, %arch, query, "unrecognized cpu variant, treating as unspecified");
                String::new()
            }
            Ok(variant) => {
                debug!(%os, %arch, query, %variant, "detected cpu variant");
                variant
            }
            Err(e) => {
                error!(%os, %arch, query, error = %e, "cpu variant detection failed");
                String::new()
            }
        }
    }

    /// Values that fill the missing half of a single-component specifier.
    pub fn shorthand_defaults(&self) -> Platform {
        Platform::new(self.info.os(), self.info.architecture()).with_variant(self.cpu_variant())
    }

    /// Parses and normalizes a specifier against this host.
    pub fn parse(&self, specifier: &str) -> Result<Platform> {
        parse_with_defaults(specifier, &self.shorthand_defaults()).map(normalize)
    }

    /// The host's own platform.
    pub fn default_spec(&self) -> Platform {
        let mut platform = Platform::new(self.info.os(), self.info.architecture())
            .with_variant(self.cpu_variant());
        if platform.os == OS_WINDOWS {
            platform.os_version = self.info.os_version().unwrap_or_default();
        }
        normalize(platform)
    }

    /// The host's own platform as a v2 specifier.
    pub fn default_string(&self) -> String {
        format_all(&self.default_spec())
    }

    /// Matcher for the host, maximally permissive on CPU variant.
    pub fn default_matcher(&self) -> Matcher {
        Matcher::new(self.matcher_reference(self.default_spec()))
    }

    /// Comparator around [`Host::default_matcher`].
    pub fn default_comparator(&self) -> Comparator {
        Comparator::new(self.default_matcher())
    }

    /// The host's platform with overlay features appended.
    pub fn configured_spec(&self) -> Result<Platform> {
        Ok(self.overlay_spec(self.config.load()?))
    }

    /// Matcher for the host using the overlay's features and declared
    /// Windows compatibilities.
    pub fn configured_matcher(&self) -> Result<Matcher> {
        Ok(self.overlay_matcher(self.config.load()?))
    }

    /// Like [`Host::configured_matcher`], but panics if the overlay cannot be
    /// loaded.
    pub fn must_configured_matcher(&self) -> Matcher {
        self.overlay_matcher(self.config.must_load())
    }

    fn overlay_spec(&self, config: &PlatformConfig) -> Platform {
        let mut platform = self.default_spec();
        for feature in &config.features {
            if !platform.os_features.contains(feature) {
                platform.os_features.push(feature.clone());
            }
        }
        platform
    }

    fn overlay_matcher(&self, config: &PlatformConfig) -> Matcher {
        Matcher::with_matrix(
            self.matcher_reference(self.overlay_spec(config)),
            CompatibilityMatrix::with_overlay(config),
        )
    }

    fn matcher_reference(&self, mut spec: Platform) -> Platform {
        let maximum = self.cpu_variant_maximum();
        if !maximum.is_empty() {
            spec.variant = maximum.to_string();
        }
        spec
    }
}
