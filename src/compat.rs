//! Windows host/guest build compatibility.
//!
//! Process-isolated Windows containers only run where the host kernel
//! supports the guest's user mode. Support follows product policy, not build
//! ordering: Server 2022 cannot run Server 2019 images, while Server 2025 can
//! run Server 2022 images. The rules are therefore kept as data:
//!
//! ```text
//!   1. same major.minor.build          → compatible (revision ignored)
//!   2. declared (host, guest) pair     → compatible
//!   3. anything else                   → not compatible
//! ```
//!
//! The declared pairs start from [`WINDOWS_COMPAT_PAIRS`] and may be extended
//! by the platform configuration overlay.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::config::PlatformConfig;
use crate::constants::WINDOWS_COMPAT_PAIRS;
use crate::error::{Error, Result};

/// Windows OS version `major.minor.build[.revision]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowsOsVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl WindowsOsVersion {
    /// Creates a version with revision 0.
    pub const fn new(major: u32, minor: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision: 0,
        }
    }

    /// Windows 10/11 and Server 2016+ all report `10.0.<build>`.
    pub const fn from_build(build: u32) -> Self {
        Self::new(10, 0, build)
    }

    /// Returns true if both versions share major, minor and build.
    pub fn same_build(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.build == other.build
    }
}

impl FromStr for WindowsOsVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid(s, "expected major.minor.build[.revision]");

        let parts: Vec<&str> = s.split('.').collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(invalid());
        }
        let mut fields = [0u32; 4];
        for (field, part) in fields.iter_mut().zip(&parts) {
            *field = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self {
            major: fields[0],
            minor: fields[1],
            build: fields[2],
            revision: fields[3],
        })
    }
}

impl fmt::Display for WindowsOsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Table of Windows builds that may run on a host of another build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityMatrix {
    pairs: BTreeSet<(u32, u32)>,
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CompatibilityMatrix {
    /// Matrix holding only exact-build compatibility.
    pub fn empty() -> Self {
        Self {
            pairs: BTreeSet::new(),
        }
    }

    /// Matrix with the built-in release pairs.
    pub fn builtin() -> Self {
        Self {
            pairs: WINDOWS_COMPAT_PAIRS.iter().copied().collect(),
        }
    }

    /// Built-in matrix extended with the overlay's declared pairs.
    pub fn with_overlay(config: &PlatformConfig) -> Self {
        let mut matrix = Self::builtin();
        matrix.extend(config.compatibility_pairs());
        matrix
    }

    /// Declares that `guest_build` runs on `host_build`.
    pub fn declare(&mut self, host_build: u32, guest_build: u32) {
        self.pairs.insert((host_build, guest_build));
    }

    /// Returns true if `(host_build, guest_build)` is declared.
    pub fn is_declared(&self, host_build: u32, guest_build: u32) -> bool {
        self.pairs.contains(&(host_build, guest_build))
    }

    /// Iterates the declared pairs in ascending order.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pairs.iter().copied()
    }

    /// Returns true if a `guest` image may run on a `host`.
    pub fn compatible(&self, host: &WindowsOsVersion, guest: &WindowsOsVersion) -> bool {
        if host.same_build(guest) {
            return true;
        }
        host.major == guest.major
            && host.minor == guest.minor
            && self.is_declared(host.build, guest.build)
    }

    /// String-level check used by the matcher.
    ///
    /// Versions that do not parse are compatible only with the identical
    /// string.
    pub fn compatible_versions(&self, host: &str, guest: &str) -> bool {
        match (host.parse::<WindowsOsVersion>(), guest.parse::<WindowsOsVersion>()) {
            (Ok(host), Ok(guest)) => self.compatible(&host, &guest),
            _ => host == guest,
        }
    }
}

impl Extend<(u32, u32)> for CompatibilityMatrix {
    fn extend<T: IntoIterator<Item = (u32, u32)>>(&mut self, iter: T) {
        self.pairs.extend(iter);
    }
}
