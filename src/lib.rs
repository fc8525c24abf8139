//! # magikplat
//!
//! **OCI Platform Selection for Multi-Platform Images**
//!
//! This crate decides which entries of an OCI image index can run on a host,
//! and in which order they should be preferred. It is the platform half of
//! image resolution: a registry client hands it the `platform` objects of an
//! index and gets back the descriptor to pull.
//!
//! # Architecture Overview
//!
//! ```text
//!   "windows(10.0.20348)/amd64"
//!              │
//!              ▼
//!   ┌──────────────────┐  raw   ┌──────────────────┐
//!   │ specifier::parse │ ─────► │   normalize()    │
//!   └──────────────────┘        └────────┬─────────┘
//!                                        │ Platform
//!                                        ▼
//!   ┌──────────────────┐        ┌──────────────────┐     ┌─────────────────────┐
//!   │ Host             │ ─────► │ Matcher          │ ──► │ CompatibilityMatrix │
//!   │  HostInfo        │default │  variant order   │     │  (Windows builds)   │
//!   │  cpu variant     │matcher │  OsVersionStrat. │     └─────────────────────┘
//!   │  ConfigLoader    │        └────────┬─────────┘
//!   └──────────────────┘                 ▼
//!                               ┌──────────────────┐
//!                               │ Comparator       │
//!                               │  most preferred  │
//!                               │  first           │
//!                               └──────────────────┘
//! ```
//!
//! # Specifier Grammar
//!
//! | Form                          | Example                          |
//! |-------------------------------|----------------------------------|
//! | `arch`                        | `arm64` (host OS implied)        |
//! | `os`                          | `linux` (host arch implied)      |
//! | `os/arch`                     | `linux/amd64`                    |
//! | `os/arch/variant`             | `linux/arm/v7`                   |
//! | `os(osVersion)[/arch[/var]]`  | `windows(10.0.17763)/amd64`      |
//!
//! Wildcards (`*/arm64`) are not supported.
//!
//! # Windows Compatibility
//!
//! Windows containers are matched by OS build through an explicit table of
//! release pairs (see [`compat`]). An image without an OS version matches any
//! Windows host. Among matching Windows images, the host's exact build is
//! preferred, then the highest servicing revision.
//!
//! # Concurrency
//!
//! Parsing, normalization, matching and ordering are pure. [`Host`] memoizes
//! CPU detection and the configuration overlay so concurrent first callers
//! share a single result.
//!
//! # Example
//!
//! ```rust,ignore
//! use magikplat::{Host, Platform};
//!
//! let host = Host::native();
//! let comparator = host.default_comparator();
//!
//! let mut candidates: Vec<Platform> = ["linux/amd64", "linux/arm64/v8", "windows/amd64"]
//!     .iter()
//!     .map(|s| host.parse(s))
//!     .collect::<magikplat::Result<_>>()?;
//!
//! comparator.sort(&mut candidates);
//! let selected = comparator.best_match(&candidates);
//! ```

pub mod compat;
pub mod config;
pub mod constants;
pub mod cpu;
pub mod error;
pub mod host;
pub mod matcher;
pub mod normalize;
pub mod platform;
pub mod specifier;

// Re-exports
pub use compat::{CompatibilityMatrix, WindowsOsVersion};
pub use config::{ConfigLoader, PlatformConfig};
pub use constants::*;
pub use cpu::{ArmCpuInfo, HostInfo, NativeHost};
pub use error::{Error, Result};
pub use host::Host;
pub use matcher::{variant_satisfies, Comparator, Matcher, OsVersionStrategy};
pub use normalize::normalize;
pub use platform::{format, format_all, Platform};
pub use specifier::{parse, parse_with_defaults};
