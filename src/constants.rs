//! # Platform Constants
//!
//! Defines the well-known paths, canonical names, Windows release builds and
//! CPU feature tiers used throughout the crate. These constants are the
//! **single source of truth** for the compatibility data: the matcher, the
//! normalizer and the CPU variant detector all read from here.
//!
//! ## Modification Guidelines
//!
//! Before adding a Windows release:
//! 1. Add the build constant below with the release's marketing names
//! 2. Declare its compatible guest builds in [`WINDOWS_COMPAT_PAIRS`]
//! 3. Extend the matrix tests in `tests/compat_tests.rs`
//!
//! ## Cross-References
//!
//! - [`crate::compat`]: Consumes the release builds and declared pairs
//! - [`crate::normalize`]: Consumes the canonical names
//! - [`crate::cpu`]: Consumes the variant orders and AMD64 feature tiers
//! - [`crate::config`]: Consumes [`PLATFORM_CONFIG_PATH`]

// =============================================================================
// Configuration
// =============================================================================

/// Well-known location of the platform configuration overlay.
///
/// Absence of this file is not an error; the built-in tables are used as-is.
pub const PLATFORM_CONFIG_PATH: &str = "/etc/containerd/platform-config.toml";

// =============================================================================
// Canonical Names
// =============================================================================

/// Canonical OS name for Linux.
pub const OS_LINUX: &str = "linux";

/// Canonical OS name for macOS.
pub const OS_DARWIN: &str = "darwin";

/// Canonical OS name for Windows.
pub const OS_WINDOWS: &str = "windows";

/// Canonical 64-bit x86 architecture.
pub const ARCH_AMD64: &str = "amd64";

/// Canonical 64-bit ARM architecture.
pub const ARCH_ARM64: &str = "arm64";

/// Canonical 32-bit ARM architecture.
pub const ARCH_ARM: &str = "arm";

/// Canonical 32-bit x86 architecture.
pub const ARCH_386: &str = "386";

/// Architecture names recognized as a bare single-component specifier.
///
/// Anything not listed here is treated as an OS shorthand (`linux`, `macOS`).
/// Entries are lowercase; lookups are case-insensitive.
pub const KNOWN_ARCHITECTURES: &[&str] = &[
    "386", "i386", "amd64", "x86_64", "x86-64", "amd64p32", "arm", "armhf", "armel", "arm64",
    "aarch64", "arm64be", "armbe", "loong64", "mips", "mipsle", "mips64", "mips64le",
    "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv", "riscv64", "s390", "s390x",
    "sparc", "sparc64", "wasm",
];

// =============================================================================
// Windows Release Builds
// =============================================================================
//
// Compatibility between a Windows container host and guest is governed by
// product support policy, not build ordering. Two naming generations are kept
// because both appear in image manifests and operator configs.
// =============================================================================

/// Windows 10 1809 / Windows Server 2019 (Redstone 5).
pub const RS5: u32 = 17763;

/// Windows Server 2019 LTSC.
pub const LTSC2019: u32 = RS5;

/// Windows Server 2022 (21H2 server release).
pub const V21H2_SERVER: u32 = 20348;

/// Windows Server 2022 LTSC.
pub const LTSC2022: u32 = V21H2_SERVER;

/// Windows 11 22H2.
pub const V22H2_WIN11: u32 = 22621;

/// Windows 11 23H2.
pub const V23H2: u32 = 22631;

/// Windows Server 2025 LTSC (Windows 11 24H2 kernel).
pub const LTSC2025: u32 = 26100;

/// Declared `(host_build, guest_build)` pairs beyond exact build equality.
///
/// Releases before Server 2022 require an exact build match, so
/// [`LTSC2019`] never appears here.
pub const WINDOWS_COMPAT_PAIRS: &[(u32, u32)] = &[
    (V22H2_WIN11, LTSC2022),
    (V23H2, LTSC2022),
    (V23H2, V22H2_WIN11),
    (LTSC2025, LTSC2022),
    (LTSC2025, V22H2_WIN11),
    (LTSC2025, V23H2),
];

// =============================================================================
// CPU Variants
// =============================================================================

/// 32-bit ARM ISA variants, lowest first.
pub const ARM_VARIANTS: &[&str] = &["v5", "v6", "v7", "v8"];

/// AMD64 microarchitecture levels, lowest first.
pub const AMD64_VARIANTS: &[&str] = &["v1", "v2", "v3", "v4"];

/// Highest ARMv8 minor revision.
pub const ARM64_V8_MAX_MINOR: u32 = 9;

/// Highest ARMv9 minor revision.
pub const ARM64_V9_MAX_MINOR: u32 = 5;

/// ARMv9.N is a superset of ARMv8.(N + this offset).
pub const ARM64_V9_TO_V8_OFFSET: u32 = 5;

/// CPU features required for the x86-64-v2 level.
pub const AMD64_V2_FEATURES: &[&str] =
    &["cmpxchg16b", "popcnt", "sse3", "sse4.1", "sse4.2", "ssse3"];

/// CPU features required (on top of v2) for the x86-64-v3 level.
pub const AMD64_V3_FEATURES: &[&str] = &[
    "avx", "avx2", "bmi1", "bmi2", "f16c", "fma", "lzcnt", "movbe", "xsave",
];

/// CPU features required (on top of v3) for the x86-64-v4 level.
pub const AMD64_V4_FEATURES: &[&str] =
    &["avx512f", "avx512bw", "avx512cd", "avx512dq", "avx512vl"];

/// Path of the Linux CPU identification file.
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";
