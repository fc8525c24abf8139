//! CPU variant detection.
//!
//! Classifies the running host's ARM ISA revision (`v5` … `v8`) or AMD64
//! microarchitecture level (`v1` … `v4`). Raw identification comes from a
//! [`HostInfo`] provider so that detection can be stubbed in tests; the
//! classification itself is pure.
//!
//! | Query     | ARM / ARM64           | AMD64                  | Other |
//! |-----------|-----------------------|------------------------|-------|
//! | plain     | ISA variant           | `""`                   | `""`  |
//! | maximum   | ISA variant           | microarchitecture level| `""`  |
//!
//! Memoization lives in [`crate::host::Host`].

use std::collections::HashSet;

use crate::constants::{
    AMD64_V2_FEATURES, AMD64_V3_FEATURES, AMD64_V4_FEATURES, ARCH_AMD64, ARCH_ARM, ARCH_ARM64,
    OS_DARWIN, OS_LINUX, OS_WINDOWS,
};
use crate::error::{Error, Result};

/// Variant reported when the ISA field is present but not recognized.
pub const UNKNOWN_VARIANT: &str = "unknown";

/// Raw ARM identification as found in `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmCpuInfo {
    /// `CPU architecture` field (`7`, `8`, `AArch64`, ...).
    pub architecture: String,
    /// `model name` field, if present.
    pub model_name: Option<String>,
}

/// Source of host identification.
///
/// Implementations answer with raw data only; classification and caching
/// happen in this crate.
pub trait HostInfo: Send + Sync {
    /// OS name (`linux`, `windows`, `darwin`, ...).
    fn os(&self) -> String;

    /// Architecture name (`amd64`, `arm64`, `arm`, ...).
    fn architecture(&self) -> String;

    /// Host OS version, where one is meaningful (Windows).
    fn os_version(&self) -> Option<String>;

    /// Raw ARM identification.
    fn arm_cpu(&self) -> Result<ArmCpuInfo>;

    /// Names of supported x86 instruction set extensions.
    fn amd64_features(&self) -> Result<HashSet<String>>;
}

/// Returns true for 32- and 64-bit ARM.
pub fn is_arm_arch(architecture: &str) -> bool {
    architecture == ARCH_ARM || architecture == ARCH_ARM64
}

/// Plain CPU variant for `host`. AMD64 hosts always report `""`.
pub fn detect_variant(host: &dyn HostInfo) -> Result<String> {
    let os = host.os();
    let arch = host.architecture();
    if !is_arm_arch(&arch) {
        return Ok(String::new());
    }
    if os == OS_WINDOWS || os == OS_DARWIN {
        return Ok(fixed_arm_variant(&arch).to_string());
    }
    let info = host.arm_cpu()?;
    Ok(classify_arm_variant(&arch, &info))
}

/// Maximum CPU variant for `host`, including the AMD64 microarchitecture
/// level.
pub fn detect_maximum_variant(host: &dyn HostInfo) -> Result<String> {
    if host.architecture() == ARCH_AMD64 {
        let features = host.amd64_features()?;
        return Ok(classify_amd64_level(&features).to_string());
    }
    detect_variant(host)
}

/// Windows and macOS only ship ARMv7 for 32-bit and ARMv8 for 64-bit.
fn fixed_arm_variant(arch: &str) -> &'static str {
    match arch {
        ARCH_ARM64 => "v8",
        ARCH_ARM => "v7",
        _ => UNKNOWN_VARIANT,
    }
}

/// Maps a `CPU architecture` value to a variant.
pub fn classify_arm_variant(arch: &str, info: &ArmCpuInfo) -> String {
    let field = info.architecture.trim().to_ascii_lowercase();

    // Raspberry Pi ARMv6 kernels report "7".
    if arch == ARCH_ARM && field == "7" {
        let armv6 = info
            .model_name
            .as_deref()
            .is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("armv6-compatible"));
        if armv6 {
            return "v6".to_string();
        }
    }

    let variant = match field.as_str() {
        "8" | "aarch64" => "v8",
        "7" | "7m" | "?(12)" | "?(13)" | "?(14)" | "?(15)" | "?(16)" | "?(17)" => "v7",
        "6" | "6tej" => "v6",
        "5" | "5t" | "5te" | "5tej" => "v5",
        "4" | "4t" => "v4",
        "3" => "v3",
        _ => UNKNOWN_VARIANT,
    };
    variant.to_string()
}

/// Maps supported x86 extensions to an x86-64 microarchitecture level.
pub fn classify_amd64_level(features: &HashSet<String>) -> &'static str {
    let has_all = |required: &[&str]| required.iter().all(|f| features.contains(*f));

    if !has_all(AMD64_V2_FEATURES) {
        "v1"
    } else if !has_all(AMD64_V3_FEATURES) {
        "v2"
    } else if !has_all(AMD64_V4_FEATURES) {
        "v3"
    } else {
        "v4"
    }
}

/// Extracts `key` from `/proc/cpuinfo`-formatted text (first occurrence).
pub fn cpuinfo_field(cpuinfo: &str, key: &str) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(key)
            .then(|| value.trim().to_string())
    })
}

// =============================================================================
// Native Host
// =============================================================================

/// [`HostInfo`] for the machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeHost;

impl NativeHost {
    pub fn new() -> Self {
        Self
    }
}

impl HostInfo for NativeHost {
    fn os(&self) -> String {
        match std::env::consts::OS {
            "macos" => OS_DARWIN.to_string(),
            other => other.to_string(),
        }
    }

    fn architecture(&self) -> String {
        let arch = match std::env::consts::ARCH {
            "x86_64" => ARCH_AMD64,
            "aarch64" => ARCH_ARM64,
            "arm" => ARCH_ARM,
            "x86" => "386",
            "powerpc64" if cfg!(target_endian = "little") => "ppc64le",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            other => other,
        };
        arch.to_string()
    }

    fn os_version(&self) -> Option<String> {
        windows_version()
    }

    fn arm_cpu(&self) -> Result<ArmCpuInfo> {
        if self.os() != OS_LINUX {
            return Err(Error::Detection(format!(
                "no ARM identification source on {}",
                self.os()
            )));
        }
        let cpuinfo = std::fs::read_to_string(crate::constants::PROC_CPUINFO).map_err(|e| {
            Error::Detection(format!(
                "failed to read {}: {}",
                crate::constants::PROC_CPUINFO,
                e
            ))
        })?;
        let architecture = cpuinfo_field(&cpuinfo, "CPU architecture").ok_or_else(|| {
            Error::Detection("'CPU architecture' not found in cpuinfo".to_string())
        })?;
        Ok(ArmCpuInfo {
            architecture,
            model_name: cpuinfo_field(&cpuinfo, "model name"),
        })
    }

    fn amd64_features(&self) -> Result<HashSet<String>> {
        x86_features()
    }
}

#[cfg(target_arch = "x86_64")]
fn x86_features() -> Result<HashSet<String>> {
    let mut features = HashSet::new();
    macro_rules! probe {
        ($($feature:tt),* $(,)?) => {
            $(
                if std::arch::is_x86_feature_detected!($feature) {
                    features.insert($feature.to_string());
                }
            )*
        };
    }
    probe!(
        "cmpxchg16b", "popcnt", "sse3", "sse4.1", "sse4.2", "ssse3", "avx", "avx2", "bmi1", "bmi2",
        "f16c", "fma", "lzcnt", "movbe", "xsave", "avx512f", "avx512bw", "avx512cd", "avx512dq",
        "avx512vl",
    );
    Ok(features)
}

#[cfg(not(target_arch = "x86_64"))]
fn x86_features() -> Result<HashSet<String>> {
    Err(Error::Detection(
        "x86 feature detection requires an x86_64 host".to_string(),
    ))
}

/// Reads `major.minor.build` from `cmd /c ver`.
#[cfg(windows)]
fn windows_version() -> Option<String> {
    use std::process::Command;

    let output = Command::new("cmd").args(["/c", "ver"]).output().ok()?;
    let text = String::from_utf8(output.stdout).ok()?;
    let start = text.find("Version ")? + "Version ".len();
    let version = text[start..].trim().trim_end_matches(']');
    let mut parts = version.split('.');
    let (major, minor, build) = (parts.next()?, parts.next()?, parts.next()?);
    Some(format!("{}.{}.{}", major, minor, build))
}

#[cfg(not(windows))]
fn windows_version() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(field: &str, model: Option<&str>) -> ArmCpuInfo {
        ArmCpuInfo {
            architecture: field.to_string(),
            model_name: model.map(String::from),
        }
    }

    #[test]
    fn test_classify_arm_fields() {
        assert_eq!(classify_arm_variant("arm64", &arm("8", None)), "v8");
        assert_eq!(classify_arm_variant("arm64", &arm("AArch64", None)), "v8");
        assert_eq!(classify_arm_variant("arm", &arm("7", None)), "v7");
        assert_eq!(classify_arm_variant("arm", &arm("?(12)", None)), "v7");
        assert_eq!(classify_arm_variant("arm", &arm("6TEJ", None)), "v6");
        assert_eq!(classify_arm_variant("arm", &arm("5te", None)), "v5");
        assert_eq!(classify_arm_variant("arm", &arm("4t", None)), "v4");
        assert_eq!(classify_arm_variant("arm", &arm("3", None)), "v3");
        assert_eq!(classify_arm_variant("arm", &arm("42", None)), UNKNOWN_VARIANT);
    }

    #[test]
    fn test_raspberry_pi_armv6_quirk() {
        let info = arm("7", Some("ARMv6-compatible processor rev 7 (v6l)"));
        assert_eq!(classify_arm_variant("arm", &info), "v6");
        // only 32-bit ARM is affected
        assert_eq!(classify_arm_variant("arm64", &info), "v7");
    }

    #[test]
    fn test_classify_amd64_levels() {
        let set = |names: &[&[&str]]| -> HashSet<String> {
            names
                .iter()
                .flat_map(|n| n.iter().map(|s| s.to_string()))
                .collect()
        };
        assert_eq!(classify_amd64_level(&HashSet::new()), "v1");
        assert_eq!(classify_amd64_level(&set(&[AMD64_V2_FEATURES])), "v2");
        assert_eq!(
            classify_amd64_level(&set(&[AMD64_V2_FEATURES, AMD64_V3_FEATURES])),
            "v3"
        );
        assert_eq!(
            classify_amd64_level(&set(&[
                AMD64_V2_FEATURES,
                AMD64_V3_FEATURES,
                AMD64_V4_FEATURES
            ])),
            "v4"
        );
        // AVX-512 without the v3 tier does not skip ahead
        assert_eq!(
            classify_amd64_level(&set(&[AMD64_V2_FEATURES, AMD64_V4_FEATURES])),
            "v2"
        );
    }

    #[test]
    fn test_cpuinfo_field() {
        let cpuinfo = "processor\t: 0\nmodel name\t: ARMv7 Processor rev 4 (v7l)\nCPU architecture: 7\n";
        assert_eq!(cpuinfo_field(cpuinfo, "CPU architecture").as_deref(), Some("7"));
        assert_eq!(
            cpuinfo_field(cpuinfo, "model name").as_deref(),
            Some("ARMv7 Processor rev 4 (v7l)")
        );
        assert_eq!(cpuinfo_field(cpuinfo, "Features"), None);
    }

    #[test]
    fn test_native_host_names_are_canonical() {
        let host = NativeHost::new();
        assert!(!host.os().is_empty());
        assert_ne!(host.os(), "macos");
        assert_ne!(host.architecture(), "x86_64");
        assert_ne!(host.architecture(), "aarch64");
    }
}
