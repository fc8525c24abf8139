//! Alias resolution for OS, architecture and variant names.
//!
//! | Input (any case)           | Canonical            |
//! |----------------------------|----------------------|
//! | `i386`, `386`              | `386`                |
//! | `x86_64`, `x86-64`, `amd64`| `amd64`              |
//! | `aarch64`, `arm64`         | `arm64`              |
//! | `armhf`                    | `arm` (no variant)   |
//! | `armel`                    | `arm` / `v6`         |
//! | `macos`                    | `darwin`             |
//!
//! A blank `arm` variant is left blank: it means "any compatible ARM
//! variant", not an implied `v7`.

use crate::constants::{ARCH_386, ARCH_AMD64, ARCH_ARM, ARCH_ARM64, OS_DARWIN};
use crate::platform::Platform;

/// Returns the canonical form of a platform. Never fails.
pub fn normalize(platform: Platform) -> Platform {
    let (architecture, variant) = normalize_arch(&platform.architecture, &platform.variant);
    Platform {
        os: normalize_os(&platform.os),
        architecture,
        variant,
        ..platform
    }
}

/// Returns the canonical OS name.
pub fn normalize_os(os: &str) -> String {
    let os = os.to_ascii_lowercase();
    match os.as_str() {
        "macos" => OS_DARWIN.to_string(),
        _ => os,
    }
}

/// Returns the canonical `(architecture, variant)` pair.
pub fn normalize_arch(architecture: &str, variant: &str) -> (String, String) {
    let architecture = architecture.to_ascii_lowercase();
    let variant = prefix_variant(&variant.to_ascii_lowercase());

    match architecture.as_str() {
        "i386" | "386" => (ARCH_386.to_string(), String::new()),
        "x86_64" | "x86-64" | "amd64" => (ARCH_AMD64.to_string(), variant),
        "aarch64" | "arm64" => {
            let variant = match variant.as_str() {
                "v8.0" => "v8".to_string(),
                "v9.0" => "v9".to_string(),
                _ => variant,
            };
            (ARCH_ARM64.to_string(), variant)
        }
        "armhf" => (ARCH_ARM.to_string(), String::new()),
        "armel" => (ARCH_ARM.to_string(), "v6".to_string()),
        _ => (architecture, variant),
    }
}

/// Numeric variants (`7`, `8.1`) gain a `v` prefix.
fn prefix_variant(variant: &str) -> String {
    if variant.starts_with(|c: char| c.is_ascii_digit()) {
        format!("v{}", variant)
    } else {
        variant.to_string()
    }
}
