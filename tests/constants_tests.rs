//! Tests for constants module.
//!
//! Validates the Windows release table and the variant ladders that the
//! matcher and comparator rely on.

use magikplat::*;

// =============================================================================
// Windows Builds
// =============================================================================

#[test]
fn test_release_builds_are_ascending() {
    let releases = [LTSC2019, LTSC2022, V22H2_WIN11, V23H2, LTSC2025];
    assert!(releases.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_compat_pairs_reference_known_builds() {
    let known = [LTSC2019, LTSC2022, V22H2_WIN11, V23H2, LTSC2025];
    for (host, guest) in WINDOWS_COMPAT_PAIRS {
        assert!(known.contains(host), "unknown host build {}", host);
        assert!(known.contains(guest), "unknown guest build {}", guest);
        // only newer hosts run older guests
        assert!(host > guest, "{} -> {} is not downlevel", host, guest);
    }
}

#[test]
fn test_ltsc2019_has_no_declared_pairs() {
    assert!(!WINDOWS_COMPAT_PAIRS
        .iter()
        .any(|(host, guest)| *host == LTSC2019 || *guest == LTSC2019));
}

// =============================================================================
// Variant Ladders
// =============================================================================

#[test]
fn test_variant_ladders_are_ordered() {
    assert_eq!(ARM_VARIANTS, &["v5", "v6", "v7", "v8"]);
    assert_eq!(AMD64_VARIANTS, &["v1", "v2", "v3", "v4"]);
}

#[test]
fn test_arm64_revision_bounds() {
    // v9.N implies v8.(N+5); the highest v9 minor must still map into v8
    assert!(ARM64_V9_MAX_MINOR + ARM64_V9_TO_V8_OFFSET <= ARM64_V8_MAX_MINOR + 1);
}

#[test]
fn test_amd64_feature_tiers_are_disjoint() {
    for feature in AMD64_V2_FEATURES {
        assert!(!AMD64_V3_FEATURES.contains(feature));
        assert!(!AMD64_V4_FEATURES.contains(feature));
    }
    for feature in AMD64_V3_FEATURES {
        assert!(!AMD64_V4_FEATURES.contains(feature));
    }
}

#[test]
fn test_canonical_names_are_known_architectures() {
    for arch in [ARCH_AMD64, ARCH_ARM64, ARCH_ARM, ARCH_386] {
        assert!(KNOWN_ARCHITECTURES.contains(&arch), "{} missing", arch);
    }
    assert!(PLATFORM_CONFIG_PATH.ends_with(".toml"));
}
