//! Platform matching and preference ordering.
//!
//! A [`Matcher`] is built once from a reference (host) platform and answers
//! "may this image run here?" for any number of candidates:
//!
//! ```text
//!   candidate ──normalize──► OS equal? ──► arch equal? ──► variant ≤ host?
//!                                                              │
//!                                   OsVersionStrategy ◄────────┘
//!                                   (Windows: compatibility matrix)
//! ```
//!
//! A [`Comparator`] wraps a matcher and orders candidates most-preferred
//! first, for picking one manifest out of an image index.

use std::cmp::{Ordering, Reverse};

use crate::compat::{CompatibilityMatrix, WindowsOsVersion};
use crate::constants::{
    AMD64_VARIANTS, ARCH_AMD64, ARCH_ARM, ARCH_ARM64, ARM64_V8_MAX_MINOR, ARM64_V9_MAX_MINOR,
    ARM64_V9_TO_V8_OFFSET, ARM_VARIANTS,
};
use crate::normalize::normalize;
use crate::platform::Platform;

// =============================================================================
// Variant Order
// =============================================================================

/// Returns true if a host with `reference` variant can run an image built for
/// `candidate` on architecture `arch`.
///
/// A blank variant on either side is compatible with anything. Variants
/// outside the architecture's known order must be equal.
pub fn variant_satisfies(arch: &str, reference: &str, candidate: &str) -> bool {
    if reference.is_empty() || candidate.is_empty() || reference == candidate {
        return true;
    }
    match arch {
        ARCH_ARM => ranked(ARM_VARIANTS, reference, candidate),
        ARCH_AMD64 => ranked(AMD64_VARIANTS, reference, candidate),
        ARCH_ARM64 => match (arm64_revision(reference), arm64_revision(candidate)) {
            (Some((rmaj, rmin)), Some((cmaj, cmin))) => {
                if rmaj == cmaj {
                    rmin >= cmin
                } else {
                    // v9.N implements v8.(N+5)
                    rmaj == 9 && cmaj == 8 && cmin <= rmin + ARM64_V9_TO_V8_OFFSET
                }
            }
            _ => false,
        },
        _ => false,
    }
}

fn ranked(order: &[&str], reference: &str, candidate: &str) -> bool {
    let rank = |v: &str| order.iter().position(|o| *o == v);
    match (rank(reference), rank(candidate)) {
        (Some(r), Some(c)) => r >= c,
        _ => false,
    }
}

/// Parses `v8`, `v8.2`, `v9.1` into `(major, minor)`.
fn arm64_revision(variant: &str) -> Option<(u32, u32)> {
    let rest = variant.strip_prefix('v')?;
    let (major, minor) = match rest.split_once('.') {
        Some((major, minor)) => (major.parse().ok()?, minor.parse().ok()?),
        None => (rest.parse().ok()?, 0),
    };
    let valid = match major {
        8 => minor <= ARM64_V8_MAX_MINOR,
        9 => minor <= ARM64_V9_MAX_MINOR,
        _ => false,
    };
    valid.then_some((major, minor))
}

// =============================================================================
// Matcher
// =============================================================================

/// How OS versions take part in matching. Chosen once per [`Matcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsVersionStrategy {
    /// OS versions are ignored (every non-Windows OS).
    Ignore,
    /// Windows host/guest builds are checked against the matrix.
    Windows(CompatibilityMatrix),
}

impl OsVersionStrategy {
    /// Default strategy for a normalized reference platform.
    pub fn for_platform(reference: &Platform) -> Self {
        if reference.is_windows() {
            OsVersionStrategy::Windows(CompatibilityMatrix::builtin())
        } else {
            OsVersionStrategy::Ignore
        }
    }

    fn allows(&self, reference: &str, candidate: &str) -> bool {
        match self {
            OsVersionStrategy::Ignore => true,
            // An unversioned side is the accepted fallback.
            OsVersionStrategy::Windows(_) if reference.is_empty() || candidate.is_empty() => true,
            OsVersionStrategy::Windows(matrix) => matrix.compatible_versions(reference, candidate),
        }
    }
}

/// Decides whether candidate platforms can run on a reference platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    reference: Platform,
    strategy: OsVersionStrategy,
}

impl Matcher {
    /// Creates a matcher for `reference` using the built-in Windows matrix.
    pub fn new(reference: Platform) -> Self {
        let reference = normalize(reference);
        let strategy = OsVersionStrategy::for_platform(&reference);
        Self {
            reference,
            strategy,
        }
    }

    /// Creates a matcher that checks Windows builds against `matrix`.
    ///
    /// The matrix is ignored when the reference is not Windows.
    pub fn with_matrix(reference: Platform, matrix: CompatibilityMatrix) -> Self {
        let reference = normalize(reference);
        let strategy = if reference.is_windows() {
            OsVersionStrategy::Windows(matrix)
        } else {
            OsVersionStrategy::Ignore
        };
        Self {
            reference,
            strategy,
        }
    }

    /// Creates a matcher with an explicit OS version strategy.
    pub fn with_strategy(reference: Platform, strategy: OsVersionStrategy) -> Self {
        Self {
            reference: normalize(reference),
            strategy,
        }
    }

    /// The normalized reference platform.
    pub fn reference(&self) -> &Platform {
        &self.reference
    }

    /// The OS version strategy.
    pub fn strategy(&self) -> &OsVersionStrategy {
        &self.strategy
    }

    /// Returns true if `candidate` can run on the reference platform.
    pub fn matches(&self, candidate: &Platform) -> bool {
        let candidate = normalize(candidate.clone());
        let reference = &self.reference;

        reference.os == candidate.os
            && reference.architecture == candidate.architecture
            && variant_satisfies(
                &reference.architecture,
                &reference.variant,
                &candidate.variant,
            )
            && self
                .strategy
                .allows(&reference.os_version, &candidate.os_version)
    }

    /// Returns the candidates that match, in input order.
    pub fn filter<'a>(&'a self, candidates: &'a [Platform]) -> impl Iterator<Item = &'a Platform> {
        candidates.iter().filter(move |p| self.matches(p))
    }
}

// =============================================================================
// Comparator
// =============================================================================

/// Orders candidates most-preferred first.
///
/// Keys, first difference wins:
/// 1. matching before non-matching
/// 2. (Windows) a parseable OS version before none
/// 3. (Windows) the host's exact build before other builds
/// 4. (Windows) smaller build distance to the host, then higher build
/// 5. (Windows) higher revision
///
/// Every comparison goes through a single lexicographic key, so the ordering
/// is a strict weak ordering and safe for any sort.
#[derive(Debug, Clone)]
pub struct Comparator {
    matcher: Matcher,
    host_version: Option<WindowsOsVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    unmatched: bool,
    unversioned: bool,
    other_build: bool,
    distance: u32,
    build: Reverse<u32>,
    revision: Reverse<u32>,
}

impl Comparator {
    /// Creates a comparator around `matcher`.
    pub fn new(matcher: Matcher) -> Self {
        let host_version = matcher.reference.os_version.parse().ok();
        Self {
            matcher,
            host_version,
        }
    }

    /// The wrapped matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    fn key(&self, platform: &Platform) -> SortKey {
        let mut key = SortKey {
            unmatched: !self.matcher.matches(platform),
            unversioned: false,
            other_build: false,
            distance: 0,
            build: Reverse(0),
            revision: Reverse(0),
        };
        if key.unmatched || !matches!(self.matcher.strategy, OsVersionStrategy::Windows(_)) {
            return key;
        }

        let Ok(version) = platform.os_version.parse::<WindowsOsVersion>() else {
            key.unversioned = true;
            return key;
        };
        if let Some(host) = &self.host_version {
            key.other_build = !host.same_build(&version);
            key.distance = host.build.abs_diff(version.build);
        }
        key.build = Reverse(version.build);
        key.revision = Reverse(version.revision);
        key
    }

    /// Total preorder over candidates; `Less` means more preferred.
    pub fn compare(&self, a: &Platform, b: &Platform) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }

    /// Returns true if `a` is strictly preferred over `b`.
    pub fn less(&self, a: &Platform, b: &Platform) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Stable sort, most preferred first.
    pub fn sort(&self, platforms: &mut [Platform]) {
        platforms.sort_by(|a, b| self.compare(a, b));
    }

    /// The most preferred matching candidate, if any. Ties go to the earliest.
    pub fn best_match<'a>(&self, candidates: &'a [Platform]) -> Option<&'a Platform> {
        candidates
            .iter()
            .min_by(|a, b| self.compare(a, b))
            .filter(|p| self.matcher.matches(p))
    }
}

impl From<Matcher> for Comparator {
    fn from(matcher: Matcher) -> Self {
        Self::new(matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_variant_order() {
        assert!(variant_satisfies("arm", "v7", "v6"));
        assert!(variant_satisfies("arm", "v7", "v7"));
        assert!(variant_satisfies("arm", "v7", ""));
        assert!(variant_satisfies("arm", "", "v8"));
        assert!(!variant_satisfies("arm", "v7", "v8"));
        assert!(!variant_satisfies("arm", "v6", "v7"));
    }

    #[test]
    fn test_arm64_variant_order() {
        assert!(variant_satisfies("arm64", "v8.2", "v8"));
        assert!(variant_satisfies("arm64", "v8.2", "v8.1"));
        assert!(!variant_satisfies("arm64", "v8", "v8.1"));
        assert!(variant_satisfies("arm64", "v9", "v8.5"));
        assert!(!variant_satisfies("arm64", "v9", "v8.6"));
        assert!(variant_satisfies("arm64", "v9.1", "v8.6"));
        assert!(!variant_satisfies("arm64", "v8.9", "v9"));
    }

    #[test]
    fn test_amd64_levels() {
        assert!(variant_satisfies("amd64", "v3", "v2"));
        assert!(variant_satisfies("amd64", "v3", "v1"));
        assert!(!variant_satisfies("amd64", "v3", "v4"));
    }

    #[test]
    fn test_unknown_variants_must_be_equal() {
        assert!(variant_satisfies("riscv64", "rva22", "rva22"));
        assert!(!variant_satisfies("riscv64", "rva23", "rva22"));
        assert!(!variant_satisfies("arm", "unknown", "v7"));
    }

    #[test]
    fn test_strategy_selected_from_reference() {
        let m = Matcher::new(Platform::new("Windows", "amd64"));
        assert!(matches!(m.strategy(), OsVersionStrategy::Windows(_)));
        let m = Matcher::new(Platform::new("linux", "amd64"));
        assert_eq!(m.strategy(), &OsVersionStrategy::Ignore);
    }

    #[test]
    fn test_linux_ignores_os_version() {
        let m = Matcher::new(Platform::new("linux", "amd64").with_os_version("5.15"));
        assert!(m.matches(&Platform::new("linux", "amd64").with_os_version("6.1")));
    }

    #[test]
    fn test_best_match_none_when_nothing_matches() {
        let c = Comparator::new(Matcher::new(Platform::new("linux", "amd64")));
        let candidates = vec![Platform::new("windows", "amd64"), Platform::new("linux", "arm64")];
        assert_eq!(c.best_match(&candidates), None);
    }
}
