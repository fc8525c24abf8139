//! Platform specifier grammar.
//!
//! A specifier is the compact string form of a [`Platform`]:
//!
//! ```text
//! v1:  arch | os/arch | os/arch/variant
//! v2:  os(osVersion) | os(osVersion)/arch | os(osVersion)/arch/variant
//! ```
//!
//! Parsing here is purely syntactic. Alias resolution happens in
//! [`crate::normalize`]; the only table consulted is the list of known
//! architectures, to decide whether a bare component names an architecture
//! or an OS.

use crate::constants::KNOWN_ARCHITECTURES;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::platform::Platform;

/// Maximum number of `/`-delimited components.
const MAX_COMPONENTS: usize = 3;

/// Parses a specifier into raw components, filling shorthand gaps from the
/// shared native host.
///
/// The result is not normalized; use [`Host::parse`] or `str::parse` for a
/// canonical [`Platform`].
pub fn parse(specifier: &str) -> Result<Platform> {
    parse_with_defaults(specifier, &Host::shared().shorthand_defaults())
}

/// Parses a specifier into raw components.
///
/// `defaults` supplies the OS for an architecture shorthand (`arm64`) and the
/// architecture and variant for an OS shorthand (`linux`).
pub fn parse_with_defaults(specifier: &str, defaults: &Platform) -> Result<Platform> {
    if specifier.is_empty() {
        return Err(Error::invalid(specifier, "empty specifier"));
    }
    if specifier.chars().any(char::is_whitespace) {
        return Err(Error::invalid(specifier, "whitespace is not allowed"));
    }
    if specifier.starts_with('/') {
        return Err(Error::invalid(specifier, "leading '/'"));
    }
    if specifier.ends_with('/') {
        return Err(Error::invalid(specifier, "trailing '/'"));
    }

    let parts: Vec<&str> = specifier.split('/').collect();
    if parts.len() > MAX_COMPONENTS {
        return Err(Error::invalid(
            specifier,
            format!(
                "{} components, at most {} allowed",
                parts.len(),
                MAX_COMPONENTS
            ),
        ));
    }

    for part in &parts[1..] {
        if part.contains('(') || part.contains(')') {
            return Err(Error::invalid(
                specifier,
                "an OS version is only allowed in the first component",
            ));
        }
        check_component(specifier, part)?;
    }

    let (first, os_version) = split_os_version(specifier, parts[0])?;
    check_component(specifier, first)?;

    let mut platform = Platform {
        os_version: os_version.unwrap_or_default().to_string(),
        ..Default::default()
    };

    match parts.len() {
        1 if os_version.is_none() && is_known_architecture(first) => {
            platform.os = defaults.os.clone();
            platform.architecture = first.to_string();
        }
        1 => {
            platform.os = first.to_string();
            platform.architecture = defaults.architecture.clone();
            platform.variant = defaults.variant.clone();
        }
        2 => {
            platform.os = first.to_string();
            platform.architecture = parts[1].to_string();
        }
        _ => {
            platform.os = first.to_string();
            platform.architecture = parts[1].to_string();
            platform.variant = parts[2].to_string();
        }
    }

    Ok(platform)
}

/// Splits `os(osVersion)` into its halves. A component without parentheses
/// has no OS version.
fn split_os_version<'a>(specifier: &str, component: &'a str) -> Result<(&'a str, Option<&'a str>)> {
    let Some(open) = component.find('(') else {
        if component.contains(')') {
            return Err(Error::invalid(specifier, "unbalanced ')'"));
        }
        return Ok((component, None));
    };

    let Some(inner) = component[open + 1..].strip_suffix(')') else {
        return Err(Error::invalid(
            specifier,
            "OS version must close the first component",
        ));
    };
    if inner.contains('(') || inner.contains(')') {
        return Err(Error::invalid(specifier, "nested parentheses"));
    }
    if let Some(c) = inner.chars().find(|c| !is_allowed_char(*c)) {
        return Err(Error::invalid(
            specifier,
            format!("invalid character {:?} in OS version", c),
        ));
    }

    Ok((&component[..open], Some(inner)))
}

fn check_component(specifier: &str, component: &str) -> Result<()> {
    let Some(head) = component.chars().next() else {
        return Err(Error::invalid(specifier, "empty component"));
    };
    if !head.is_ascii_alphanumeric() {
        return Err(Error::invalid(
            specifier,
            format!("component {:?} must start with a letter or digit", component),
        ));
    }
    if let Some(c) = component.chars().find(|c| !is_allowed_char(*c)) {
        return Err(Error::invalid(
            specifier,
            format!("invalid character {:?} in {:?}", c, component),
        ));
    }
    Ok(())
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-')
}

/// Returns true if `name` is a known architecture or architecture alias.
pub fn is_known_architecture(name: &str) -> bool {
    KNOWN_ARCHITECTURES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Platform {
        Platform::new("linux", "amd64")
    }

    fn parse(s: &str) -> Result<Platform> {
        parse_with_defaults(s, &defaults())
    }

    #[test]
    fn test_parse_os_arch() {
        let p = parse("linux/arm64").unwrap();
        assert_eq!(p, Platform::new("linux", "arm64"));
    }

    #[test]
    fn test_parse_keeps_raw_spelling() {
        let p = parse("Linux/x86_64").unwrap();
        assert_eq!(p.os, "Linux");
        assert_eq!(p.architecture, "x86_64");
    }

    #[test]
    fn test_parse_arch_shorthand_uses_default_os() {
        let p = parse("Aarch64").unwrap();
        assert_eq!(p.os, "linux");
        assert_eq!(p.architecture, "Aarch64");
        assert!(p.variant.is_empty());
    }

    #[test]
    fn test_parse_os_shorthand_uses_default_arch_and_variant() {
        let defaults = Platform::new("linux", "arm64").with_variant("v8");
        let p = parse_with_defaults("windows", &defaults).unwrap();
        assert_eq!(p, Platform::new("windows", "arm64").with_variant("v8"));
    }

    #[test]
    fn test_parse_os_version_shorthand() {
        let p = parse("windows(10.0.17763)").unwrap();
        assert_eq!(p.os, "windows");
        assert_eq!(p.os_version, "10.0.17763");
        assert_eq!(p.architecture, "amd64");
    }

    #[test]
    fn test_parse_empty_os_version() {
        let p = parse("windows()").unwrap();
        assert_eq!(p.os, "windows");
        assert!(p.os_version.is_empty());
    }

    #[test]
    fn test_parse_rejects_unclosed_version() {
        assert!(parse("windows(10.0/amd64").is_err());
        assert!(parse("windows(10.0)x/amd64").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_component() {
        assert!(parse("linux//arm").is_err());
    }

    #[test]
    fn test_known_architecture_is_case_insensitive() {
        assert!(is_known_architecture("X86_64"));
        assert!(is_known_architecture("armhf"));
        assert!(!is_known_architecture("linux"));
        assert!(!is_known_architecture("macOS"));
    }
}
