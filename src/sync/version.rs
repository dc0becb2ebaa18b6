//! Realm version parsing and the refresh decision
//!
//! Realm versions look like `5.15.1`, but the remote side has shipped values
//! such as `lolpatch_5.15` or `5.15.1.2`, so parsing only looks for the first
//! three runs of one or two ASCII digits.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::sync::error::VersionParseError;

static COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,2}").expect("valid version component regex"));

/// Parsed `major.minor.patch` realm version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RealmVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl RealmVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for RealmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse a version string into its first three numeric components.
///
/// Examples:
/// - "5.15.1" -> (5, 15, 1)
/// - "5.15.1.2" -> (5, 15, 1)
/// - "1.2" -> error, only two components
pub fn parse(version: Option<&str>) -> Result<RealmVersion, VersionParseError> {
    let version = version.ok_or(VersionParseError::Missing)?;

    let components: Vec<u32> = COMPONENT_RE
        .find_iter(version)
        .take(3)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match components[..] {
        [major, minor, patch] => Ok(RealmVersion::new(major, minor, patch)),
        _ => Err(VersionParseError::TooFewComponents(version.to_string())),
    }
}

/// Decide whether the local mirror must be rebuilt.
///
/// Only major and minor are compared; patch releases never trigger a refresh.
pub fn needs_sync(local: Option<&RealmVersion>, remote: &RealmVersion) -> bool {
    match local {
        None => true,
        Some(local) => local.major != remote.major || local.minor != remote.minor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5.15.1", RealmVersion::new(5, 15, 1))]
    #[case("5.15.1.2", RealmVersion::new(5, 15, 1))]
    #[case("lolpatch_5.2.7", RealmVersion::new(5, 2, 7))]
    #[case("10.1.33", RealmVersion::new(10, 1, 33))]
    // Runs are capped at two digits, so "123" splits into "12" and "3"
    #[case("123.4", RealmVersion::new(12, 3, 4))]
    // Only ASCII digits count as components
    #[case("\u{0665}.5.15.1", RealmVersion::new(5, 15, 1))]
    fn parse_extracts_first_three_components(#[case] input: &str, #[case] expected: RealmVersion) {
        assert_eq!(parse(Some(input)), Ok(expected));
    }

    #[rstest]
    #[case("1.2")]
    #[case("")]
    #[case("latest")]
    fn parse_fails_with_fewer_than_three_components(#[case] input: &str) {
        assert_eq!(
            parse(Some(input)),
            Err(VersionParseError::TooFewComponents(input.to_string()))
        );
    }

    #[test]
    fn parse_fails_when_version_is_absent() {
        assert_eq!(parse(None), Err(VersionParseError::Missing));
    }

    #[rstest]
    #[case((5, 15, 3), (5, 15, 9), false)]
    #[case((5, 15, 9), (5, 15, 0), false)]
    #[case((5, 14, 1), (5, 15, 1), true)]
    #[case((5, 15, 1), (5, 14, 1), true)]
    #[case((4, 15, 1), (5, 15, 1), true)]
    #[case((6, 1, 1), (5, 1, 1), true)]
    fn needs_sync_compares_major_and_minor_only(
        #[case] local: (u32, u32, u32),
        #[case] remote: (u32, u32, u32),
        #[case] expected: bool,
    ) {
        let local = RealmVersion::new(local.0, local.1, local.2);
        let remote = RealmVersion::new(remote.0, remote.1, remote.2);

        assert_eq!(needs_sync(Some(&local), &remote), expected);
    }

    #[test]
    fn needs_sync_is_true_without_local_version() {
        assert!(needs_sync(None, &RealmVersion::new(5, 15, 1)));
        assert!(needs_sync(None, &RealmVersion::new(0, 0, 0)));
    }

    #[test]
    fn needs_sync_ignores_patch_for_every_patch_pair() {
        for local_patch in 0..20 {
            for remote_patch in 0..20 {
                let local = RealmVersion::new(5, 15, local_patch);
                let remote = RealmVersion::new(5, 15, remote_patch);
                assert!(!needs_sync(Some(&local), &remote));
            }
        }
    }

    #[test]
    fn display_formats_dotted_triple() {
        assert_eq!(RealmVersion::new(5, 15, 1).to_string(), "5.15.1");
    }
}
