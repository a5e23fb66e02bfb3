// Version strings: normalization of release tags, numeric comparison, and
// discovery of the running version.

use crate::constants;
use crate::host_context::HostContext;
use semver::Version;
use starter_sdk::{build_constants, StringUtil};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Strip `refs/tags/`, a leading `v`/`V`, build metadata after `+` and
/// anything after the first space.
///
/// Blank input normalizes to `"0.0.0"`.
pub fn normalize_version_string(raw: &str) -> String {
    let mut trimmed = raw.trim();
    if trimmed.is_empty() {
        return "0.0.0".to_string();
    }

    const TAG_PREFIX: &str = "refs/tags/";
    if trimmed
        .get(..TAG_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(TAG_PREFIX))
    {
        trimmed = &trimmed[TAG_PREFIX.len()..];
    }

    if let Some(rest) = trimmed.strip_prefix(|c: char| c == 'v' || c == 'V') {
        trimmed = rest;
    }

    trimmed = StringUtil::sub_string_before(trimmed, '+');
    trimmed = StringUtil::sub_string_before(trimmed, ' ');

    trimmed.to_string()
}

/// Why a version string could not be read.
#[derive(Debug, thiserror::Error)]
pub enum VersionParseError {
    #[error("version '{0}' is empty")]
    Empty(String),
    #[error("version '{0}' must have 2 or 3 numeric components")]
    ComponentCount(String),
    #[error("version '{input}' is not a valid version")]
    Invalid {
        input: String,
        #[source]
        source: semver::Error,
    },
}

/// A release version: `major.minor[.patch][-pre]`.
///
/// Ordering looks only at the numeric components. A pre-release label
/// (`1.2.0-rc1`) is kept for display but does not take part in comparisons.
#[derive(Debug, Clone)]
pub struct ReleaseVersion {
    version: Version,
}

impl ReleaseVersion {
    /// Normalize `raw` and parse it. Blank input is rejected rather than
    /// read as `0.0.0`.
    pub fn parse(raw: &str) -> Result<Self, VersionParseError> {
        if raw.trim().is_empty() {
            return Err(VersionParseError::Empty(raw.to_string()));
        }
        normalize_version_string(raw).parse()
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn is_pre_release(&self) -> bool {
        !self.version.pre.is_empty()
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.is_pre_release().then(|| self.version.pre.as_str())
    }

    fn release_part(&self) -> Version {
        Version::new(self.version.major, self.version.minor, self.version.patch)
    }
}

impl FromStr for ReleaseVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionParseError::Empty(s.to_string()));
        }

        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (s, None),
        };
        let padded = match core.split('.').count() {
            2 => format!("{core}.0"),
            3 => core.to_string(),
            _ => return Err(VersionParseError::ComponentCount(s.to_string())),
        };
        let text = match pre {
            Some(pre) if !pre.is_empty() => format!("{padded}-{pre}"),
            _ => padded,
        };

        let version = Version::parse(&text).map_err(|source| VersionParseError::Invalid {
            input: s.to_string(),
            source,
        })?;
        Ok(Self { version })
    }
}

impl PartialEq for ReleaseVersion {
    fn eq(&self, other: &Self) -> bool {
        self.release_part() == other.release_part()
    }
}

impl Eq for ReleaseVersion {}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release_part().cmp(&other.release_part())
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.version, f)
    }
}

// ---------------------------------------------------------------------------
// Running version discovery
// ---------------------------------------------------------------------------

/// The running version, normalized.
///
/// Looks for a `VERSION` file beside the executable, then in the working
/// directory, then in the nearest ancestor of the working directory that has
/// one; falls back to the compiled package version.
pub fn current_version_string(context: &HostContext) -> String {
    let root = context.get_directory(constants::WellKnownDirectory::Root);
    let cwd = std::env::current_dir().ok();

    let from_file = read_version_file(&root)
        .or_else(|| cwd.as_deref().and_then(read_version_file))
        .or_else(|| {
            cwd.as_deref()
                .and_then(search_upwards_for_version)
                .and_then(|dir| read_version_file(&dir))
        });

    match from_file {
        Some(v) => normalize_version_string(&v),
        None => normalize_version_string(build_constants::StarterPackage::VERSION),
    }
}

fn read_version_file(dir: &Path) -> Option<String> {
    let path = dir.join(constants::VERSION_FILE_NAME);
    let content = std::fs::read_to_string(path).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn search_upwards_for_version(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(constants::VERSION_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_tag_prefix_and_build_metadata() {
        assert_eq!(normalize_version_string("refs/tags/v1.2.3+build5"), "1.2.3");
    }

    #[test]
    fn normalize_strips_upper_v_and_space_suffix() {
        assert_eq!(normalize_version_string("V2.0.0 beta"), "2.0.0");
    }

    #[test]
    fn normalize_blank_is_zero() {
        assert_eq!(normalize_version_string("   "), "0.0.0");
    }

    #[test]
    fn normalize_keeps_plain_versions() {
        assert_eq!(normalize_version_string(" 1.4.0 "), "1.4.0");
        assert_eq!(normalize_version_string("REFS/TAGS/1.0"), "1.0");
    }

    #[test]
    fn parse_two_or_three_components() {
        assert_eq!(ReleaseVersion::parse("1.2").unwrap().to_string(), "1.2.0");
        assert_eq!(ReleaseVersion::parse("v1.2.3").unwrap().version().patch, 3);
        for bad in ["7", "v1.2.3.4"] {
            assert!(matches!(
                ReleaseVersion::parse(bad),
                Err(VersionParseError::ComponentCount(_))
            ));
        }
        assert!(matches!(
            ReleaseVersion::parse("1.x.3"),
            Err(VersionParseError::Invalid { .. })
        ));
        assert!(matches!(
            "".parse::<ReleaseVersion>(),
            Err(VersionParseError::Empty(_))
        ));
    }

    #[test]
    fn ordering_is_numeric() {
        let v = |s: &str| ReleaseVersion::parse(s).unwrap();
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("1.1.0") > v("1.0.0"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert!(v("2.0.0") > v("1.99"));
    }

    #[test]
    fn pre_release_does_not_affect_ordering() {
        let rc = ReleaseVersion::parse("v1.2.0-rc1").unwrap();
        assert!(rc.is_pre_release());
        assert_eq!(rc.pre_release(), Some("rc1"));
        assert_eq!(rc, ReleaseVersion::parse("1.2.0").unwrap());
        assert_eq!(rc.to_string(), "1.2.0-rc1");
    }

    #[test]
    fn blank_release_tag_is_rejected() {
        for blank in ["", "   "] {
            assert!(matches!(
                ReleaseVersion::parse(blank),
                Err(VersionParseError::Empty(_))
            ));
        }
        assert!(!ReleaseVersion::parse("1.0.0").unwrap().is_pre_release());
    }

    #[test]
    fn version_file_beside_root_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("VERSION"), "v3.1.4+abc\n").unwrap();
        let context = HostContext::new("Test");
        context.set_root_override(dir.path());
        assert_eq!(current_version_string(&context), "3.1.4");
    }

    #[test]
    fn search_upwards_finds_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("VERSION"), "1.0.0").unwrap();
        assert_eq!(search_upwards_for_version(&nested).unwrap(), dir.path());
        assert_eq!(read_version_file(dir.path()).as_deref(), Some("1.0.0"));
    }
}
