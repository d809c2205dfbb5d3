use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A released toolchain version. Release candidates and betas are not
/// representable; the catalog skips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    #[must_use]
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    #[must_use]
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }

    /// Two versions share a line when only their patch differs.
    #[must_use]
    pub fn same_line(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    #[must_use]
    pub fn line_key(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    #[must_use]
    pub fn has_patch(&self) -> bool {
        self.patch != 0
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected X.Y or X.Y.Z format, got: {input:?}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version {value:?} in {input:?}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
        input: String,
    },
}

fn parse_component(
    value: &str,
    component: VersionComponent,
    input: &str,
) -> Result<u32, VersionParseError> {
    // u32::from_str accepts a leading '+', which is not a version digit.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
            input: input.to_string(),
        });
    }
    value
        .parse()
        .map_err(|_| VersionParseError::InvalidComponent {
            component,
            value: value.to_string(),
            input: input.to_string(),
        })
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let parts: Vec<&str> = input.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(VersionParseError::InvalidFormat {
                input: input.to_string(),
            });
        }

        let major = parse_component(parts[0], VersionComponent::Major, input)?;
        let minor = parse_component(parts[1], VersionComponent::Minor, input)?;
        let patch = match parts.get(2) {
            Some(patch) => parse_component(patch, VersionComponent::Patch, input)?,
            None => 0,
        };

        Ok(Version::new(major, minor, patch))
    }
}

/// A named pairing of a pinned toolchain version and a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentRecord {
    pub name: String,
    /// Canonical display form of the pinned [`Version`].
    #[serde(alias = "goversion")]
    pub toolchain_version: String,
    #[serde(alias = "gopath")]
    pub workspace: PathBuf,
    #[serde(default, alias = "compilesteps")]
    pub compile_steps: Vec<String>,
    /// Expose this workspace's `bin` directory in every environment.
    #[serde(default, alias = "globalbin")]
    pub global_bin: bool,
}

impl EnvironmentRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, version: Version, workspace: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            toolchain_version: version.to_string(),
            workspace: workspace.into(),
            compile_steps: Vec::new(),
            global_bin: false,
        }
    }

    /// # Errors
    /// Returns an error when the stored version string is malformed.
    pub fn version(&self) -> Result<Version, VersionParseError> {
        self.toolchain_version.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    Downloading,
    Verifying,
    Extracting,
    Building,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloading => write!(f, "downloading"),
            Self::Verifying => write!(f, "verifying"),
            Self::Extracting => write!(f, "extracting"),
            Self::Building => write!(f, "building"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    Phase(InstallPhase),
    Downloading { downloaded: u64, total: u64 },
    Complete(Version),
}

pub type ProgressSender = tokio::sync::mpsc::Sender<InstallProgress>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_components_defaults_patch() {
        let v: Version = "1.7".parse().unwrap();
        assert_eq!(v, Version::new(1, 7, 0));
    }

    #[test]
    fn parse_three_components() {
        let v: Version = "1.7.3".parse().unwrap();
        assert_eq!(v, Version::new(1, 7, 3));
    }

    #[test]
    fn parse_trims_whitespace() {
        let v: Version = "  1.21.4 ".parse().unwrap();
        assert_eq!(v, Version::new(1, 21, 4));
    }

    #[test]
    fn parse_rejects_wrong_component_count() {
        for input in ["1", "1.2.3.4", "", "1.2."] {
            let result: Result<Version, _> = input.parse();
            assert!(result.is_err(), "{input:?} should not parse");
        }
        assert!(matches!(
            "1".parse::<Version>(),
            Err(VersionParseError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn parse_rejects_non_numeric_components() {
        assert!(matches!(
            "1.x".parse::<Version>(),
            Err(VersionParseError::InvalidComponent {
                component: VersionComponent::Minor,
                ..
            })
        ));
        assert!("1.7rc1".parse::<Version>().is_err());
        assert!("1.+7".parse::<Version>().is_err());
        assert!("-1.7".parse::<Version>().is_err());
    }

    #[test]
    fn display_round_trips_canonical_text() {
        for (input, expected) in [
            ("1.7", "1.7"),
            ("1.7.0", "1.7"),
            ("1.7.3", "1.7.3"),
            ("0.0", "0.0"),
            ("10.20.30", "10.20.30"),
        ] {
            let v: Version = input.parse().unwrap();
            assert_eq!(v.to_string(), expected);
        }
    }

    #[test]
    fn line_key_ignores_patch() {
        assert_eq!(Version::new(1, 7, 3).line_key(), "1.7");
        assert_eq!(Version::new(1, 7, 0).line_key(), "1.7");
    }

    #[test]
    fn is_newer_than_orders_lexicographically() {
        let a = Version::new(1, 7, 3);
        assert!(Version::new(2, 0, 0).is_newer_than(&a));
        assert!(Version::new(1, 8, 0).is_newer_than(&a));
        assert!(Version::new(1, 7, 4).is_newer_than(&a));
        assert!(!Version::new(1, 7, 2).is_newer_than(&a));
        assert!(!Version::new(1, 6, 9).is_newer_than(&a));
        assert!(!Version::new(0, 99, 99).is_newer_than(&a));
    }

    #[test]
    fn is_newer_than_is_irreflexive() {
        let a = Version::new(1, 7, 3);
        assert!(!a.is_newer_than(&a));
    }

    #[test]
    fn is_newer_than_is_a_strict_total_order() {
        let versions = [
            Version::new(1, 0, 0),
            Version::new(1, 0, 1),
            Version::new(1, 1, 0),
            Version::new(2, 0, 0),
        ];
        for a in &versions {
            for b in &versions {
                let forward = a.is_newer_than(b);
                let backward = b.is_newer_than(a);
                if a == b {
                    assert!(!forward && !backward);
                } else {
                    assert!(forward ^ backward, "{a} vs {b}");
                }
                for c in &versions {
                    if a.is_newer_than(b) && b.is_newer_than(c) {
                        assert!(a.is_newer_than(c));
                    }
                }
            }
        }
    }

    #[test]
    fn environment_record_uses_canonical_version_text() {
        let record = EnvironmentRecord::new("juju", Version::new(1, 7, 0), "/home/me/juju");
        assert_eq!(record.toolchain_version, "1.7");
        assert_eq!(record.version().unwrap(), Version::new(1, 7, 0));
    }

    #[test]
    fn environment_record_defaults_optional_fields() {
        let record: EnvironmentRecord = serde_json::from_str(
            r#"{"name":"juju","toolchain_version":"1.7.3","workspace":"/home/me/juju"}"#,
        )
        .unwrap();
        assert!(record.compile_steps.is_empty());
        assert!(!record.global_bin);
    }

    #[test]
    fn environment_record_reads_legacy_field_names() {
        let record: EnvironmentRecord = serde_json::from_str(
            r#"{"name":"juju","goversion":"1.7","gopath":"/ws/juju","compilesteps":["make"],"globalbin":true}"#,
        )
        .unwrap();
        assert_eq!(record.version().unwrap(), Version::new(1, 7, 0));
        assert_eq!(record.workspace, PathBuf::from("/ws/juju"));
        assert_eq!(record.compile_steps, vec!["make".to_string()]);
        assert!(record.global_bin);
    }

    #[test]
    fn same_line_ignores_patch() {
        assert!(Version::new(1, 7, 1).same_line(&Version::new(1, 7, 3)));
        assert!(!Version::new(1, 7, 1).same_line(&Version::new(1, 8, 1)));
        assert!(!Version::new(1, 7, 1).same_line(&Version::new(2, 7, 1)));
    }
}
