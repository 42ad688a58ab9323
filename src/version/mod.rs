// Version parsing and ordering for catalog entries and client versions

mod constraint;

pub use constraint::{Constraint, Operator, check};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Maximum number of dot-separated numeric components (major.minor.patch)
const MAX_COMPONENTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl VersionComponent {
    fn at(index: usize) -> Self {
        match index {
            0 => Self::Major,
            1 => Self::Minor,
            _ => Self::Patch,
        }
    }
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
pub enum VersionError {
    #[error("version string is empty")]
    Empty,
    #[error("invalid {component} component '{value}' in version '{input}'")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
        input: String,
    },
    #[error("version '{input}' has more than three numeric components")]
    TooManyComponents { input: String },
    #[error("unknown constraint operator '{operator}'")]
    UnknownOperator { operator: String },
}

/// A parsed version identifier.
///
/// Ordering compares major, minor and patch numerically, then ranks a release
/// above any pre-release of the same core. Build metadata never takes part in
/// ordering or equality. The original text is kept for echo-back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
    pub build: Option<String>,
    raw: String,
}

impl Version {
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        if text.is_empty() {
            return Err(VersionError::Empty);
        }

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => (rest, non_empty(build)),
            None => (text, None),
        };
        let (core, prerelease) = match rest.split_once('-') {
            Some((core, pre)) => (core, non_empty(pre)),
            None => (rest, None),
        };

        let mut numbers = [0u64; MAX_COMPONENTS];
        for (index, part) in core.split('.').enumerate() {
            if index >= MAX_COMPONENTS {
                return Err(VersionError::TooManyComponents {
                    input: text.to_string(),
                });
            }
            numbers[index] = part
                .parse::<u64>()
                .map_err(|_| VersionError::InvalidComponent {
                    component: VersionComponent::at(index),
                    value: part.to_string(),
                    input: text.to_string(),
                })?;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            prerelease,
            build,
            raw: text.to_string(),
        })
    }

    /// Build a version from its parts, deriving the canonical text.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let mut version = Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
            raw: String::new(),
        };
        version.raw = version.canonical();
        version
    }

    /// The text this version was parsed from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `major.minor.patch[-pre][+build]`
    pub fn canonical(&self) -> String {
        let mut out = format!("{}.{}.{}", self.major, self.minor, self.patch);
        if let Some(pre) = &self.prerelease {
            out.push('-');
            out.push_str(pre);
        }
        if let Some(build) = &self.build {
            out.push('+');
            out.push_str(build);
        }
        out
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => compare_prerelease(a, b),
            })
    }

    pub fn equal(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }

    pub fn greater_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn less_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn greater_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Less
    }

    pub fn less_or_equal(&self, other: &Self) -> bool {
        self.compare(other) != Ordering::Greater
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Semver identifier ordering, applied to every label.
///
/// Dot-separated identifiers compare left to right. Digit-only identifiers
/// compare numerically and rank below alphanumeric ones, which compare as
/// strings. When one list is a prefix of the other, the longer list wins.
fn compare_prerelease(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_identifier(x, y) {
                Ordering::Equal => {}
                unequal => return unequal,
            },
        }
    }
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => compare_numeric(a, b),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric value without overflow; equal values with different leading
/// zeros still order by their text so equality stays consistent with hashing.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a_digits = a.trim_start_matches('0');
    let b_digits = b.trim_start_matches('0');
    a_digits
        .len()
        .cmp(&b_digits.len())
        .then_with(|| a_digits.cmp(b_digits))
        .then_with(|| a.cmp(b))
}

/// Compare two version strings.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.compare(&Version::parse(b)?))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
