//! Robot Framework versions and the version ranges validation rules are scoped to.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};


static VERSION_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").ok());

/// `major.minor[.patch]`. A version without a patch is older than the same
/// version with any patch, so `3.0 < 3.0.0 < 3.0.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RobotVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError {
    pub input: String,
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to parse Robot Framework version from '{}'", self.input)
    }
}

impl std::error::Error for VersionParseError {}

impl RobotVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    pub const fn with_patch(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch: Some(patch),
        }
    }

    /// Parses the first `x.y` or `x.y.z` found in the text, so both `3.1.2` and
    /// `Robot Framework 2.9.1 (Python 2.7.9 on win32)` are accepted.
    pub fn parse(text: &str) -> Result<Self, VersionParseError> {
        let error = || VersionParseError {
            input: text.to_string(),
        };
        let caps = VERSION_PATTERN
            .as_ref()
            .and_then(|re| re.captures(text))
            .ok_or_else(error)?;
        let number = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u32>().map_err(|_| error())).transpose();
        Ok(Self {
            major: number(1)?.ok_or_else(error)?,
            minor: number(2)?.ok_or_else(error)?,
            patch: number(3)?,
        })
    }

    pub fn is_older_than(&self, other: &RobotVersion) -> bool {
        self < other
    }

    pub fn is_older_than_or_equal_to(&self, other: &RobotVersion) -> bool {
        self <= other
    }

    pub fn is_newer_or_equal_to(&self, other: &RobotVersion) -> bool {
        self >= other
    }
}

impl Ord for RobotVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl PartialOrd for RobotVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RobotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for RobotVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RobotVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RobotVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        RobotVersion::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Half-open interval `[min, max)` over versions; either end may be unbounded.
///
/// `VersionRange::before(3.0)` is written `[3,0)` and
/// `VersionRange::between(3.0, 3.1)` is written `[3,0,3,1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionRange {
    pub min: Option<RobotVersion>,
    pub max: Option<RobotVersion>,
}

impl VersionRange {
    pub const fn all() -> Self {
        Self { min: None, max: None }
    }

    /// Every version older than `max`.
    pub const fn before(max: RobotVersion) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// `min` and every newer version.
    pub const fn from(min: RobotVersion) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn between(min: RobotVersion, max: RobotVersion) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, version: &RobotVersion) -> bool {
        let above_min = self.min.is_none_or(|min| version >= &min);
        let below_max = self.max.is_none_or(|max| version < &max);
        above_min && below_max
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: &RobotVersion| format!("{},{}", v.major, v.minor);
        match (&self.min, &self.max) {
            (None, None) => write!(f, "[)"),
            (None, Some(max)) => write!(f, "[{})", part(max)),
            (Some(min), None) => write!(f, "[{},)", part(min)),
            (Some(min), Some(max)) => write!(f, "[{},{})", part(min), part(max)),
        }
    }
}
