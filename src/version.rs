use anyhow::{Context, Result};
use std::{fmt, str::FromStr};

/// Three-part build number recorded in the version file and served by the
/// update endpoint. Only equality matters; there is no "newer than".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub sub_minor: u32,
}

impl Version {
    /// Stand-in for "no known version".
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u32, minor: u32, sub_minor: u32) -> Self {
        Self {
            major,
            minor,
            sub_minor,
        }
    }

    /// Parses `major.minor.sub_minor`.
    ///
    /// Anything that does not split into exactly three segments yields
    /// [`Version::ZERO`] instead of an error. A segment that is not a
    /// non-negative integer is still an error.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.trim().split('.').collect();
        if parts.len() != 3 {
            return Ok(Self::ZERO);
        }
        Ok(Self {
            major: parse_segment(parts[0], "major")?,
            minor: parse_segment(parts[1], "minor")?,
            sub_minor: parse_segment(parts[2], "sub-minor")?,
        })
    }

    pub fn differs(&self, other: &Version) -> bool {
        self.major != other.major || self.minor != other.minor || self.sub_minor != other.sub_minor
    }

    pub fn is_zero(&self) -> bool {
        !self.differs(&Self::ZERO)
    }
}

fn parse_segment(raw: &str, label: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("invalid {label} version segment {raw:?}"))
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.sub_minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_roundtrip() {
        for v in [
            Version::ZERO,
            Version::new(1, 2, 3),
            Version::new(10, 0, 42),
            Version::new(u32::MAX, 7, 0),
        ] {
            assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
        }
    }

    #[test]
    fn wrong_segment_count_is_zero() {
        for raw in ["", "1", "1.2", "1.2.3.4", "...", "a.b", "1.2.3.4.5"] {
            assert_eq!(Version::parse(raw).unwrap(), Version::ZERO, "input {raw:?}");
        }
    }

    #[test]
    fn non_numeric_segment_is_an_error() {
        let err = Version::parse("1.x.3").unwrap_err();
        assert!(err.to_string().contains("minor"));
        assert!(Version::parse("1.-2.3").is_err());
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(Version::parse(" 1.3.0\r\n").unwrap(), Version::new(1, 3, 0));
        assert_eq!("2. 0 .1".parse::<Version>().unwrap(), Version::new(2, 0, 1));
    }

    #[test]
    fn differs_detects_each_component() {
        let base = Version::new(1, 2, 3);
        assert!(!base.differs(&base));
        assert!(base.differs(&Version::new(2, 2, 3)));
        assert!(base.differs(&Version::new(1, 3, 3)));
        assert!(base.differs(&Version::new(1, 2, 4)));
    }

    #[test]
    fn zero_is_zero() {
        assert!(Version::ZERO.is_zero());
        assert!(Version::default().is_zero());
        assert!(!Version::new(0, 0, 1).is_zero());
    }
}
