//! Strict document version numbers

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A strict `major.minor[.patch][{a|b}N]` version number.
///
/// A missing patch number equals `0`, and a release sorts after its own
/// pre-releases.
///
/// # Example
///
/// ```
/// use mixbox::parser::DocumentVersion;
///
/// let v: DocumentVersion = "1.2".parse().unwrap();
/// assert_eq!(v, "1.2.0".parse::<DocumentVersion>().unwrap());
/// assert!(v > "1.2b3".parse::<DocumentVersion>().unwrap());
/// assert_eq!(v.to_string(), "1.2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentVersion {
    /// Major number
    pub major: u64,
    /// Minor number
    pub minor: u64,
    /// Patch number
    pub patch: u64,
    /// Pre-release tag (`'a'` or `'b'`) and number
    pub pre: Option<(char, u64)>,
}

fn number(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl DocumentVersion {
    /// Create a release version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    fn parse_parts(s: &str) -> Option<Self> {
        let (release, pre) = match s.find(['a', 'b']) {
            Some(idx) => {
                let tag = s[idx..].chars().next()?;
                (&s[..idx], Some((tag, number(&s[idx + 1..])?)))
            }
            None => (s, None),
        };

        let parts: Vec<&str> = release.split('.').collect();
        let (major, minor, patch) = match parts.as_slice() {
            [major, minor] => (number(major)?, number(minor)?, 0),
            [major, minor, patch] => (number(major)?, number(minor)?, number(patch)?),
            _ => return None,
        };
        Some(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl FromStr for DocumentVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_parts(s.trim()).ok_or_else(|| ParseError::InvalidVersion(s.to_string()))
    }
}

impl Ord for DocumentVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre, other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(&b),
            })
    }
}

impl PartialOrd for DocumentVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if let Some((tag, n)) = self.pre {
            write!(f, "{tag}{n}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> DocumentVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_loose_versions() {
        for bad in ["1", "1.2.3.4", "1.x", "", "1.2c1", "1.2a", "v1.2"] {
            assert!(bad.parse::<DocumentVersion>().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0"));
        assert!(v("1.0") < v("1.0.1"));
        assert!(v("1.9") < v("1.10"));
    }

    #[test]
    fn test_display() {
        assert_eq!(v("1.1.0").to_string(), "1.1");
        assert_eq!(v("1.1.1").to_string(), "1.1.1");
        assert_eq!(v("2.0b2").to_string(), "2.0b2");
    }
}
