//! Line identifier types.
//!
//! The provider identifies a line with a colon-delimited "stateless" string
//! of the form `OPERATOR:LINE:TYPE:DIRECTION:VARIANT`, e.g.
//! `swm:03134:G:H:015`. The trailing variant segment is not stable: the
//! provider bumps it from time to time while the line itself stays the same.
//! [`LineKey`] drops that segment and is what every identity comparison
//! between a live and a saved identifier goes through.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A provider-issued line identifier, kept exactly as received.
///
/// # Examples
///
/// ```
/// use departure_monitor::domain::LineId;
///
/// let old = LineId::new("swm:03134:G:H:015");
/// let new = LineId::new("swm:03134:G:H:016");
/// assert_ne!(old, new);
/// assert_eq!(old.key(), new.key());
/// assert_eq!(old.key().as_str(), "swm:03134:G:H");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Wrap a raw identifier. Any string is accepted.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the stable identity of this line.
    pub fn key(&self) -> LineKey {
        line_key(&self.0)
    }

    /// Returns true if both identifiers name the same logical line.
    pub fn same_line(&self, other: &LineId) -> bool {
        self.key() == other.key()
    }

    /// Split into the five named parts, if the identifier has them all.
    pub fn parts(&self) -> Option<LineIdParts<'_>> {
        let mut it = self.0.split(':');
        let parts = LineIdParts {
            operator: it.next()?,
            line: it.next()?,
            kind: it.next()?,
            direction: Direction::from_code(it.next()?),
            variant: it.next()?,
        };
        if it.next().is_some() {
            return None;
        }
        Some(parts)
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The stable prefix of a [`LineId`]: everything but the variant segment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey(String);

impl LineKey {
    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineKey({})", self.0)
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip the last colon-delimited segment of a line identifier.
///
/// An identifier without any colon has no segment to strip and is returned
/// unchanged.
pub fn line_key(identifier: &str) -> LineKey {
    match identifier.rsplit_once(':') {
        Some((prefix, _variant)) => LineKey(prefix.to_string()),
        None => LineKey(identifier.to_string()),
    }
}

/// Direction of travel encoded in the fourth segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `H`, outbound ("Hinfahrt").
    Outbound,
    /// `R`, return ("Rückfahrt").
    Return,
    /// Anything else the provider sends.
    Other,
}

impl Direction {
    fn from_code(code: &str) -> Self {
        match code {
            "H" => Direction::Outbound,
            "R" => Direction::Return,
            _ => Direction::Other,
        }
    }
}

/// The named segments of a five-part line identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineIdParts<'a> {
    pub operator: &'a str,
    pub line: &'a str,
    pub kind: &'a str,
    pub direction: Direction,
    pub variant: &'a str,
}
