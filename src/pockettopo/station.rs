//! Station numbering.
//!
//! PocketTopo names stations `major.minor`, packed as two 16-bit numbers. A
//! major number of `0x8000` marks a station outside any survey, written as
//! `minor - 1` alone, with minor `0` standing for the empty name of a splay
//! end point.

use core::fmt;

use super::layout::RawStation;

const NO_SURVEY: u16 = 0x8000;

/// A packed station number.
///
/// Every number has a name, and every name produced by [`fmt::Display`]
/// parses back to the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationNumber {
    pub major: u16,
    pub minor: u16,
}

impl StationNumber {
    /// The empty name.
    pub const SPLAY: Self = Self {
        major: NO_SURVEY,
        minor: 0,
    };

    /// Parse a name in canonical decimal notation.
    pub fn parse(name: &str) -> Option<Self> {
        match name.split_once('.') {
            None if name.is_empty() => Some(Self::SPLAY),
            None => Some(Self {
                major: NO_SURVEY,
                minor: number(name)?.checked_add(1)?,
            }),
            Some((major, minor)) => {
                let major = number(major)?;
                (major != NO_SURVEY).then_some(Self {
                    major,
                    minor: number(minor)?,
                })
            }
        }
    }

    pub fn is_splay(self) -> bool {
        self == Self::SPLAY
    }

    pub(crate) fn from_raw(raw: &RawStation) -> Self {
        Self {
            major: raw.major.get(),
            minor: raw.minor.get(),
        }
    }

    pub(crate) fn to_raw(self) -> RawStation {
        RawStation {
            minor: self.minor.into(),
            major: self.major.into(),
        }
    }
}

impl fmt::Display for StationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.major, self.minor) {
            (NO_SURVEY, 0) => Ok(()),
            (NO_SURVEY, minor) => write!(f, "{}", minor - 1),
            (major, minor) => write!(f, "{major}.{minor}"),
        }
    }
}

/// A decimal number without sign or leading zeros.
fn number(s: &str) -> Option<u16> {
    let canonical = !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'));
    canonical.then(|| s.parse().ok()).flatten()
}

/// Whether `b` is the station numbered right after `a` in the same survey.
///
/// `("1.0", "1.1")` and `("0", "1")` are consecutive; `("1.0", "1.2")` is not.
pub fn is_consecutive_number(a: &str, b: &str) -> bool {
    let (survey_a, a) = a.rsplit_once('.').unwrap_or(("", a));
    let (survey_b, b) = b.rsplit_once('.').unwrap_or(("", b));

    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => survey_a == survey_b && a.checked_add(1) == Some(b),
        _ => false,
    }
}
