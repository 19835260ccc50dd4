//! The text header preceding the records.

use chrono::{DateTime, Utc};
use either::Either::{self, Left, Right};

use crate::{cursor::ByteCursor, error::Error};

const MAGIC: &[u8] = b"Survex 3D Image File";

/// Oldest and newest supported format versions.
const VERSIONS: core::ops::RangeInclusive<u8> = 3..=8;

/// Fields of the header.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub version: u8,
    pub title: String,
    pub coordinate_system: Option<String>,
    /// The timestamp line as written.
    pub timestamp: String,
}

impl Header {
    /// Decode the header lines.
    ///
    /// Returns the header, and a successor state token for the record
    /// protocol its version uses.
    pub(crate) fn advance(r: &mut ByteCursor) -> Result<(Self, Either<Modern, Legacy>), Error> {
        r.magic(MAGIC)?;
        r.line()?;

        let line = r.line()?;
        let version = line
            .strip_prefix(b"v")
            .and_then(|v| core::str::from_utf8(v).ok())
            .and_then(|v| v.trim_end().parse::<u8>().ok())
            .filter(|v| VERSIONS.contains(v))
            .ok_or_else(|| Error::InvalidVersion {
                found: String::from_utf8_lossy(line).into_owned(),
            })?;

        // The title may be followed by a NUL and the coordinate system.
        let line = r.line()?;
        let (title, coordinate_system) = match line.iter().position(|&b| b == 0) {
            Some(i) => (&line[..i], Some(&line[i + 1..])),
            None => (line, None),
        };

        let timestamp = r.line()?;

        let header = Self {
            version,
            title: text(title),
            coordinate_system: coordinate_system.filter(|cs| !cs.is_empty()).map(text),
            timestamp: text(timestamp),
        };

        let successor = if version >= 8 {
            Left(Modern(()))
        } else {
            Right(Legacy { version })
        };

        Ok((header, successor))
    }

    /// The timestamp as an instant, if written as `@` and unix seconds.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let seconds = self.timestamp.strip_prefix('@')?.trim().parse().ok()?;
        DateTime::from_timestamp(seconds, 0)
    }
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\r').to_owned()
}

/// State token to decode the file-wide flags of a version 8 file.
#[derive(Debug)]
pub(crate) struct Modern(());

impl Modern {
    /// Returns the file flags.
    pub fn advance(self, r: &mut ByteCursor) -> Result<u8, Error> {
        r.u8()
    }
}

/// State token for the records of a file older than version 8.
#[derive(Debug)]
pub(crate) struct Legacy {
    pub version: u8,
}
