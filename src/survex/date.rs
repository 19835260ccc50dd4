//! Survey date records.

use chrono::{DateTime, Days, NaiveDate};

use crate::{cursor::ByteCursor, error::Error, error::Malformation};

/// The date range over which a station was surveyed.
///
/// Orders unknown dates before all known ones, then by start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurveyDate {
    #[default]
    Unknown,
    Range { start: NaiveDate, end: NaiveDate },
}

impl SurveyDate {
    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        Self::Range {
            start: date,
            end: date,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Range { .. })
    }

    pub fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Unknown => None,
            Self::Range { start, .. } => Some(*start),
        }
    }

    pub fn end(&self) -> Option<NaiveDate> {
        match self {
            Self::Unknown => None,
            Self::Range { end, .. } => Some(*end),
        }
    }
}

/// Day counts are relative to 1900-01-01.
fn from_days(days: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1900, 1, 1)?.checked_add_days(Days::new(days.into()))
}

fn from_seconds(seconds: u32) -> Option<NaiveDate> {
    Some(DateTime::from_timestamp(seconds.into(), 0)?.date_naive())
}

/// The encodings a date record may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateRecord {
    /// No payload; the date is unknown.
    Unknown,
    /// `u16` days.
    Day,
    /// `u16` days and a `u8` span in days.
    DaySpan,
    /// Two `u16` day counts.
    DayPair,
    /// `u32` unix seconds (format versions before 7).
    Seconds,
    /// Two `u32` unix seconds (format versions before 7).
    SecondsPair,
}

impl DateRecord {
    /// Read the record payload.
    pub fn decode(self, r: &mut ByteCursor) -> Result<SurveyDate, Error> {
        let range = match self {
            Self::Unknown => return Ok(SurveyDate::Unknown),
            Self::Day => {
                let start = r.u16()?;
                from_days(start.into()).map(|d| (d, d))
            }
            Self::DaySpan => {
                let start = u32::from(r.u16()?);
                let span = u32::from(r.u8()?);
                from_days(start).zip(from_days(start + span))
            }
            Self::DayPair => {
                let start = r.u16()?;
                let end = r.u16()?;
                from_days(start.into()).zip(from_days(end.into()))
            }
            Self::Seconds => {
                let start = r.u32()?;
                from_seconds(start).map(|d| (d, d))
            }
            Self::SecondsPair => {
                let start = r.u32()?;
                let end = r.u32()?;
                from_seconds(start).zip(from_seconds(end))
            }
        };

        let (start, end) = range.ok_or_else(|| r.malformed(Malformation::InvalidDate))?;
        Ok(SurveyDate::Range { start, end })
    }
}
