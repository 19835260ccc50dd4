//! Classification of record tag bytes.
//!
//! Both protocol generations dispatch on a single leading tag byte, but
//! assign the byte ranges differently. Each tag is classified exactly once,
//! and unassigned ranges map to an explicit `Reserved` variant.

use tartan_bitfield::bitfield;

use super::date::DateRecord;
use crate::graph::{LegFlags, StationFlags};

/// A cross-section record's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CrossSectionTag {
    /// Dimensions are `i32` rather than `i16`.
    pub wide: bool,
    /// This is the final cross-section of a passage.
    pub last: bool,
}

impl CrossSectionTag {
    fn from_tag(tag: u8) -> Self {
        bitfield! {
            struct XsectTag(u8) {
                [0] last,
                [1] wide,
            }
        }

        let tag = XsectTag(tag);
        Self {
            wide: tag.wide(),
            last: tag.last(),
        }
    }
}

/// A record of a version 8 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Record {
    Style(u8),
    Move,
    Date(DateRecord),
    ErrorInfo,
    CrossSection(CrossSectionTag),
    Line { flags: LegFlags, reads_label: bool },
    Label { flags: StationFlags },
    Reserved,
}

impl Record {
    pub fn classify(tag: u8) -> Self {
        match tag {
            0x00..=0x05 => Self::Style(tag),
            0x06..=0x0e => Self::Reserved,
            0x0f => Self::Move,
            0x10 => Self::Date(DateRecord::Unknown),
            0x11 => Self::Date(DateRecord::Day),
            0x12 => Self::Date(DateRecord::DaySpan),
            0x13 => Self::Date(DateRecord::DayPair),
            0x14..=0x1e => Self::Reserved,
            0x1f => Self::ErrorInfo,
            0x20..=0x2f => Self::Reserved,
            0x30..=0x33 => Self::CrossSection(CrossSectionTag::from_tag(tag)),
            0x34..=0x3f => Self::Reserved,
            0x40..=0x7f => {
                bitfield! {
                    struct LineTag(u8) {
                        [0..3] leg_flags: u8,
                        [5] no_label,
                    }
                }

                let tag = LineTag(tag);
                Self::Line {
                    flags: LegFlags::from_bits(tag.leg_flags()),
                    reads_label: !tag.no_label(),
                }
            }
            0x80..=0xff => {
                bitfield! {
                    struct LabelTag(u8) {
                        [0..7] station_flags: u8,
                    }
                }

                Self::Label {
                    flags: StationFlags::from_bits(LabelTag(tag).station_flags()),
                }
            }
        }
    }
}

/// A record of a file older than version 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LegacyRecord {
    /// Clear the label.
    Stop,
    /// Remove this many trailing dot-separated components.
    TrimComponents(u8),
    Move,
    /// Remove this many trailing bytes.
    TrimBytes(u8),
    Date(DateRecord),
    ErrorInfo,
    CrossSection(CrossSectionTag),
    Label { flags: StationFlags },
    Line,
    Reserved,
}

impl LegacyRecord {
    pub fn classify(tag: u8, version: u8) -> Self {
        let seconds = version < 7;

        match tag {
            0x00 => Self::Stop,
            0x01..=0x0e => Self::TrimComponents(tag),
            0x0f => Self::Move,
            0x10..=0x1f => Self::TrimBytes(tag - 0x0f),
            0x20 if seconds => Self::Date(DateRecord::Seconds),
            0x20 => Self::Date(DateRecord::Day),
            0x21 if seconds => Self::Date(DateRecord::SecondsPair),
            0x21 => Self::Date(DateRecord::DaySpan),
            0x22 => Self::ErrorInfo,
            0x23 => Self::Date(DateRecord::DayPair),
            0x24 => Self::Date(DateRecord::Unknown),
            0x25..=0x2f => Self::Reserved,
            0x30..=0x33 => Self::CrossSection(CrossSectionTag::from_tag(tag)),
            0x34..=0x3f => Self::Reserved,
            0x40..=0x7f => {
                bitfield! {
                    struct LabelTag(u8) {
                        [0..6] station_flags: u8,
                    }
                }

                Self::Label {
                    flags: StationFlags::from_bits(LabelTag(tag).station_flags()),
                }
            }
            0x80..=0xbf => Self::Line,
            0xc0..=0xff => Self::Reserved,
        }
    }
}
