//! Decoder for Survex `.3d` image files.
//!
//! A file is a text header followed by a stream of tagged binary records.
//! Version 8 files and older versions assign tag bytes differently; the
//! header selects the protocol, and both build the same [`Survey`].
//!
//! ```no_run
//! let bytes = std::fs::read("cave.3d")?;
//! let survey = flowstone::survex::load(&bytes)?;
//!
//! for label in survey.graph.sorted_labels() {
//!     println!("{label}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::Read;

use either::Either::{Left, Right};

use crate::{cursor::ByteCursor, error::Error, graph::StationGraph};

mod date;
mod decoder;
mod header;
mod label;
mod record;

pub use date::SurveyDate;
pub use header::Header;

use decoder::Image;

/// Bytes skipped before trimming label components in files older than
/// version 8.
///
/// The format documentation says 16, while files written by the reference
/// implementation need 17.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyTrim {
    /// Skip 16 bytes.
    Documented,
    /// Skip 17 bytes.
    #[default]
    Reference,
}

impl LegacyTrim {
    pub fn skip(self) -> usize {
        match self {
            Self::Documented => 16,
            Self::Reference => 17,
        }
    }
}

/// Decode configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub legacy_trim: LegacyTrim,
}

/// Passage dimensions at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossSection {
    pub label: String,
    /// Left, right, up and down, in survey units.
    pub lrud: [i32; 4],
}

/// An entry of the passage sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PassageEntry {
    Section(CrossSection),
    /// Ends the current passage.
    End,
}

/// A decoded survey.
#[derive(Debug)]
pub struct Survey {
    pub header: Header,
    /// File-wide flags of a version 8 file; zero for older versions.
    pub flags: u8,
    pub graph: StationGraph,
    pub passages: Vec<PassageEntry>,
}

impl Survey {
    pub fn title(&self) -> &str {
        &self.header.title
    }

    /// Whether the survey was processed as an extended elevation.
    pub fn is_extended_elevation(&self) -> bool {
        self.flags & 0x80 != 0
    }

    /// Split the passage sequence into independent passages.
    ///
    /// A final passage lacking its end marker is still returned.
    pub fn passages(&self) -> Vec<Vec<&CrossSection>> {
        let mut passages = Vec::new();
        let mut current = Vec::new();

        for entry in &self.passages {
            match entry {
                PassageEntry::Section(xsect) => current.push(xsect),
                PassageEntry::End => passages.push(core::mem::take(&mut current)),
            }
        }

        if !current.is_empty() {
            passages.push(current);
        }

        passages
    }
}

/// Decode a survey from a slice with default options.
pub fn load(data: &[u8]) -> Result<Survey, Error> {
    load_with(data, &Options::default())
}

/// Decode a survey from a slice.
pub fn load_with(data: &[u8], options: &Options) -> Result<Survey, Error> {
    let r = &mut ByteCursor::new(data);
    let mut image = Image::default();

    let (header, successor) = Header::advance(r)?;
    tracing::debug!(version = header.version, title = %header.title, "decoding survey");

    let flags = match successor {
        Left(state) => {
            let flags = state.advance(r)?;
            decoder::decode_modern(r, &mut image)?;
            flags
        }
        Right(state) => {
            decoder::decode_legacy(r, state.version, options, &mut image)?;
            0
        }
    };

    if !r.is_empty() {
        tracing::warn!(
            offset = r.offset(),
            remaining = r.remaining(),
            "ignored data after end of survey"
        );
    }

    let Image { graph, passages } = image;
    tracing::debug!(
        stations = graph.len(),
        passages = passages.len(),
        "decoded survey"
    );

    Ok(Survey {
        header,
        flags,
        graph,
        passages,
    })
}

/// Decode a survey from a reader with default options.
///
/// The reader is drained into memory first.
pub fn load_reader(r: &mut impl Read) -> Result<Survey, Error> {
    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    load(&data)
}
