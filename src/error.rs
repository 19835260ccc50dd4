//! Errors shared by the decoders.

use core::fmt;

use thiserror::Error;

/// Errors occurring while decoding a survey file.
///
/// Any error aborts the decode. There is no partial result.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Incorrect file signature.
    #[error("Incorrect file signature ({context}).")]
    InvalidMagic { context: Context },
    /// Unparseable or unsupported format version.
    #[error("Unparseable or unsupported format version ({found:?}).")]
    InvalidVersion { found: String },
    /// Unexpectedly reached the end of the data.
    #[error("Unexpectedly reached the end of the data at offset {offset} ({context}).")]
    UnexpectedEof { offset: usize, context: Context },
    /// A record violates the format's internal consistency.
    #[error("Malformed record at offset {offset} ({context}): {reason}.")]
    MalformedRecord {
        offset: usize,
        context: Context,
        reason: Malformation,
    },
}

/// The reason a record is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("trimmed past the start of label {label:?}")]
    TrimPastStart { label: String },
    #[error("leg drawn without a preceding move")]
    LineWithoutMove,
    #[error("unknown colour index {0}")]
    UnknownColour(u8),
    #[error("unknown drawing element {0:#04x}")]
    UnknownElement(u8),
    #[error("date out of range")]
    InvalidDate,
    #[error("length prefix exceeds 32 bits")]
    LengthOverflow,
}

/// Where in a file decoding was when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Context {
    /// Fixed header preceding the records.
    #[default]
    Header,
    /// A Survex record, identified by its tag byte.
    Record { tag: u8 },
    /// An item of a PocketTopo section.
    Section { section: Section, index: usize },
    /// An element of a PocketTopo drawing.
    Element { section: Section, tag: u8 },
}

/// A section of a PocketTopo file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Trips,
    Shots,
    References,
    Transform,
    Outline,
    Sideview,
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("file header"),
            Self::Record { tag } => write!(f, "record tag {tag:#04x}"),
            Self::Section { section, index } => write!(f, "{section} item {index}"),
            Self::Element { section, tag } => write!(f, "{section} element tag {tag:#04x}"),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trips => "trips",
            Self::Shots => "shots",
            Self::References => "references",
            Self::Transform => "transform",
            Self::Outline => "outline",
            Self::Sideview => "sideview",
        })
    }
}
