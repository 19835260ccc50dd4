//! Reader and writer for PocketTopo `.top` files.
//!
//! A file holds trips, shots, reference points and two drawings, the plan
//! view outline and the side view. Every value this module models survives
//! a [`load`] and [`dump`] round trip unchanged.
//!
//! ```no_run
//! let bytes = std::fs::read("cave.top")?;
//! let document = flowstone::pockettopo::load(&bytes)?;
//! println!("{}", document.summary());
//!
//! let shots = flowstone::pockettopo::average_shots(&document.shots, &Default::default());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{collections::HashSet, fmt, io::Read};

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::{cursor::ByteCursor, error::Error};

mod average;
mod layout;
mod read;
pub mod station;
pub mod units;
mod write;

pub use average::{Options, average_shots, avgdeg};
pub use station::{StationNumber, is_consecutive_number};

/// Errors occurring while encoding a document.
///
/// Raised before any byte of the offending record is written.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A station name outside the numbering scheme.
    #[error("Station name {0:?} has no station number.")]
    Station(String),
    /// A value outside the range of its field.
    #[error("Value {value} of {field} is out of range.")]
    OutOfRange { field: &'static str, value: f64 },
    /// A string longer than its length prefix can describe.
    #[error("Text of {0} bytes is too long.")]
    TextTooLong(usize),
}

/// A survey trip.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    pub date: DateTime<Utc>,
    pub comment: String,
    /// Declination in degrees.
    pub declination: f64,
}

/// Projection direction of a shot in an extended elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extend {
    Left,
    #[default]
    Right,
}

/// A measured shot.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shot {
    pub from: String,
    /// Empty for a splay.
    pub to: String,
    /// Length in metres.
    pub tape: f64,
    /// Bearing in degrees.
    pub compass: f64,
    /// Inclination in degrees.
    pub clino: f64,
    /// Roll of the instrument in degrees.
    pub roll: f64,
    /// Index of the trip, or negative for none.
    pub trip: i16,
    pub extend: Extend,
    pub comment: Option<String>,
}

impl Shot {
    pub fn is_splay(&self) -> bool {
        self.to.is_empty()
    }

    /// The same shot measured from the other end.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            compass: (self.compass + 180.0).rem_euclid(360.0),
            clino: -self.clino,
            ..self.clone()
        }
    }
}

/// A station with known absolute position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reference {
    pub station: String,
    /// Metres.
    pub east: f64,
    /// Metres.
    pub north: f64,
    /// Metres.
    pub altitude: f64,
    pub comment: String,
}

/// A point of a drawing, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A view transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    pub center: Point,
    pub scale: i32,
}

/// Colours of drawn lines, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Colour {
    Black = 1,
    Gray,
    Brown,
    Blue,
    Red,
    Green,
    Orange,
}

impl Colour {
    pub const ALL: [Self; 7] = [
        Self::Black,
        Self::Gray,
        Self::Brown,
        Self::Blue,
        Self::Red,
        Self::Green,
        Self::Orange,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Gray => "gray",
            Self::Brown => "brown",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Green => "green",
            Self::Orange => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    pub colour: Colour,
    pub points: Vec<Point>,
}

/// Orientation of a cross-section marker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Horizontal,
    /// Projection bearing in degrees.
    Azimuth(f64),
}

/// Where a cross-section of a station is drawn.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossSectionMarker {
    pub position: Point,
    pub station: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Polyline(Polyline),
    CrossSection(CrossSectionMarker),
}

/// A drawing, with elements in file order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawing {
    pub transform: Mapping,
    pub elements: Vec<Element>,
}

impl Drawing {
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.elements.iter().filter_map(|e| match e {
            Element::Polyline(p) => Some(p),
            Element::CrossSection(_) => None,
        })
    }

    pub fn cross_sections(&self) -> impl Iterator<Item = &CrossSectionMarker> {
        self.elements.iter().filter_map(|e| match e {
            Element::CrossSection(x) => Some(x),
            Element::Polyline(_) => None,
        })
    }

    /// Bounding box of all polyline points as minimum and maximum corners.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.polylines().flat_map(|p| &p.points);
        let first = *points.next()?;

        Some(points.fold((first, first), |(lo, hi), p| {
            (
                Point {
                    x: lo.x.min(p.x),
                    y: lo.y.min(p.y),
                },
                Point {
                    x: hi.x.max(p.x),
                    y: hi.y.max(p.y),
                },
            )
        }))
    }
}

/// A whole `.top` file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub version: u8,
    pub trips: Vec<Trip>,
    pub shots: Vec<Shot>,
    pub references: Vec<Reference>,
    /// Transform between references and the outline.
    pub transform: Mapping,
    pub outline: Drawing,
    pub sideview: Drawing,
}

impl Document {
    /// The document PocketTopo writes for a new survey: one trip and no
    /// data.
    pub fn template() -> Self {
        let mapping = |x, y, scale| Mapping {
            center: Point { x, y },
            scale,
        };
        let drawing = |transform| Drawing {
            transform,
            elements: Vec::new(),
        };

        Self {
            version: 3,
            trips: vec![Trip {
                date: Utc.with_ymd_and_hms(2005, 7, 9, 23, 0, 0).single().unwrap_or_default(),
                comment: String::new(),
                declination: 0.0,
            }],
            shots: Vec::new(),
            references: Vec::new(),
            transform: mapping(0.001, -10.8, 14400),
            outline: drawing(mapping(2.0, 0.001, -36938)),
            sideview: drawing(mapping(76.8, 65.536, -171_311_104)),
        }
    }

    /// Names of all stations shots start or end at.
    pub fn stations(&self) -> HashSet<&str> {
        self.shots
            .iter()
            .flat_map(|s| [s.from.as_str(), s.to.as_str()])
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            trips: self.trips.len(),
            shots: self.shots.len(),
            stations: self.stations().len(),
        }
    }
}

/// Counts describing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub trips: usize,
    pub shots: usize,
    pub stations: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} trip(s), {} shots, {} named stations",
            self.trips, self.shots, self.stations
        )
    }
}

/// Decode a document from a slice.
pub fn load(data: &[u8]) -> Result<Document, Error> {
    read::decode(&mut ByteCursor::new(data))
}

/// Decode a document from a reader.
///
/// The reader is drained into memory first.
pub fn load_reader(r: &mut impl Read) -> Result<Document, Error> {
    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    load(&data)
}

/// Encode a document.
pub fn dump(document: &Document) -> Result<Vec<u8>, EncodeError> {
    write::encode(document)
}
