//! Encoding of `.top` files.
//!
//! Each record is validated completely before any of its bytes are written.

use tartan_bitfield::bitfield;
use zerocopy::IntoBytes;

use super::{
    CrossSectionMarker, Direction, Document, Drawing, Element, EncodeError, Extend, Mapping,
    Point, Polyline, Reference, Shot, Trip,
    layout::{
        END, HORIZONTAL, MARKER, POLYLINE, RawMapping, RawMarker, RawPoint, RawReference,
        RawShot, RawStation,
    },
    station::StationNumber,
    units::{self, FULL_TURN, ROLL_TURN, angle_inv, meters_inv},
};

pub(crate) fn encode(document: &Document) -> Result<Vec<u8>, EncodeError> {
    let mut out = b"Top".to_vec();
    out.push(document.version);

    section(&mut out, "trips", &document.trips, trip)?;
    section(&mut out, "shots", &document.shots, shot)?;
    section(&mut out, "references", &document.references, reference)?;

    out.extend_from_slice(mapping(&document.transform)?.as_bytes());
    drawing(&mut out, &document.outline)?;
    drawing(&mut out, &document.sideview)?;

    Ok(out)
}

fn section<T>(
    out: &mut Vec<u8>,
    field: &'static str,
    items: &[T],
    item: fn(&mut Vec<u8>, &T) -> Result<(), EncodeError>,
) -> Result<(), EncodeError> {
    out.extend_from_slice(&count(field, items.len())?.to_le_bytes());
    items.iter().try_for_each(|i| item(out, i))
}

fn count(field: &'static str, n: usize) -> Result<u32, EncodeError> {
    u32::try_from(n).map_err(|_| EncodeError::OutOfRange {
        field,
        value: n as f64,
    })
}

/// Convert a quantized value to the integer type of its field.
fn ranged<T: TryFrom<i64>>(field: &'static str, value: f64, raw: i64) -> Result<T, EncodeError> {
    let out_of_range = || EncodeError::OutOfRange { field, value };

    if !value.is_finite() {
        Err(out_of_range())?;
    }
    T::try_from(raw).map_err(|_| out_of_range())
}

fn angle<T: TryFrom<i64>>(field: &'static str, degrees: f64, divisor: u16) -> Result<T, EncodeError> {
    ranged(field, degrees, angle_inv(degrees, divisor))
}

fn distance<T: TryFrom<i64>>(field: &'static str, meters: f64) -> Result<T, EncodeError> {
    ranged(field, meters, meters_inv(meters))
}

fn station(name: &str) -> Result<RawStation, EncodeError> {
    StationNumber::parse(name)
        .map(StationNumber::to_raw)
        .ok_or_else(|| EncodeError::Station(name.to_owned()))
}

fn point(point: &Point) -> Result<RawPoint, EncodeError> {
    Ok(RawPoint {
        x: distance::<i32>("point", point.x)?.into(),
        y: distance::<i32>("point", point.y)?.into(),
    })
}

fn mapping(mapping: &Mapping) -> Result<RawMapping, EncodeError> {
    Ok(RawMapping {
        center: point(&mapping.center)?,
        scale: mapping.scale.into(),
    })
}

/// A length prefixed string, checked before writing.
struct Text<'a> {
    len: u32,
    bytes: &'a [u8],
}

impl<'a> Text<'a> {
    fn new(s: &'a str) -> Result<Self, EncodeError> {
        let len = u32::try_from(s.len()).map_err(|_| EncodeError::TextTooLong(s.len()))?;
        Ok(Self {
            len,
            bytes: s.as_bytes(),
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        units::write_text_len(out, self.len);
        out.extend_from_slice(self.bytes);
    }
}

fn trip(out: &mut Vec<u8>, trip: &Trip) -> Result<(), EncodeError> {
    let ticks = units::to_ticks(trip.date).ok_or(EncodeError::OutOfRange {
        field: "trip date",
        value: trip.date.timestamp() as f64,
    })?;
    let comment = Text::new(&trip.comment)?;
    let declination: u16 = angle("declination", trip.declination, FULL_TURN)?;

    out.extend_from_slice(&ticks.to_le_bytes());
    comment.write(out);
    out.extend_from_slice(&declination.to_le_bytes());
    Ok(())
}

fn shot(out: &mut Vec<u8>, shot: &Shot) -> Result<(), EncodeError> {
    bitfield! {
        struct ShotFlags(u8) {
            [0] flip,
            [1] has_comment,
        }
    }

    let mut flags = ShotFlags(0);
    flags.set_flip(shot.extend == Extend::Left);
    flags.set_has_comment(shot.comment.is_some());

    let raw = RawShot {
        from: station(&shot.from)?,
        to: station(&shot.to)?,
        tape: distance::<u32>("tape", shot.tape)?.into(),
        compass: angle::<u16>("compass", shot.compass, FULL_TURN)?.into(),
        clino: angle::<i16>("clino", shot.clino, FULL_TURN)?.into(),
        flags: flags.0,
        roll: angle("roll", shot.roll, ROLL_TURN)?,
        trip: shot.trip.into(),
    };
    let comment = shot.comment.as_deref().map(Text::new).transpose()?;

    out.extend_from_slice(raw.as_bytes());
    if let Some(comment) = comment {
        comment.write(out);
    }
    Ok(())
}

fn reference(out: &mut Vec<u8>, reference: &Reference) -> Result<(), EncodeError> {
    let raw = RawReference {
        station: station(&reference.station)?,
        east: distance::<i64>("east", reference.east)?.into(),
        north: distance::<i64>("north", reference.north)?.into(),
        altitude: distance::<i32>("altitude", reference.altitude)?.into(),
    };
    let comment = Text::new(&reference.comment)?;

    out.extend_from_slice(raw.as_bytes());
    comment.write(out);
    Ok(())
}

fn drawing(out: &mut Vec<u8>, drawing: &Drawing) -> Result<(), EncodeError> {
    out.extend_from_slice(mapping(&drawing.transform)?.as_bytes());

    for element in &drawing.elements {
        match element {
            Element::Polyline(line) => polyline(out, line)?,
            Element::CrossSection(xsect) => marker(out, xsect)?,
        }
    }

    out.push(END);
    Ok(())
}

fn polyline(out: &mut Vec<u8>, line: &Polyline) -> Result<(), EncodeError> {
    let n = count("polyline points", line.points.len())?;
    let points = line.points.iter().map(point).collect::<Result<Vec<_>, _>>()?;

    out.push(POLYLINE);
    out.extend_from_slice(&n.to_le_bytes());
    for p in &points {
        out.extend_from_slice(p.as_bytes());
    }
    out.push(line.colour.index());
    Ok(())
}

fn marker(out: &mut Vec<u8>, marker: &CrossSectionMarker) -> Result<(), EncodeError> {
    let direction = match marker.direction {
        Direction::Horizontal => HORIZONTAL,
        Direction::Azimuth(degrees) => match angle::<i32>("marker direction", degrees, FULL_TURN)? {
            HORIZONTAL => {
                return Err(EncodeError::OutOfRange {
                    field: "marker direction",
                    value: degrees,
                });
            }
            raw => raw,
        },
    };

    let raw = RawMarker {
        position: point(&marker.position)?,
        station: station(&marker.station)?,
        direction: direction.into(),
    };

    out.push(MARKER);
    out.extend_from_slice(raw.as_bytes());
    Ok(())
}
