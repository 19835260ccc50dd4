//! Decoding of `.top` files.

use tartan_bitfield::bitfield;

use super::{
    Colour, CrossSectionMarker, Direction, Document, Drawing, Element, Extend, Mapping, Point,
    Polyline, Reference, Shot, Trip,
    layout::{
        END, HORIZONTAL, MARKER, PADDING, POLYLINE, RawMapping, RawMarker, RawPoint,
        RawReference, RawShot, RawStation,
    },
    station::StationNumber,
    units::{self, FULL_TURN, ROLL_TURN, angle, meters},
};
use crate::{
    cursor::ByteCursor,
    error::{Context, Error, Malformation, Section},
};

const MAGIC: &[u8] = b"Top";

pub(crate) fn decode(r: &mut ByteCursor) -> Result<Document, Error> {
    r.magic(MAGIC)?;

    let version = r.u8()?;
    tracing::debug!(version, "decoding document");

    let trips = section(r, Section::Trips, trip)?;
    let shots = section(r, Section::Shots, shot)?;
    let references = section(r, Section::References, reference)?;

    r.enter(Context::Section {
        section: Section::Transform,
        index: 0,
    });
    let transform = mapping(r)?;

    let outline = drawing(r, Section::Outline)?;
    let sideview = drawing(r, Section::Sideview)?;

    r.skip_padding(PADDING);
    if !r.is_empty() {
        tracing::warn!(
            offset = r.offset(),
            remaining = r.remaining(),
            "ignored data after sideview"
        );
    }

    tracing::debug!(
        trips = trips.len(),
        shots = shots.len(),
        references = references.len(),
        "decoded document"
    );

    Ok(Document {
        version,
        trips,
        shots,
        references,
        transform,
        outline,
        sideview,
    })
}

/// Read a count-prefixed section.
fn section<T>(
    r: &mut ByteCursor,
    section: Section,
    item: fn(&mut ByteCursor) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    r.enter(Context::Section { section, index: 0 });
    let count = r.u32()? as usize;

    // Each item takes at least one byte.
    let mut items = Vec::with_capacity(count.min(r.remaining()));
    for index in 0..count {
        r.enter(Context::Section { section, index });
        items.push(item(r)?);
    }

    Ok(items)
}

fn station(raw: &RawStation) -> String {
    StationNumber::from_raw(raw).to_string()
}

fn point(raw: &RawPoint) -> Point {
    Point {
        x: meters(raw.x.get().into()),
        y: meters(raw.y.get().into()),
    }
}

fn mapping(r: &mut ByteCursor) -> Result<Mapping, Error> {
    let RawMapping { center, scale } = zerocopy::transmute!(r.take::<12>()?);
    Ok(Mapping {
        center: point(&center),
        scale: scale.get(),
    })
}

fn trip(r: &mut ByteCursor) -> Result<Trip, Error> {
    let date = units::from_ticks(r.u64()?)
        .ok_or_else(|| r.malformed(Malformation::InvalidDate))?;
    let comment = units::read_text(r)?;
    let declination = angle(r.u16()?.into(), FULL_TURN);

    Ok(Trip {
        date,
        comment,
        declination,
    })
}

fn shot(r: &mut ByteCursor) -> Result<Shot, Error> {
    let RawShot {
        from,
        to,
        tape,
        compass,
        clino,
        flags,
        roll,
        trip,
    } = zerocopy::transmute!(r.take::<20>()?);

    bitfield! {
        struct ShotFlags(u8) {
            [0] flip,
            [1] has_comment,
        }
    }

    let flags = ShotFlags(flags);
    let comment = if flags.has_comment() {
        Some(units::read_text(r)?)
    } else {
        None
    };

    Ok(Shot {
        from: station(&from),
        to: station(&to),
        tape: meters(tape.get().into()),
        compass: angle(compass.get().into(), FULL_TURN),
        clino: angle(clino.get().into(), FULL_TURN),
        roll: angle(roll.into(), ROLL_TURN),
        trip: trip.get(),
        extend: if flags.flip() {
            Extend::Left
        } else {
            Extend::Right
        },
        comment,
    })
}

fn reference(r: &mut ByteCursor) -> Result<Reference, Error> {
    let RawReference {
        station: id,
        east,
        north,
        altitude,
    } = zerocopy::transmute!(r.take::<24>()?);

    Ok(Reference {
        station: station(&id),
        east: meters(east.get()),
        north: meters(north.get()),
        altitude: meters(altitude.get().into()),
        comment: units::read_text(r)?,
    })
}

fn drawing(r: &mut ByteCursor, section: Section) -> Result<Drawing, Error> {
    r.enter(Context::Section { section, index: 0 });
    let transform = mapping(r)?;
    let mut elements = Vec::new();

    loop {
        let tag = r.u8()?;
        r.enter(Context::Element { section, tag });

        let element = match tag {
            END => break,
            POLYLINE => Element::Polyline(polyline(r)?),
            MARKER => Element::CrossSection(marker(r)?),
            // Elements carry no length, so an unknown one cannot be skipped.
            _ => {
                tracing::warn!(tag, offset = r.offset() - 1, %section, "unknown drawing element");
                return Err(Error::MalformedRecord {
                    offset: r.offset() - 1,
                    context: r.context(),
                    reason: Malformation::UnknownElement(tag),
                });
            }
        };
        elements.push(element);
    }

    Ok(Drawing {
        transform,
        elements,
    })
}

fn polyline(r: &mut ByteCursor) -> Result<Polyline, Error> {
    let count = r.u32()? as usize;

    let mut points = Vec::with_capacity(count.min(r.remaining() / 8));
    for _ in 0..count {
        let raw: RawPoint = zerocopy::transmute!(r.take::<8>()?);
        points.push(point(&raw));
    }

    let index = r.u8()?;
    let colour = Colour::from_index(index)
        .ok_or_else(|| r.malformed(Malformation::UnknownColour(index)))?;

    Ok(Polyline { colour, points })
}

fn marker(r: &mut ByteCursor) -> Result<CrossSectionMarker, Error> {
    let RawMarker {
        position,
        station: id,
        direction,
    } = zerocopy::transmute!(r.take::<16>()?);

    let direction = match direction.get() {
        HORIZONTAL => Direction::Horizontal,
        raw => Direction::Azimuth(angle(raw.into(), FULL_TURN)),
    };

    Ok(CrossSectionMarker {
        position: point(&position),
        station: station(&id),
        direction,
    })
}
