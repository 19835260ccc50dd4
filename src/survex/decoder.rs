//! Record loops for both protocol generations.

use zerocopy::{FromBytes, byteorder::little_endian::I32};

use super::{
    CrossSection, Options, PassageEntry, SurveyDate,
    label::LabelBuffer,
    record::{CrossSectionTag, LegacyRecord, Record},
};
use crate::{
    cursor::ByteCursor,
    error::{Context, Error, Malformation},
    graph::{Coord, LegFlags, StationFlags, StationGraph, StationId},
};

/// Size of the error information block: leg count, length and three
/// standard deviations.
const ERROR_INFO: usize = 5 * 4;

#[repr(C)]
#[derive(FromBytes)]
struct RawCoord {
    x: I32,
    y: I32,
    z: I32,
}

fn read_coord(r: &mut ByteCursor) -> Result<Coord, Error> {
    let RawCoord { x, y, z } = zerocopy::transmute!(r.take::<12>()?);
    Ok(Coord::new(x.get(), y.get(), z.get()))
}

/// What decoding produces.
#[derive(Debug, Default)]
pub(crate) struct Image {
    pub graph: StationGraph,
    pub passages: Vec<PassageEntry>,
}

/// Parse state carried between records of one decode.
#[derive(Debug, Default)]
pub(crate) struct DecoderState {
    label: LabelBuffer,
    /// Station the next leg starts from.
    position: Option<StationId>,
    style: Option<u8>,
    date: SurveyDate,
}

impl DecoderState {
    fn move_to(&mut self, out: &mut Image, coord: Coord) {
        self.position = Some(out.graph.get_or_create_dated(coord, self.date));
    }

    fn line_to(
        &mut self,
        r: &ByteCursor,
        out: &mut Image,
        coord: Coord,
        flags: LegFlags,
    ) -> Result<(), Error> {
        let from = self
            .position
            .ok_or_else(|| r.malformed(Malformation::LineWithoutMove))?;
        let to = out.graph.get_or_create_dated(coord, self.date);
        out.graph.connect(from, to, flags);
        self.position = Some(to);
        Ok(())
    }

    fn name_station(&mut self, out: &mut Image, coord: Coord, flags: StationFlags) {
        let id = out.graph.get_or_create_dated(coord, self.date);
        out.graph.add_label(id, self.label.to_text(), flags);
    }

    fn cross_section(
        &mut self,
        r: &mut ByteCursor,
        out: &mut Image,
        tag: CrossSectionTag,
    ) -> Result<(), Error> {
        let lrud = if tag.wide {
            [r.i32()?, r.i32()?, r.i32()?, r.i32()?]
        } else {
            [r.i16()?, r.i16()?, r.i16()?, r.i16()?].map(i32::from)
        };

        out.passages.push(PassageEntry::Section(CrossSection {
            label: self.label.to_text(),
            lrud,
        }));
        if tag.last {
            out.passages.push(PassageEntry::End);
        }
        Ok(())
    }
}

/// Decode version 8 records until the end of data or the end-of-data style
/// marker.
pub(crate) fn decode_modern(r: &mut ByteCursor, out: &mut Image) -> Result<(), Error> {
    let mut state = DecoderState::default();

    while !r.is_empty() {
        let tag = r.u8()?;
        r.enter(Context::Record { tag });

        match Record::classify(tag) {
            Record::Style(style) => {
                if style == 0 && state.style == Some(0) {
                    break;
                }
                state.style = Some(style);
            }
            Record::Move => {
                let coord = read_coord(r)?;
                state.move_to(out, coord);
            }
            Record::Date(record) => state.date = record.decode(r)?,
            Record::ErrorInfo => r.skip(ERROR_INFO)?,
            Record::CrossSection(xsect) => {
                state.label.read_modern(r)?;
                state.cross_section(r, out, xsect)?;
            }
            Record::Line { flags, reads_label } => {
                if reads_label {
                    state.label.read_modern(r)?;
                }
                let coord = read_coord(r)?;
                state.line_to(r, out, coord, flags)?;
            }
            Record::Label { flags } => {
                state.label.read_modern(r)?;
                let coord = read_coord(r)?;
                state.name_station(out, coord, flags);
            }
            Record::Reserved => tracing::trace!(tag, "skipped reserved tag"),
        }
    }

    Ok(())
}

/// Decode records of a file older than version 8 until the end of data.
pub(crate) fn decode_legacy(
    r: &mut ByteCursor,
    version: u8,
    options: &Options,
    out: &mut Image,
) -> Result<(), Error> {
    let mut state = DecoderState::default();
    let skip = options.legacy_trim.skip();

    while !r.is_empty() {
        let tag = r.u8()?;
        r.enter(Context::Record { tag });

        match LegacyRecord::classify(tag, version) {
            LegacyRecord::Stop => state.label.clear(),
            LegacyRecord::TrimComponents(count) => state
                .label
                .trim_components(skip, count)
                .map_err(|e| r.malformed(e))?,
            LegacyRecord::Move => {
                let coord = read_coord(r)?;
                state.move_to(out, coord);
            }
            LegacyRecord::TrimBytes(n) => state
                .label
                .trim_bytes(n.into())
                .map_err(|e| r.malformed(e))?,
            LegacyRecord::Date(record) => state.date = record.decode(r)?,
            LegacyRecord::ErrorInfo => r.skip(ERROR_INFO)?,
            LegacyRecord::CrossSection(xsect) => {
                state.label.read_legacy(r)?;
                state.cross_section(r, out, xsect)?;
            }
            LegacyRecord::Label { flags } => {
                state.label.read_legacy(r)?;
                let coord = read_coord(r)?;
                state.name_station(out, coord, flags);
            }
            LegacyRecord::Line => {
                state.label.read_legacy(r)?;
                let coord = read_coord(r)?;
                state.line_to(r, out, coord, LegFlags::empty())?;
            }
            LegacyRecord::Reserved => tracing::trace!(tag, "skipped reserved tag"),
        }
    }

    Ok(())
}
