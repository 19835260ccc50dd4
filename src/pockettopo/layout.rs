//! Fixed-size parts of `.top` records.

use zerocopy::{
    FromBytes, Immutable, IntoBytes,
    byteorder::little_endian::{I16, I32, I64, U16, U32},
};

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawStation {
    pub minor: U16,
    pub major: U16,
}

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawPoint {
    pub x: I32,
    pub y: I32,
}

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawMapping {
    pub center: RawPoint,
    pub scale: I32,
}

/// A shot up to its optional comment.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawShot {
    pub from: RawStation,
    pub to: RawStation,
    pub tape: U32,
    pub compass: U16,
    pub clino: I16,
    pub flags: u8,
    pub roll: u8,
    pub trip: I16,
}

/// A reference point up to its comment.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawReference {
    pub station: RawStation,
    pub east: I64,
    pub north: I64,
    pub altitude: I32,
}

#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable)]
pub(crate) struct RawMarker {
    pub position: RawPoint,
    pub station: RawStation,
    pub direction: I32,
}

/// Drawing element tags.
pub(crate) const END: u8 = 0;
pub(crate) const POLYLINE: u8 = 1;
pub(crate) const MARKER: u8 = 3;

/// Marker direction meaning a horizontal cross-section.
pub(crate) const HORIZONTAL: i32 = -1;

/// Padding that may follow the last drawing.
pub(crate) const PADDING: &[u8] = b"\0\0\0\0";
