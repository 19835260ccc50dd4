//! Quantized angles, distances, dates and text.

use chrono::{DateTime, Utc};

use crate::{
    cursor::ByteCursor,
    error::{Error, Malformation},
};

/// Angle units per full turn of most angles.
pub const FULL_TURN: u16 = 0xffff;
/// Angle units per full turn of the roll angle.
pub const ROLL_TURN: u16 = 0xff;

/// Convert internal angle units to degrees.
pub fn angle(raw: i64, divisor: u16) -> f64 {
    raw as f64 / f64::from(divisor) * 360.0
}

/// Convert degrees to the nearest internal angle unit.
pub fn angle_inv(degrees: f64, divisor: u16) -> i64 {
    (degrees / 360.0 * f64::from(divisor)).round() as i64
}

/// Convert millimetres to metres.
pub fn meters(mm: i64) -> f64 {
    mm as f64 / 1000.0
}

/// Convert metres to millimetres, truncating.
///
/// Values within floating point error of a whole millimetre are taken as
/// that millimetre, so `meters_inv(meters(mm)) == mm`.
pub fn meters_inv(meters: f64) -> i64 {
    let mm = meters * 1000.0;
    let nearest = mm.round();
    let tolerance = (mm.abs() * 1e-12).max(1e-6);

    if (mm - nearest).abs() <= tolerance {
        nearest as i64
    } else {
        mm.trunc() as i64
    }
}

const TICKS_PER_SECOND: i64 = 10_000_000;
/// Ticks from 0001-01-01 to 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

/// Convert .NET ticks (100 ns since 0001-01-01) to an instant.
pub fn from_ticks(ticks: u64) -> Option<DateTime<Utc>> {
    let since_epoch = i64::try_from(ticks).ok()? - UNIX_EPOCH_TICKS;
    let seconds = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = since_epoch.rem_euclid(TICKS_PER_SECOND) * 100;
    DateTime::from_timestamp(seconds, nanos as u32)
}

/// Convert an instant to .NET ticks, dropping sub-tick precision.
pub fn to_ticks(date: DateTime<Utc>) -> Option<u64> {
    let sub = i64::from(date.timestamp_subsec_nanos() / 100);
    let ticks = date
        .timestamp()
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(sub)?
        .checked_add(UNIX_EPOCH_TICKS)?;
    u64::try_from(ticks).ok()
}

/// Read a string prefixed with its 7-bit encoded byte length.
pub(crate) fn read_text(r: &mut ByteCursor) -> Result<String, Error> {
    let mut len = 0u64;
    let mut shift = 0;

    loop {
        let b = r.u8()?;
        len |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            Err(r.malformed(Malformation::LengthOverflow))?;
        }
    }

    let len = u32::try_from(len).map_err(|_| r.malformed(Malformation::LengthOverflow))?;
    Ok(String::from_utf8_lossy(r.bytes(len as usize)?).into_owned())
}

/// Append the 7-bit encoded length prefix of `len` bytes of text.
pub(crate) fn write_text_len(out: &mut Vec<u8>, len: u32) {
    let mut len = len;
    while len >= 0x80 {
        out.push(len as u8 | 0x80);
        len >>= 7;
    }
    out.push(len as u8);
}
