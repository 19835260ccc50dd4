//! The incrementally edited station label.

use crate::{
    cursor::ByteCursor,
    error::{Error, Malformation},
};

/// Label bytes carried from one record to the next.
///
/// Records only describe how the label differs from its previous value, so
/// the buffer holds raw bytes and edits are counted in bytes.
#[derive(Debug, Default)]
pub(crate) struct LabelBuffer {
    bytes: Vec<u8>,
}

impl LabelBuffer {
    /// The label as text, replacing invalid UTF-8 sequences.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Apply a version 8 label edit read from the cursor.
    ///
    /// A nonzero control byte packs the delete count in its high nibble and
    /// the append count in its low nibble. A zero control byte is followed by
    /// both counts in their long form.
    pub fn read_modern(&mut self, r: &mut ByteCursor) -> Result<(), Error> {
        let (delete, append) = match edit_counts(r.u8()?) {
            Some((delete, append)) => (delete.into(), append.into()),
            None => (long_count(r)?, long_count(r)?),
        };

        self.trim_bytes(delete).map_err(|e| r.malformed(e))?;
        self.bytes.extend_from_slice(r.bytes(append)?);
        Ok(())
    }

    /// Append a length-prefixed run of label bytes, as used before version 8.
    pub fn read_legacy(&mut self, r: &mut ByteCursor) -> Result<(), Error> {
        let length = match r.u8()? {
            0xfe => 0xfe + usize::from(r.u16()?),
            0xff => {
                let long = usize::try_from(r.u32()?)
                    .map_err(|_| r.malformed(Malformation::LengthOverflow))?;
                long.checked_add(0xff)
                    .ok_or_else(|| r.malformed(Malformation::LengthOverflow))?
            }
            short => short.into(),
        };

        self.bytes.extend_from_slice(r.bytes(length)?);
        Ok(())
    }

    /// Remove `n` trailing bytes.
    pub fn trim_bytes(&mut self, n: usize) -> Result<(), Malformation> {
        let keep = self.bytes.len().checked_sub(n).ok_or_else(|| self.past_start())?;
        self.bytes.truncate(keep);
        Ok(())
    }

    /// Ignore `skip` trailing bytes, then remove everything after the
    /// `count`-th dot found scanning backwards.
    pub fn trim_components(&mut self, skip: usize, count: u8) -> Result<(), Malformation> {
        let mut end = self.bytes.len().checked_sub(skip).ok_or_else(|| self.past_start())?;
        let mut found = 0;

        while found < count {
            end = end.checked_sub(1).ok_or_else(|| self.past_start())?;
            if self.bytes[end] == b'.' {
                found += 1;
            }
        }

        self.bytes.truncate(end + 1);
        Ok(())
    }

    fn past_start(&self) -> Malformation {
        Malformation::TrimPastStart {
            label: self.to_text(),
        }
    }
}

/// Split a nonzero control byte into its nibbles. `None` selects the long
/// form.
fn edit_counts(control: u8) -> Option<(u8, u8)> {
    tartan_bitfield::bitfield! {
        struct LabelEdit(u8) {
            [0..4] append: u8,
            [4..8] delete: u8,
        }
    }

    (control != 0).then(|| {
        let edit = LabelEdit(control);
        (edit.delete(), edit.append())
    })
}

/// A count byte, where `0xff` defers to a following `u32`.
fn long_count(r: &mut ByteCursor) -> Result<usize, Error> {
    match r.u8()? {
        0xff => usize::try_from(r.u32()?).map_err(|_| r.malformed(Malformation::LengthOverflow)),
        short => Ok(short.into()),
    }
}
