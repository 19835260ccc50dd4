#![allow(dead_code)]

//! In-memory survey files.

/// Assembles a Survex `.3d` file record by record.
pub struct Image {
    out: Vec<u8>,
}

impl Image {
    /// A version 8 file with the given file flags.
    pub fn v8(title: &str, flags: u8) -> Self {
        let mut image = Self::header(8, title);
        image.out.push(flags);
        image
    }

    /// A file of an older version.
    pub fn legacy(version: u8, title: &str) -> Self {
        Self::header(version, title)
    }

    fn header(version: u8, title: &str) -> Self {
        let out = format!("Survex 3D Image File\nv{version}\n{title}\n@1345000000\n");
        Self {
            out: out.into_bytes(),
        }
    }

    pub fn tag(mut self, tag: u8) -> Self {
        self.out.push(tag);
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.out.extend_from_slice(bytes);
        self
    }

    pub fn coord(self, x: i32, y: i32, z: i32) -> Self {
        self.bytes(&x.to_le_bytes())
            .bytes(&y.to_le_bytes())
            .bytes(&z.to_le_bytes())
    }

    /// Cross-section dimensions in the short form.
    pub fn lrud(self, lrud: [i16; 4]) -> Self {
        lrud.iter().fold(self, |image, d| image.bytes(&d.to_le_bytes()))
    }

    /// Cross-section dimensions in the wide form.
    pub fn lrud_wide(self, lrud: [i32; 4]) -> Self {
        lrud.iter().fold(self, |image, d| image.bytes(&d.to_le_bytes()))
    }

    /// A version 8 label edit with short counts.
    pub fn edit(self, delete: u8, append: &str) -> Self {
        assert!(delete < 16 && append.len() < 16 && (delete, append) != (0, ""));
        self.tag(delete << 4 | append.len() as u8)
            .bytes(append.as_bytes())
    }

    /// A label run as written before version 8.
    pub fn run(self, append: &str) -> Self {
        assert!(append.len() < 0xfe);
        self.tag(append.len() as u8).bytes(append.as_bytes())
    }

    /// The end of data marker of a version 8 file.
    pub fn end(self) -> Self {
        self.tag(0x00).tag(0x00)
    }

    pub fn build(self) -> Vec<u8> {
        self.out
    }
}

/// A version 8 survey of three labelled stations joined by two legs, dated
/// 2012-08-29, with one passage of two cross-sections.
pub fn three_stations() -> Vec<u8> {
    Image::v8("Umlaut\u{e4}", 0x80)
        .tag(0x11)
        .bytes(&41148u16.to_le_bytes())
        .tag(0x0f)
        .coord(0, 120, 0)
        .tag(0x60)
        .coord(0, 0, 0)
        .tag(0x60)
        .coord(340, 0, 0)
        .tag(0x82)
        .edit(0, "1")
        .coord(0, 120, 0)
        .tag(0x80)
        .edit(1, "2")
        .coord(0, 0, 0)
        .tag(0x86)
        .edit(1, "3")
        .coord(340, 0, 0)
        .tag(0x30)
        .edit(1, "1")
        .lrud([10, 20, 30, 40])
        .tag(0x31)
        .edit(1, "2")
        .lrud([1, 2, 3, 4])
        .end()
        .build()
}
