//! Builders for synthetic JPEG/Exif test inputs.

use nom::number::Endianness;

/// The value of one IFD entry in a [`TiffBuilder`] directory.
#[derive(Clone, Debug)]
pub enum Val {
    Short(u16),
    Long(u32),
    Rational(u32, u32),
    Ascii(&'static str),
    Undefined(Vec<u8>),
    /// LONG holding the offset of directory `i`.
    Ifd(usize),
    /// LONG[2] stored out of line, the first element holding the offset of
    /// directory `i`.
    IfdArray(usize),
    /// UNDEFINED payload that is directory `i` itself, as maker notes are.
    IfdBlob(usize),
    /// LONG holding the offset of blob `i`.
    Blob(usize),
    /// LONG holding an arbitrary offset.
    Offset(u32),
}

impl Val {
    fn format(&self) -> u16 {
        match self {
            Val::Short(_) => 3,
            Val::Long(_) | Val::Ifd(_) | Val::IfdArray(_) | Val::Blob(_) | Val::Offset(_) => 4,
            Val::Rational(..) => 5,
            Val::Ascii(_) => 2,
            Val::Undefined(_) | Val::IfdBlob(_) => 7,
        }
    }

    // Bytes stored in the directory's own data area.
    fn out_of_line_size(&self) -> usize {
        match self {
            Val::Rational(..) | Val::IfdArray(_) => 8,
            Val::Ascii(s) if s.len() + 1 > 4 => s.len() + 1,
            Val::Undefined(v) if v.len() > 4 => v.len(),
            _ => 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Dir {
    entries: Vec<(u16, Val)>,
    next: Option<usize>,
}

/// Lays out a TIFF blob: the 8 byte header, the directories in order (each
/// followed by its out-of-line data), then the blobs.
#[derive(Clone, Debug)]
pub struct TiffBuilder {
    endian: Endianness,
    dirs: Vec<Dir>,
    blobs: Vec<Vec<u8>>,
}

impl TiffBuilder {
    pub fn new(endian: Endianness) -> Self {
        Self {
            endian,
            dirs: Vec::new(),
            blobs: Vec::new(),
        }
    }

    /// Adds a directory without a next IFD.
    pub fn dir(mut self, entries: Vec<(u16, Val)>) -> Self {
        self.dirs.push(Dir {
            entries,
            next: None,
        });
        self
    }

    /// Adds a directory whose next IFD is directory `next`.
    pub fn dir_with_next(mut self, entries: Vec<(u16, Val)>, next: usize) -> Self {
        self.dirs.push(Dir {
            entries,
            next: Some(next),
        });
        self
    }

    pub fn blob(mut self, data: Vec<u8>) -> Self {
        self.blobs.push(data);
        self
    }

    fn dir_size(&self, i: usize) -> usize {
        let dir = &self.dirs[i];
        2 + 12 * dir.entries.len()
            + 4
            + dir
                .entries
                .iter()
                .map(|(_, v)| v.out_of_line_size())
                .sum::<usize>()
    }

    /// Offset of directory `i`, relative to the TIFF header.
    pub fn dir_offset(&self, i: usize) -> u32 {
        (8 + (0..i).map(|k| self.dir_size(k)).sum::<usize>()) as u32
    }

    /// Offset of blob `i`, relative to the TIFF header.
    pub fn blob_offset(&self, i: usize) -> u32 {
        self.dir_offset(self.dirs.len()) + self.blobs[..i].iter().map(|b| b.len() as u32).sum::<u32>()
    }

    fn put_u16(&self, buf: &mut Vec<u8>, v: u16) {
        match self.endian {
            Endianness::Little => buf.extend_from_slice(&v.to_le_bytes()),
            _ => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    fn put_u32(&self, buf: &mut Vec<u8>, v: u32) {
        match self.endian {
            Endianness::Little => buf.extend_from_slice(&v.to_le_bytes()),
            _ => buf.extend_from_slice(&v.to_be_bytes()),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self.endian {
            Endianness::Little => buf.extend_from_slice(b"II"),
            _ => buf.extend_from_slice(b"MM"),
        }
        self.put_u16(&mut buf, 0x2a);
        self.put_u32(&mut buf, 8);

        for (i, dir) in self.dirs.iter().enumerate() {
            assert_eq!(buf.len(), self.dir_offset(i) as usize);
            let mut data_pos = buf.len() + 2 + 12 * dir.entries.len() + 4;
            let mut data = Vec::new();

            self.put_u16(&mut buf, dir.entries.len() as u16);
            for (tag, val) in dir.entries.iter() {
                self.put_u16(&mut buf, *tag);
                self.put_u16(&mut buf, val.format());
                match val {
                    Val::Short(v) => {
                        self.put_u32(&mut buf, 1);
                        self.put_u16(&mut buf, *v);
                        self.put_u16(&mut buf, 0);
                    }
                    Val::Long(v) | Val::Offset(v) => {
                        self.put_u32(&mut buf, 1);
                        self.put_u32(&mut buf, *v);
                    }
                    Val::Ifd(j) => {
                        self.put_u32(&mut buf, 1);
                        self.put_u32(&mut buf, self.dir_offset(*j));
                    }
                    Val::IfdArray(j) => {
                        self.put_u32(&mut buf, 2);
                        self.put_u32(&mut buf, data_pos as u32);
                        self.put_u32(&mut data, self.dir_offset(*j));
                        self.put_u32(&mut data, 0);
                    }
                    Val::Blob(j) => {
                        self.put_u32(&mut buf, 1);
                        self.put_u32(&mut buf, self.blob_offset(*j));
                    }
                    Val::IfdBlob(j) => {
                        self.put_u32(&mut buf, self.dir_size(*j) as u32);
                        self.put_u32(&mut buf, self.dir_offset(*j));
                    }
                    Val::Rational(n, d) => {
                        self.put_u32(&mut buf, 1);
                        self.put_u32(&mut buf, data_pos as u32);
                        self.put_u32(&mut data, *n);
                        self.put_u32(&mut data, *d);
                    }
                    Val::Ascii(s) => {
                        let mut bytes = s.as_bytes().to_vec();
                        bytes.push(0);
                        self.put_inline_or_data(&mut buf, &mut data, data_pos, &bytes);
                    }
                    Val::Undefined(v) => {
                        self.put_inline_or_data(&mut buf, &mut data, data_pos, v);
                    }
                }
                data_pos += val.out_of_line_size();
            }
            self.put_u32(
                &mut buf,
                dir.next.map(|j| self.dir_offset(j)).unwrap_or_default(),
            );
            buf.extend_from_slice(&data);
        }

        for blob in self.blobs.iter() {
            buf.extend_from_slice(blob);
        }
        buf
    }

    fn put_inline_or_data(&self, buf: &mut Vec<u8>, data: &mut Vec<u8>, data_pos: usize, v: &[u8]) {
        self.put_u32(buf, v.len() as u32);
        if v.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..v.len()].copy_from_slice(v);
            buf.extend_from_slice(&inline);
        } else {
            self.put_u32(buf, data_pos as u32);
            data.extend_from_slice(v);
        }
    }
}

/// A marker segment as it appears in the file: `FF marker len payload`.
pub fn marker_segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0xff, marker];
    buf.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// An APP1 Exif segment as it appears in the file.
pub fn app1_exif(tiff: &[u8]) -> Vec<u8> {
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);
    marker_segment(0xe1, &payload)
}

/// The APP1 segment buffer the scanner hands to the Exif parser: length
/// bytes, `Exif\0\0`, TIFF data.
pub fn exif_segment(tiff: &[u8]) -> Vec<u8> {
    app1_exif(tiff)[2..].to_vec()
}

/// A baseline SOF0 segment as it appears in the file.
pub fn sof0(width: u16, height: u16, components: u8) -> Vec<u8> {
    let mut payload = vec![8];
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.push(components);
    for i in 0..components {
        payload.extend_from_slice(&[i + 1, 0x11, 0]);
    }
    marker_segment(0xc0, &payload)
}

/// SOI, the given segments, a short scan and EOI.
pub fn jpeg_file(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = vec![0xff, 0xd8];
    for s in segments {
        buf.extend_from_slice(s);
    }
    buf.extend_from_slice(&marker_segment(0xda, &[1, 1, 0, 0, 0x3f, 0]));
    buf.extend_from_slice(&[0x12, 0x34, 0xff, 0x00, 0x56]);
    buf.extend_from_slice(&[0xff, 0xd9]);
    buf
}

/// A typical camera layout: IFD0 with Model and a pointer to the Exif
/// sub-IFD (directory 1), which holds the focal length and focal plane tags.
pub fn camera_tiff(endian: Endianness, model: &'static str) -> TiffBuilder {
    TiffBuilder::new(endian)
        .dir(vec![
            (0x010f, Val::Ascii("Canon")),
            (0x0110, Val::Ascii(model)),
            (0x8769, Val::Ifd(1)),
        ])
        .dir(vec![
            (0x920a, Val::Rational(50, 1)),
            (0xa002, Val::Long(3600)),
            (0xa003, Val::Long(2400)),
            (0xa20e, Val::Rational(100, 1)),
            (0xa20f, Val::Rational(100, 1)),
            (0xa210, Val::Short(4)),
        ])
}
