use std::fmt::Debug;

use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator,
    number::{complete, Endianness},
    sequence, IResult,
};

use crate::error::Rejection;

/// Position of the TIFF header inside an APP1 segment buffer: two length
/// bytes, then `Exif\0\0`.
pub(crate) const TIFF_HEADER_START: usize = 8;

pub(crate) const EXIF_IDENT: &[u8] = b"Exif";

/// TIFF Header
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct TiffHeader {
    pub endian: Endianness,
    pub ifd0_offset: u32,
}

impl Debug for TiffHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let endian_str = match self.endian {
            Endianness::Big => "Big",
            Endianness::Little => "Little",
            Endianness::Native => "Native",
        };
        f.debug_struct("TiffHeader")
            .field("endian", &endian_str)
            .field("ifd0_offset", &format!("{:#x}", self.ifd0_offset))
            .finish()
    }
}

impl TiffHeader {
    /// Parses the header of an APP1 segment buffer (length bytes included)
    /// whose `Exif` identifier has already been matched.
    #[tracing::instrument(skip_all)]
    pub fn parse_segment(segment: &[u8]) -> Result<TiffHeader, Rejection> {
        let padding = segment
            .get(EXIF_IDENT.len() + 2..TIFF_HEADER_START)
            .ok_or(Rejection::Truncated)?;
        if padding != [0, 0] {
            return Err(Rejection::MissingExifPadding);
        }

        let tiff = &segment[TIFF_HEADER_START..]; // Safe-slice
        let (_, header) = TiffHeader::parse(tiff)?;

        if !Self::is_plausible_ifd0_offset(header.ifd0_offset, segment.len()) {
            return Err(Rejection::FirstIfdOutOfRange(header.ifd0_offset));
        }

        tracing::debug!(?header, "tiff header");
        Ok(header)
    }

    /// Parses `"II"`/`"MM"`, the magic `0x2a` and the IFD0 offset.
    pub fn parse(input: &[u8]) -> Result<(&[u8], TiffHeader), Rejection> {
        let (remain, endian) = match Self::parse_endian(input) {
            Ok(x) => x,
            Err(_) => {
                let marker = input.get(..2).map(|x| [x[0], x[1]]);
                return Err(marker.map_or(Rejection::Truncated, Rejection::InvalidByteOrder));
            }
        };

        let (remain, (magic, offset)) = sequence::tuple((
            complete::u16::<_, nom::error::Error<_>>(endian),
            complete::u32(endian),
        ))(remain)?;
        if magic != 0x2a {
            return Err(Rejection::InvalidMagic(magic));
        }

        Ok((
            remain,
            Self {
                endian,
                ifd0_offset: offset,
            },
        ))
    }

    /// The conventional 8 byte header gives an offset of 8; anything up to
    /// 16 bytes before the end of the segment is accepted too.
    fn is_plausible_ifd0_offset(offset: u32, segment_len: usize) -> bool {
        let offset = offset as usize;
        (8..=16).contains(&offset) || (16..=segment_len.saturating_sub(16)).contains(&offset)
    }

    fn parse_endian(input: &[u8]) -> IResult<&[u8], Endianness> {
        combinator::map(alt((tag("MM"), tag("II"))), |endian_marker: &[u8]| {
            if endian_marker == b"MM" {
                Endianness::Big
            } else {
                Endianness::Little
            }
        })(input)
    }
}

/// Checks the `Exif` identifier at bytes 2..6 of an APP1 segment buffer.
pub(crate) fn check_exif_header(segment: &[u8]) -> bool {
    segment.get(2..2 + EXIF_IDENT.len()) == Some(EXIF_IDENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn segment(tiff: &[u8], tail: usize) -> Vec<u8> {
        let mut buf = vec![0, 0];
        buf.extend_from_slice(b"Exif\0\0");
        buf.extend_from_slice(tiff);
        buf.resize(buf.len() + tail, 0);
        let len = buf.len() as u16;
        buf[..2].copy_from_slice(&len.to_be_bytes());
        buf
    }

    #[test]
    fn header() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let buf = [0x4d, 0x4d, 0x00, 0x2a, 0x00, 0x00, 0x00, 0x08, 0x00];

        let (_, header) = TiffHeader::parse(&buf).unwrap();
        assert_eq!(
            header,
            TiffHeader {
                endian: Endianness::Big,
                ifd0_offset: 8,
            }
        );
    }

    #[test]
    fn little_endian_header() {
        let seg = segment(b"II\x2a\x00\x08\x00\x00\x00", 32);
        let header = TiffHeader::parse_segment(&seg).unwrap();
        assert_eq!(header.endian, Endianness::Little);
        assert_eq!(header.ifd0_offset, 8);
    }

    #[test_case(b"MM\x00\x2a\x00\x00\x00\x08", 32, None ; "ok")]
    #[test_case(b"XX\x00\x2a\x00\x00\x00\x08", 32, Some(Rejection::InvalidByteOrder(*b"XX")) ; "bad byte order")]
    #[test_case(b"MM\x2a\x00\x00\x00\x00\x08", 32, Some(Rejection::InvalidMagic(0x2a00)) ; "magic in wrong endian")]
    #[test_case(b"MM\x00\x2a\x00\x00\x00\x04", 32, Some(Rejection::FirstIfdOutOfRange(4)) ; "offset too small")]
    #[test_case(b"MM\x00\x2a\x00\x00\x00\x20", 32, None ; "offset in segment")]
    #[test_case(b"MM\x00\x2a\x00\x00\x00\x30", 32, Some(Rejection::FirstIfdOutOfRange(0x30)) ; "offset near the end")]
    #[test_case(b"MM\x00\x2a\x00\x00", 0, Some(Rejection::Truncated) ; "truncated")]
    fn parse_segment(tiff: &[u8], tail: usize, err: Option<Rejection>) {
        let seg = segment(tiff, tail);
        let res = TiffHeader::parse_segment(&seg);
        match err {
            Some(e) => assert_eq!(res.unwrap_err(), e),
            None => {
                res.unwrap();
            }
        }
    }

    #[test]
    fn missing_padding() {
        let mut seg = segment(b"MM\x00\x2a\x00\x00\x00\x08", 32);
        seg[7] = 1;
        assert_eq!(
            TiffHeader::parse_segment(&seg).unwrap_err(),
            Rejection::MissingExifPadding
        );
    }

    #[test]
    fn exif_ident() {
        assert!(check_exif_header(b"\x00\x10Exif\0\0"));
        assert!(!check_exif_header(b"\x00\x10Exix\0\0"));
        assert!(!check_exif_header(b"\x00\x10Ex"));
    }
}
