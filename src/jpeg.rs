use std::{
    io::{self, BufReader, Read},
    time::Instant,
};

use nom::{number, sequence::tuple};

use crate::{
    crop::apply_crop_factor,
    error::Rejection,
    exif::{check_exif_header, parse_exif_segment},
    meta::ImageMeta,
    parser::ParseOptions,
};

const MARKER_PREFIX: u8 = 0xFF;

/// Scans the marker stream of a JPEG file and collects its metadata.
///
/// Only the segments before the first SOS are looked at. Malformed or
/// truncated input never fails the parse: scanning just stops and whatever
/// was collected so far is returned. [`ImageMeta::is_valid`] tells whether
/// the input started with a SOI marker at all.
#[tracing::instrument(skip_all)]
pub(crate) fn parse_jpeg<R: Read>(reader: R, options: &ParseOptions) -> ImageMeta {
    let started = Instant::now();
    let mut meta = ImageMeta::new();
    let mut reader = BufReader::new(reader);

    match check_soi(&mut reader) {
        Ok(()) => {
            meta.is_valid = true;
            if let Err(e) = scan_segments(&mut reader, &mut meta, options) {
                tracing::debug!(?e, "stop scanning");
            }
            apply_crop_factor(&mut meta);
        }
        Err(e) => tracing::debug!(%e, "not a JPEG"),
    }

    meta.load_duration = started.elapsed();
    meta
}

fn check_soi<R: Read>(reader: &mut R) -> Result<(), Rejection> {
    let mut soi = [0u8; 2];
    reader
        .read_exact(&mut soi)
        .map_err(|_| Rejection::Truncated)?;
    if soi != [MARKER_PREFIX, MarkerCode::Soi.code()] {
        return Err(Rejection::NotJpeg);
    }
    Ok(())
}

fn scan_segments<R: Read>(
    reader: &mut R,
    meta: &mut ImageMeta,
    options: &ParseOptions,
) -> io::Result<()> {
    loop {
        let code = next_marker(reader)?;
        tracing::debug!("Got segment: 0x{:02x}", code);

        // Stop at SOS/EOI, the header segments all come before.
        if code == MarkerCode::Sos.code() || code == MarkerCode::Eoi.code() {
            return Ok(());
        }

        let segment = match read_segment(reader)? {
            Ok(segment) => segment,
            Err(e) => {
                tracing::debug!(?e, "invalid segment");
                return Ok(());
            }
        };

        handle_segment(code, &segment, meta, options);
    }
}

/// Skips to the next `0xFF`, then over any fill bytes, and returns the code
/// of the next marker that starts a segment.
fn next_marker<R: Read>(reader: &mut R) -> io::Result<u8> {
    loop {
        while read_u8(reader)? != MARKER_PREFIX {}
        let mut code = read_u8(reader)?;
        while code == MARKER_PREFIX {
            code = read_u8(reader)?;
        }
        // Stuffed zero bytes and stand-alone markers (TEM, RSTn, SOI) carry
        // no segment, so they are skipped here instead of having a length read.
        if !matches!(code, 0x00 | 0x01 | 0xD0..=0xD8) {
            return Ok(code);
        }
    }
}

/// Reads one length-prefixed segment. The returned buffer keeps the two
/// length bytes in front of the payload.
fn read_segment<R: Read>(reader: &mut R) -> io::Result<Result<Vec<u8>, Rejection>> {
    let mut size = [0u8; 2];
    reader.read_exact(&mut size)?;
    // size contains the two bytes of `size` itself
    let len = u16::from_be_bytes(size);
    if len < 2 {
        return Ok(Err(Rejection::InvalidSegmentLength(len)));
    }

    let mut segment = vec![0u8; len as usize];
    segment[..2].copy_from_slice(&size); // Safe-slice
    reader.read_exact(&mut segment[2..])?; // Safe-slice
    Ok(Ok(segment))
}

fn handle_segment(
    code: u8,
    segment: &[u8],
    meta: &mut ImageMeta,
    options: &ParseOptions,
) {
    if code == MarkerCode::APP1.code() && check_exif_header(segment) {
        if let Err(e) = parse_exif_segment(segment, meta, options) {
            tracing::debug!(%e, "exif segment rejected");
        }
    } else if code == MarkerCode::APP13.code() {
        // IPTC
    } else if is_sof(code) {
        parse_sof(segment, meta);
    }
}

/// SOF0..SOF15, except DHT (0xC4), JPG (0xC8) and DAC (0xCC).
fn is_sof(code: u8) -> bool {
    (0xC0..=0xCF).contains(&code) && !matches!(code, 0xC4 | 0xC8 | 0xCC)
}

/// Frame header: precision, height, width and the number of components.
fn parse_sof(segment: &[u8], meta: &mut ImageMeta) {
    let res = tuple((
        number::complete::u8::<_, nom::error::Error<_>>,
        number::complete::be_u16,
        number::complete::be_u16,
        number::complete::u8,
    ))(segment.get(2..).unwrap_or_default());

    match res {
        Ok((_, (_, height, width, components))) => {
            tracing::debug!(width, height, components, "frame");
            meta.width = width;
            meta.height = height;
            meta.is_color = components == 3;
        }
        Err(e) => tracing::debug!(?e, "SOF segment too short"),
    }
}

fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut b = [0u8; 1];
    reader.read_exact(&mut b)?;
    Ok(b[0])
}

/// A marker code is a byte following 0xFF that indicates the kind of marker.
enum MarkerCode {
    // Start of Image
    Soi = 0xD8,

    // APP1 marker, Exif or XMP
    APP1 = 0xE1,

    // APP13 marker, IPTC
    APP13 = 0xED,

    // Start of Scan
    Sos = 0xDA,

    // End of Image
    Eoi = 0xD9,
}

impl MarkerCode {
    fn code(self) -> u8 {
        self as u8
    }
}
