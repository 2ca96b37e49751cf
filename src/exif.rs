use crate::error::Rejection;
use crate::meta::ImageMeta;
use crate::parser::ParseOptions;

pub use gps::{GPSInfo, LatLng};
pub use tags::{ExifTag, IfdKind};

pub(crate) use header::check_exif_header;
use header::TiffHeader;
use walker::IfdWalker;

mod decoder;
mod entry;
mod gps;
mod header;
mod tags;
mod walker;

/// Parses the Exif data of an APP1 segment buffer into `meta`.
///
/// `segment` starts with the two segment length bytes, followed by
/// `Exif\0\0` and the TIFF data. A rejected header leaves `meta` untouched;
/// a rejected directory only drops its own subtree.
#[tracing::instrument(skip_all)]
pub(crate) fn parse_exif_segment(
    segment: &[u8],
    meta: &mut ImageMeta,
    options: &ParseOptions,
) -> Result<(), Rejection> {
    let header = TiffHeader::parse_segment(segment)?;
    let mut walker = IfdWalker::new(segment, header.endian, options);
    walker.walk_ifd0(meta, header.ifd0_offset)
}
