//! nom-jpeg-meta extracts camera metadata from JPEG files, written in pure
//! Rust with [nom](https://github.com/rust-bakery/nom).
//!
//! It scans the JPEG marker stream, walks the Exif IFD tree found in the APP1
//! segment, and derives the 35mm crop factor of the camera from the focal
//! plane resolution tags.
//!
//! ## Key Features
//!
//! - Robustness: JPEG/Exif data comes from untrusted sources, so every offset
//!   is bounds-checked before it is followed, and IFD recursion is limited by
//!   depth and by a directory budget. Malformed data never panics and never
//!   fails the parse, it only yields a less populated [`ImageMeta`].
//!
//! - Both byte orders (`II`/`MM`) of Exif data are supported.
//!
//! - Thread-safe: a parse owns all of its state, so independent inputs can be
//!   parsed in parallel.
//!
//! ## What is extracted
//!
//! - Frame size and color from the SOF segment
//! - Make, model, orientation, exposure, ISO, dates
//! - Focal length and focal plane resolution, hence the crop factor
//! - GPS info
//! - The embedded thumbnail
//! - MakerNote and unknown entries, as [`ExtraEntry`]s
//!
//! ## Usage
//!
//! ```rust
//! use nom_jpeg_meta::*;
//!
//! fn main() -> Result<()> {
//!     // SOI, a baseline SOF0 frame header, EOI.
//!     let data = [
//!         0xff, 0xd8,
//!         0xff, 0xc0, 0x00, 0x11, 0x08, 0x01, 0xe0, 0x02, 0x80, 0x03,
//!         0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01,
//!         0xff, 0xd9,
//!     ];
//!
//!     let meta = parse_jpeg_meta(&data[..]);
//!     assert!(meta.is_valid);
//!     assert_eq!((meta.width, meta.height), (640, 480));
//!     assert!(meta.is_color);
//!
//!     // No focal plane tags, so the crop factor is unknown.
//!     assert_eq!(meta.crop_factor, 0.0);
//!     Ok(())
//! }
//! ```
//!
//! Use [`MetaParser`] with [`ParseOptions`] to tune the parsing, e.g. to skip
//! thumbnails or MakerNotes:
//!
//! ```rust
//! use nom_jpeg_meta::*;
//!
//! let parser = MetaParser::with_options(ParseOptions::default().load_thumbnail(false));
//! let meta = parser.parse(std::io::empty());
//! assert!(!meta.is_valid);
//! ```
//!
//! [`crop_factor`] can also be computed for an [`ImageMeta`] on its own.

pub use crop::crop_factor;
pub use exif::{ExifTag, GPSInfo, IfdKind, LatLng};
pub use meta::{ExtraEntry, ImageMeta};
pub use parser::{parse_jpeg_meta, parse_jpeg_meta_file, MetaParser, ParseOptions};
pub use values::{DataFormat, EntryValue, IRational, Rational, URational};

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

mod crop;
mod error;
mod exif;
mod jpeg;
mod meta;
mod parser;
mod slice;
mod values;

#[cfg(test)]
mod testkit;
