use std::{fs::File, io::Read, path::Path};

use crate::{jpeg::parse_jpeg, meta::ImageMeta};

/// Depth of nested/chained IFDs that is still followed. Exif structures never
/// nest deeper.
const MAX_IFD_DEPTH: usize = 4;

/// Upper bound of directories visited in one Exif segment.
const MAX_DIRECTORIES: usize = 128;

/// Knobs of a [`MetaParser`].
///
/// ```rust
/// use nom_jpeg_meta::ParseOptions;
///
/// let options = ParseOptions::default()
///     .load_thumbnail(false)
///     .parse_maker_note(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub(crate) max_ifd_depth: usize,
    pub(crate) max_directories: usize,
    pub(crate) parse_maker_note: bool,
    pub(crate) load_thumbnail: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_ifd_depth: MAX_IFD_DEPTH,
            max_directories: MAX_DIRECTORIES,
            parse_maker_note: true,
            load_thumbnail: true,
        }
    }
}

impl ParseOptions {
    /// Deeper directories are dropped. IFD0 is at depth 0.
    pub fn max_ifd_depth(mut self, depth: usize) -> Self {
        self.max_ifd_depth = depth;
        self
    }

    pub fn max_directories(mut self, n: usize) -> Self {
        self.max_directories = n;
        self
    }

    /// When disabled, the MakerNote entry is kept as an opaque
    /// [`ExtraEntry`](crate::ExtraEntry) instead of being walked as a
    /// directory.
    pub fn parse_maker_note(mut self, yes: bool) -> Self {
        self.parse_maker_note = yes;
        self
    }

    /// Whether to copy the Exif thumbnail into [`ImageMeta::thumbnail`].
    pub fn load_thumbnail(mut self, yes: bool) -> Self {
        self.load_thumbnail = yes;
        self
    }
}

/// A `MetaParser` extracts an [`ImageMeta`] from JPEG data.
///
/// Parsing never fails because of malformed data: broken segments or
/// directories are skipped and the result is just less populated. Only
/// opening a file can fail.
///
/// ## Example
///
/// ```rust
/// use nom_jpeg_meta::*;
///
/// let parser = MetaParser::with_options(ParseOptions::default().load_thumbnail(false));
///
/// let meta = parser.parse(&b"\xff\xd8\xff\xd9"[..]);
/// assert!(meta.is_valid);
///
/// let meta = parser.parse(&b"GIF89a"[..]);
/// assert!(!meta.is_valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetaParser {
    options: ParseOptions,
}

impl MetaParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses the JPEG stream in `reader`.
    ///
    /// The parser comes with its own buffer, so the `reader` doesn't need to
    /// be wrapped with `BufRead`.
    pub fn parse<R: Read>(&self, reader: R) -> ImageMeta {
        parse_jpeg(reader, &self.options)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> crate::Result<ImageMeta> {
        let f = File::open(path)?;
        Ok(self.parse(f))
    }
}

/// Parses the JPEG stream in `reader` with the default [`ParseOptions`].
///
/// ```rust
/// use nom_jpeg_meta::parse_jpeg_meta;
///
/// let meta = parse_jpeg_meta(std::io::empty());
/// assert!(!meta.is_valid);
/// ```
pub fn parse_jpeg_meta<R: Read>(reader: R) -> ImageMeta {
    MetaParser::new().parse(reader)
}

/// Parses the JPEG file at `path` with the default [`ParseOptions`].
pub fn parse_jpeg_meta_file<P: AsRef<Path>>(path: P) -> crate::Result<ImageMeta> {
    MetaParser::new().parse_file(path)
}
