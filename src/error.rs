use std::io;
use thiserror::Error;

type FallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers. Malformed JPEG/Exif data never produces one of
/// these; it only yields a less populated [`ImageMeta`](crate::ImageMeta).
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error; {0}")]
    Io(#[from] io::Error),

    #[error("parse failed; {0}")]
    ParseFailed(FallbackError),
}

impl From<String> for Error {
    fn from(src: String) -> Error {
        Error::ParseFailed(src.into())
    }
}

impl From<&str> for Error {
    fn from(src: &str) -> Error {
        src.to_string().into()
    }
}

/// Why a parsing stage gave up on its input.
///
/// Rejections stay inside the crate: the stage that produced one is dropped,
/// whatever has been decoded so far is kept, and the reason is logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Rejection {
    #[error("SOI marker not found")]
    NotJpeg,

    #[error("stream truncated")]
    Truncated,

    #[error("invalid segment length {0}")]
    InvalidSegmentLength(u16),

    #[error("exif identifier is not followed by two zero bytes")]
    MissingExifPadding,

    #[error("invalid byte order marker {0:02x?}")]
    InvalidByteOrder([u8; 2]),

    #[error("invalid tiff magic {0:#06x}")]
    InvalidMagic(u16),

    #[error("first ifd offset {0:#x} out of range")]
    FirstIfdOutOfRange(u32),

    #[error("ifd depth {0} is too deep")]
    TooDeep(usize),

    #[error("directory budget exhausted")]
    TooManyDirectories,

    #[error("directory at {0:#x} is out of bounds")]
    DirectoryOutOfBounds(usize),

    #[error("directory at {start:#x} with {entries} entries is too long")]
    DirectoryTooLong { start: usize, entries: u16 },
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Rejection {
    fn from(e: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        tracing::debug!(?e, "nom error");
        Rejection::Truncated
    }
}
