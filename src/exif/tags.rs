//! Exif tags this crate knows by name, see
//! https://exiftool.org/TagNames/EXIF.html

use std::fmt::Display;

#[cfg(feature = "json_dump")]
use serde::Serialize;

macro_rules! exif_tags {
    ($($name:ident = $code:literal,)*) => {
        /// Recognized Exif tags. Entries with other tag codes are still
        /// walked, they just end up in
        /// [`ImageMeta::extra_entries`](crate::ImageMeta::extra_entries).
        #[cfg_attr(feature = "json_dump", derive(Serialize))]
        #[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
        pub enum ExifTag {
            $($name = $code,)*
        }

        impl From<ExifTag> for &str {
            fn from(value: ExifTag) -> Self {
                match value {
                    $(ExifTag::$name => stringify!($name),)*
                }
            }
        }

        impl ExifTag {
            /// `None` for tag codes not listed here.
            pub fn from_code(code: u16) -> Option<ExifTag> {
                match code {
                    $($code => Some(ExifTag::$name),)*
                    _ => None,
                }
            }
        }

        impl TryFrom<u16> for ExifTag {
            type Error = crate::Error;
            fn try_from(v: u16) -> Result<Self, Self::Error> {
                ExifTag::from_code(v)
                    .ok_or_else(|| format!("unrecognized exif tag: 0x{v:04x}").into())
            }
        }
    };
}

exif_tags! {
    // ifd0/ifd1
    ImageWidth = 0x0100,
    ImageHeight = 0x0101,
    Make = 0x010f,
    Model = 0x0110,
    Orientation = 0x0112,
    XResolution = 0x011a,
    YResolution = 0x011b,
    ResolutionUnit = 0x0128,
    Software = 0x0131,
    ModifyDate = 0x0132,
    ThumbnailOffset = 0x0201,
    ThumbnailLength = 0x0202,

    // sub ifd pointers
    ExifOffset = 0x8769,
    GPSInfo = 0x8825,
    InteropOffset = 0xa005,

    // exif sub ifd
    ExposureTime = 0x829a,
    FNumber = 0x829d,
    ISOSpeedRatings = 0x8827,
    DateTimeOriginal = 0x9003,
    CreateDate = 0x9004,
    OffsetTimeOriginal = 0x9011,
    FocalLength = 0x920a,
    MakerNote = 0x927c,
    ExifImageWidth = 0xa002,
    ExifImageHeight = 0xa003,
    FocalPlaneXResolution = 0xa20e,
    FocalPlaneYResolution = 0xa20f,
    FocalPlaneResolutionUnit = 0xa210,
    FocalLengthIn35mmFilm = 0xa405,
    LensModel = 0xa434,

    // gps ifd
    GPSVersionID = 0x0000,
    GPSLatitudeRef = 0x0001,
    GPSLatitude = 0x0002,
    GPSLongitudeRef = 0x0003,
    GPSLongitude = 0x0004,
    GPSAltitudeRef = 0x0005,
    GPSAltitude = 0x0006,
}

impl ExifTag {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl Display for ExifTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &str = (*self).into();
        s.fmt(f)
    }
}

/// The role of a directory in the Exif tree. It decides how the tag decoder
/// reads the directory's entries; the walk itself is the same for all kinds.
#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum IfdKind {
    /// IFD0, IFD1 and the Exif sub-IFD.
    Exif,
    Gps,
    MakerNote,
}

impl IfdKind {
    /// The directory kind a pointer tag leads to, `None` for ordinary tags.
    pub(crate) fn from_pointer_tag(tag: u16) -> Option<IfdKind> {
        match tag {
            x if x == ExifTag::ExifOffset.code() => Some(IfdKind::Exif),
            x if x == ExifTag::GPSInfo.code() => Some(IfdKind::Gps),
            x if x == ExifTag::MakerNote.code() => Some(IfdKind::MakerNote),
            _ => None,
        }
    }
}

impl Display for IfdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IfdKind::Exif => "Exif",
            IfdKind::Gps => "GPS",
            IfdKind::MakerNote => "MakerNote",
        }
        .fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x0110, Some(ExifTag::Model))]
    #[test_case(0xa210, Some(ExifTag::FocalPlaneResolutionUnit))]
    #[test_case(0x0002, Some(ExifTag::GPSLatitude))]
    #[test_case(0xbeef, None)]
    fn tag_from_code(code: u16, expect: Option<ExifTag>) {
        assert_eq!(ExifTag::from_code(code), expect);
        let tag: crate::Result<ExifTag> = code.try_into();
        assert_eq!(tag.ok(), expect);
    }

    #[test]
    fn tag_name() {
        assert_eq!(ExifTag::FocalPlaneXResolution.to_string(), "FocalPlaneXResolution");
        assert_eq!(ExifTag::MakerNote.code(), 0x927c);
    }

    #[test_case(0x8769, Some(IfdKind::Exif))]
    #[test_case(0x8825, Some(IfdKind::Gps))]
    #[test_case(0x927c, Some(IfdKind::MakerNote))]
    #[test_case(0xa005, None)]
    fn pointer_tags(code: u16, expect: Option<IfdKind>) {
        assert_eq!(IfdKind::from_pointer_tag(code), expect);
    }
}
