use std::fmt::Display;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
#[cfg(feature = "json_dump")]
use serde::Serialize;

use crate::exif::{GPSInfo, IfdKind};
use crate::values::{DataFormat, EntryValue};

/// Everything extracted from one JPEG file.
///
/// A fresh record is created for every parse, populated while the marker
/// stream and the Exif directories are walked, and finished by the crop
/// factor pass. Fields that were not found keep their zero/empty defaults.
#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageMeta {
    /// Frame size from the SOF segment.
    pub width: u16,
    pub height: u16,
    /// The frame has three components.
    pub is_color: bool,
    /// The input starts with a JPEG SOI marker. Says nothing about Exif.
    pub is_valid: bool,

    pub make: String,
    pub model: String,
    pub orientation: u16,
    pub date_time_original: Option<NaiveDateTime>,
    /// Raw `OffsetTimeOriginal` text such as `+08:00`.
    pub offset_time_original: Option<String>,
    /// Seconds.
    pub exposure_time: f64,
    pub f_number: f64,
    pub iso_speed: u32,

    /// Millimeters.
    pub focal_length: f64,
    pub focal_plane_x_resolution: f64,
    pub focal_plane_y_resolution: f64,
    /// Raw `FocalPlaneResolutionUnit`: 2 inch, 3 cm, 4 mm, 5 µm.
    pub focal_plane_resolution_unit: i32,

    /// `ExifImageWidth`/`ExifImageHeight`, used when there is no SOF.
    pub pixel_width: u32,
    pub pixel_height: u32,

    /// Relative to the TIFF header.
    pub thumbnail_offset: u32,
    pub thumbnail_size: u32,
    #[cfg_attr(feature = "json_dump", serde(skip))]
    pub thumbnail: Option<Vec<u8>>,

    pub gps: Option<GPSInfo>,

    /// Entries the tag decoder does not interpret, MakerNote entries included.
    pub extra_entries: Vec<ExtraEntry>,

    /// Ratio of the 35mm film diagonal to the sensor diagonal, 0 if unknown.
    pub crop_factor: f64,
    pub focal_length_with_crop_factor: f64,

    pub load_duration: Duration,
}

/// An IFD entry that was walked but not mapped onto an [`ImageMeta`] field.
#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraEntry {
    pub ifd: IfdKind,
    pub tag: u16,
    pub data_format: DataFormat,
    pub components_num: u32,
    /// Only kept for small payloads.
    pub value: Option<EntryValue>,
}

impl ImageMeta {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `DateTimeOriginal` combined with `OffsetTimeOriginal`, when both are
    /// present and the offset is well formed.
    pub fn date_time_original_with_offset(&self) -> Option<DateTime<FixedOffset>> {
        let t = self.date_time_original?;
        let tz = self.offset_time_original.as_deref()?;
        let s = format!("{} {tz}", t.format("%Y:%m:%d %H:%M:%S"));
        DateTime::parse_from_str(&s, "%Y:%m:%d %H:%M:%S %:z").ok()
    }

    /// Extra entries with the given tag code in the given directory kind.
    pub fn extra_entries_of(&self, ifd: IfdKind, tag: u16) -> impl Iterator<Item = &ExtraEntry> {
        self.extra_entries
            .iter()
            .filter(move |e| e.ifd == ifd && e.tag == tag)
    }
}

impl Display for ImageMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:<24} » {}", "Valid", self.is_valid)?;
        writeln!(f, "{:<24} » {}x{}", "Size", self.width, self.height)?;
        writeln!(f, "{:<24} » {}", "Color", self.is_color)?;
        if !self.make.is_empty() {
            writeln!(f, "{:<24} » {}", "Make", self.make)?;
        }
        if !self.model.is_empty() {
            writeln!(f, "{:<24} » {}", "Model", self.model)?;
        }
        if let Some(t) = self.date_time_original_with_offset() {
            writeln!(f, "{:<24} » {}", "DateTimeOriginal", t.to_rfc3339())?;
        } else if let Some(t) = self.date_time_original {
            writeln!(f, "{:<24} » {}", "DateTimeOriginal", t)?;
        }
        if self.focal_length > 0.0 {
            writeln!(f, "{:<24} » {:.1}mm", "FocalLength", self.focal_length)?;
        }
        if self.crop_factor > 0.0 {
            writeln!(f, "{:<24} » {:.2}", "CropFactor", self.crop_factor)?;
            writeln!(
                f,
                "{:<24} » {:.1}mm",
                "FocalLength35mm", self.focal_length_with_crop_factor
            )?;
        }
        if let Some(gps) = &self.gps {
            writeln!(f, "{:<24} » {}", "GPS", gps.to_iso6709())?;
        }
        if let Some(thumbnail) = &self.thumbnail {
            writeln!(f, "{:<24} » {} bytes", "Thumbnail", thumbnail.len())?;
        }
        write!(f, "{:<24} » {:?}", "LoadDuration", self.load_duration)
    }
}
