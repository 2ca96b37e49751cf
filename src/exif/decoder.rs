use chrono::NaiveDateTime;

use crate::{
    meta::{ExtraEntry, ImageMeta},
    values::{EntryValue, URational},
};

use super::{entry::DirectoryEntry, gps::LatLng, ExifTag, IfdKind};

/// Upper bound of [`ImageMeta::extra_entries`] per parse.
pub(crate) const MAX_EXTRA_ENTRIES: usize = 1024;

/// Extra entries keep their decoded value only up to this payload size.
const MAX_EXTRA_VALUE_SIZE: usize = 64;

/// Writes a directory entry into the record, according to the kind of the
/// directory it was found in.
pub(crate) fn decode_entry(meta: &mut ImageMeta, kind: IfdKind, entry: &DirectoryEntry) {
    let tag = ExifTag::from_code(entry.tag);
    let handled = match (kind, tag) {
        (IfdKind::Exif, Some(tag)) => decode_exif_tag(meta, tag, entry),
        (IfdKind::Gps, Some(tag)) => decode_gps_tag(meta, tag, entry),
        // Maker notes reuse tag codes with vendor specific meanings.
        (IfdKind::MakerNote, _) | (_, None) => false,
    };

    if !handled {
        push_extra_entry(meta, kind, entry);
    }
}

// Returns false for tags that are not mapped onto a record field.
fn decode_exif_tag(meta: &mut ImageMeta, tag: ExifTag, entry: &DirectoryEntry) -> bool {
    use ExifTag::*;

    let interesting = matches!(
        tag,
        Make | Model
            | Orientation
            | DateTimeOriginal
            | OffsetTimeOriginal
            | ExposureTime
            | FNumber
            | ISOSpeedRatings
            | FocalLength
            | FocalPlaneXResolution
            | FocalPlaneYResolution
            | FocalPlaneResolutionUnit
            | ExifImageWidth
            | ExifImageHeight
            | ThumbnailOffset
            | ThumbnailLength
    );
    if !interesting {
        return false;
    }

    let Some(value) = entry_value(tag, entry) else {
        return true;
    };

    match tag {
        Make => set_text(&mut meta.make, &value),
        Model => set_text(&mut meta.model, &value),
        Orientation => set_u32(&value, |v| meta.orientation = v as u16),
        DateTimeOriginal => {
            let Some(s) = value.as_str() else { return true };
            match NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S") {
                Ok(t) => meta.date_time_original = Some(t),
                Err(e) => tracing::warn!(?e, s, "invalid DateTimeOriginal"),
            }
        }
        OffsetTimeOriginal => {
            if let Some(s) = value.as_str() {
                meta.offset_time_original = Some(s.trim().to_owned());
            }
        }
        ExposureTime => set_f64(&value, |v| meta.exposure_time = v),
        FNumber => set_f64(&value, |v| meta.f_number = v),
        ISOSpeedRatings => set_u32(&value, |v| meta.iso_speed = v),
        FocalLength => set_f64(&value, |v| meta.focal_length = v),
        FocalPlaneXResolution => set_f64(&value, |v| meta.focal_plane_x_resolution = v),
        FocalPlaneYResolution => set_f64(&value, |v| meta.focal_plane_y_resolution = v),
        FocalPlaneResolutionUnit => {
            set_u32(&value, |v| meta.focal_plane_resolution_unit = v as i32)
        }
        ExifImageWidth => set_u32(&value, |v| meta.pixel_width = v),
        ExifImageHeight => set_u32(&value, |v| meta.pixel_height = v),
        ThumbnailOffset => set_u32(&value, |v| meta.thumbnail_offset = v),
        ThumbnailLength => set_u32(&value, |v| meta.thumbnail_size = v),
        _ => (),
    }
    true
}

fn decode_gps_tag(meta: &mut ImageMeta, tag: ExifTag, entry: &DirectoryEntry) -> bool {
    use ExifTag::*;

    if !matches!(
        tag,
        GPSLatitudeRef | GPSLatitude | GPSLongitudeRef | GPSLongitude | GPSAltitudeRef | GPSAltitude
    ) {
        return false;
    }
    let Some(value) = entry_value(tag, entry) else {
        return true;
    };

    let gps = meta.gps.get_or_insert_with(Default::default);
    match tag {
        GPSLatitudeRef => {
            if let Some(c) = first_char(&value) {
                gps.latitude_ref = c;
            }
        }
        GPSLongitudeRef => {
            if let Some(c) = first_char(&value) {
                gps.longitude_ref = c;
            }
        }
        GPSAltitudeRef => {
            if let Some(c) = value.as_u8() {
                gps.altitude_ref = c;
            }
        }
        GPSLatitude => {
            if let Some(v) = lat_lng(&value) {
                gps.latitude = v;
            }
        }
        GPSLongitude => {
            if let Some(v) = lat_lng(&value) {
                gps.longitude = v;
            }
        }
        GPSAltitude => {
            if let Some(v) = value.as_urational() {
                gps.altitude = v;
            } else if let Some(v) = value.as_irational() {
                gps.altitude = v.into();
            }
        }
        _ => (),
    }
    true
}

fn entry_value(tag: ExifTag, entry: &DirectoryEntry) -> Option<EntryValue> {
    match entry.value() {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(%tag, pos = entry.data_pos, ?e, "decode entry value failed");
            None
        }
    }
}

fn push_extra_entry(meta: &mut ImageMeta, kind: IfdKind, entry: &DirectoryEntry) {
    if meta.extra_entries.len() >= MAX_EXTRA_ENTRIES {
        return;
    }
    let value = if entry.size() <= MAX_EXTRA_VALUE_SIZE {
        entry.value().ok()
    } else {
        None
    };
    meta.extra_entries.push(ExtraEntry {
        ifd: kind,
        tag: entry.tag,
        data_format: entry.data_format,
        components_num: entry.components_num,
        value,
    });
}

fn set_text(field: &mut String, value: &EntryValue) {
    if let Some(s) = value.as_str() {
        *field = s.trim_end().to_owned();
    }
}

fn set_u32(value: &EntryValue, set: impl FnOnce(u32)) {
    match value.to_u32() {
        Some(v) => set(v),
        None => tracing::warn!(%value, "expect an unsigned integer"),
    }
}

fn set_f64(value: &EntryValue, set: impl FnOnce(f64)) {
    match value.to_f64() {
        Some(v) if v.is_finite() => set(v),
        _ => tracing::warn!(%value, "expect a finite number"),
    }
}

fn first_char(value: &EntryValue) -> Option<char> {
    value.as_str().and_then(|s| s.chars().next())
}

fn lat_lng(value: &EntryValue) -> Option<LatLng> {
    if let Some(v) = value.as_urational_array() {
        v.try_into().ok()
    } else if let Some(v) = value.as_irational_array() {
        let v: Vec<URational> = v.iter().map(|x| (*x).into()).collect();
        v.as_slice().try_into().ok()
    } else {
        None
    }
}
