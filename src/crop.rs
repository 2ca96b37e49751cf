use crate::meta::ImageMeta;

/// Diagonal of a 36x24 mm frame.
const FULL_FRAME_DIAGONAL: f64 = 43.266_615_305_567_87;

const MIN_CROP_FACTOR: f64 = 0.1;
const MAX_CROP_FACTOR: f64 = 100.0;

/// Cameras reporting wrong focal plane resolutions, with their real sensor
/// size in mm.
const SENSOR_SIZE_OVERRIDES: &[(&str, (f64, f64))] = &[("Canon EOS 20D", (22.5, 15.0))];

/// Millimeters per `FocalPlaneResolutionUnit`. Unknown units, which some
/// manufacturers write, are taken as inches.
fn unit_scale(unit: i32) -> f64 {
    match unit {
        3 => 10.0,
        4 => 1.0,
        5 => 0.001,
        _ => 25.4,
    }
}

/// Ratio of the 35mm film diagonal to the sensor diagonal derived from the
/// focal plane tags of `meta`, or 0 when it can't be determined.
///
/// The frame size of `meta` is used as the sensor's pixel size; when it is
/// missing, `pixel_width` and `pixel_height` are used instead.
pub fn crop_factor(meta: &ImageMeta, pixel_width: u32, pixel_height: u32) -> f64 {
    let (mut width, mut height) = if meta.width > 0 && meta.height > 0 {
        (meta.width as f64, meta.height as f64)
    } else {
        (pixel_width as f64, pixel_height as f64)
    };
    if width < height {
        std::mem::swap(&mut width, &mut height);
    }

    let scale = unit_scale(meta.focal_plane_resolution_unit);
    let ccd_size = |pixels: f64, resolution: f64| {
        if resolution > 0.0 {
            pixels / (resolution / scale)
        } else {
            0.0
        }
    };
    let ccd_width = ccd_size(width, meta.focal_plane_x_resolution);
    let ccd_height = ccd_size(height, meta.focal_plane_y_resolution);
    if !(ccd_width > 0.0 && ccd_height > 0.0) {
        return 0.0;
    }

    let (mut sensor_width, mut sensor_height) = SENSOR_SIZE_OVERRIDES
        .iter()
        .find(|(model, _)| *model == meta.model)
        .map(|(_, size)| *size)
        .unwrap_or((ccd_width, ccd_height));

    let sensor_ratio = sensor_width / sensor_height;
    let pixel_ratio = width / height;
    if (sensor_ratio > 1.0 && pixel_ratio < 1.0) || (sensor_ratio < 1.0 && pixel_ratio > 1.0) {
        std::mem::swap(&mut sensor_width, &mut sensor_height);
    }

    let factor = FULL_FRAME_DIAGONAL / sensor_width.hypot(sensor_height);
    tracing::debug!(sensor_width, sensor_height, factor, "crop factor");
    if (MIN_CROP_FACTOR..=MAX_CROP_FACTOR).contains(&factor) {
        factor
    } else {
        0.0
    }
}

/// Fills in the crop factor fields once everything else has been parsed.
pub(crate) fn apply_crop_factor(meta: &mut ImageMeta) {
    meta.crop_factor = crop_factor(meta, meta.pixel_width, meta.pixel_height);
    meta.focal_length_with_crop_factor = meta.focal_length * meta.crop_factor;
}
