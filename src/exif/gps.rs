#[cfg(feature = "json_dump")]
use serde::Serialize;

use crate::values::URational;

/// GPS position decoded from the GPS IFD.
#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GPSInfo {
    // N, S
    pub latitude_ref: char,
    // degree, minute, second,
    pub latitude: LatLng,

    // E, W
    pub longitude_ref: char,
    // degree, minute, second,
    pub longitude: LatLng,

    // 0: above sea level, 1: below
    pub altitude_ref: u8,
    pub altitude: URational,
}

impl Default for GPSInfo {
    fn default() -> Self {
        Self {
            latitude_ref: 'N',
            latitude: LatLng::default(),
            longitude_ref: 'E',
            longitude: LatLng::default(),
            altitude_ref: 0,
            altitude: URational::default(),
        }
    }
}

#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct LatLng(pub URational, pub URational, pub URational);

impl LatLng {
    /// Decimal degrees. Components with a zero denominator count as 0.
    pub fn to_degrees(&self) -> f64 {
        let f = |r: URational| r.try_as_float().unwrap_or_default();
        f(self.0) + f(self.1) / 60.0 + f(self.2) / 3600.0
    }
}

impl GPSInfo {
    /// Signed decimal latitude, negative in the southern hemisphere.
    pub fn latitude_degrees(&self) -> f64 {
        let v = self.latitude.to_degrees();
        if self.latitude_ref == 'S' {
            -v
        } else {
            v
        }
    }

    /// Signed decimal longitude, negative west of Greenwich.
    pub fn longitude_degrees(&self) -> f64 {
        let v = self.longitude.to_degrees();
        if self.longitude_ref == 'W' {
            -v
        } else {
            v
        }
    }

    /// Returns an ISO 6709 geographic point location string such as
    /// `+48.8577+002.295/`.
    ///
    /// ⚠️ Altitude information is ignored currently.
    pub fn to_iso6709(&self) -> String {
        let latitude = self.latitude.to_degrees();
        let longitude = self.longitude.to_degrees();
        format!(
            "{}{latitude:08.5}{}{longitude:09.5}/",
            if self.latitude_ref == 'S' { '-' } else { '+' },
            if self.longitude_ref == 'W' { '-' } else { '+' },
        )
    }
}

impl From<[(u32, u32); 3]> for LatLng {
    fn from(value: [(u32, u32); 3]) -> Self {
        let res: [URational; 3] = value.map(|x| x.into());
        Self(res[0], res[1], res[2])
    }
}

impl TryFrom<&[URational]> for LatLng {
    type Error = crate::Error;

    fn try_from(value: &[URational]) -> Result<Self, Self::Error> {
        match value {
            [d, m, s, ..] => Ok(Self(*d, *m, *s)),
            _ => Err("convert to LatLng failed; need at least 3 rationals".into()),
        }
    }
}
