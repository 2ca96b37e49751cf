use std::{fmt::Display, string::FromUtf8Error};

use nom::number::Endianness;
#[cfg(feature = "json_dump")]
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Represent a decoded IFD entry value.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    Text(String),
    URational(URational),
    IRational(IRational),

    U8(u8),
    U16(u16),
    U32(u32),

    I8(i8),
    I16(i16),
    I32(i32),

    F32(f32),
    F64(f64),

    Undefined(Vec<u8>),

    URationalArray(Vec<URational>),
    IRationalArray(Vec<IRational>),
}

/// Raw bytes of one entry, already resolved from the value-or-offset field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct EntryData<'a> {
    pub endian: Endianness,
    pub data: &'a [u8],
    pub data_format: DataFormat,
    pub components_num: u32,
}

#[derive(Debug, Clone, Error)]
pub(crate) enum ParseEntryError {
    #[error("data is invalid: {0}")]
    InvalidData(String),

    #[error("data format is unsupported: {0}")]
    Unsupported(String),
}

impl From<FromUtf8Error> for ParseEntryError {
    fn from(value: FromUtf8Error) -> Self {
        ParseEntryError::InvalidData(format!("invalid text: {value}"))
    }
}

use ParseEntryError as Error;

impl EntryData<'_> {
    fn try_as_rationals<T: TryFromBytes>(&self) -> Result<Vec<Rational<T>>, Error> {
        self.data
            .chunks_exact(8)
            .take(self.components_num as usize)
            .map(|chunk| decode_rational::<T>(chunk, self.endian))
            .collect()
    }

    fn single<T: TryFromBytes>(&self, name: &str) -> Result<T, Error> {
        if self.components_num == 1 {
            T::try_from_bytes(self.data, self.endian)
        } else {
            Err(Error::Unsupported(format!(
                "{name} with {} components",
                self.components_num
            )))
        }
    }
}

impl EntryValue {
    /// Decode an IFD entry value.
    ///
    /// # Structure of IFD Entry
    ///
    /// ```txt
    /// | 2   | 2           | 4              | 4                      |
    /// | tag | data format | components num | data (value or offset) |
    /// ```
    ///
    /// `entry.data` must already hold the `components_num * component_size`
    /// payload bytes, whether they were stored inline or out of line.
    pub(crate) fn parse(entry: &EntryData) -> Result<EntryValue, Error> {
        let data = entry.data;
        if data.is_empty() || entry.components_num == 0 {
            return Ok(EntryValue::variant_default(entry.data_format));
        }

        match entry.data_format {
            DataFormat::U8 => match entry.components_num {
                1 => Ok(Self::U8(data[0])),
                _ => Ok(Self::Undefined(data.to_vec())),
            },
            DataFormat::Text => Ok(EntryValue::Text(get_cstr(data)?)),
            DataFormat::U16 => entry.single("unsigned short").map(Self::U16),
            DataFormat::U32 => entry.single("unsigned long").map(Self::U32),
            DataFormat::URational => {
                let mut rationals = entry.try_as_rationals::<u32>()?;
                if rationals.len() == 1 {
                    Ok(Self::URational(rationals.remove(0)))
                } else {
                    Ok(Self::URationalArray(rationals))
                }
            }
            DataFormat::I8 => match entry.components_num {
                1 => Ok(Self::I8(data[0] as i8)),
                x => Err(Error::Unsupported(format!(
                    "signed byte with {x} components"
                ))),
            },
            DataFormat::Undefined => Ok(Self::Undefined(data.to_vec())),
            DataFormat::I16 => entry.single("signed short").map(Self::I16),
            DataFormat::I32 => entry.single("signed long").map(Self::I32),
            DataFormat::IRational => {
                let mut rationals = entry.try_as_rationals::<i32>()?;
                if rationals.len() == 1 {
                    Ok(Self::IRational(rationals.remove(0)))
                } else {
                    Ok(Self::IRationalArray(rationals))
                }
            }
            DataFormat::F32 => entry.single("float").map(Self::F32),
            DataFormat::F64 => entry.single("double").map(Self::F64),
        }
    }

    fn variant_default(data_format: DataFormat) -> EntryValue {
        match data_format {
            DataFormat::U8 => Self::U8(0),
            DataFormat::Text => Self::Text(String::default()),
            DataFormat::U16 => Self::U16(0),
            DataFormat::U32 => Self::U32(0),
            DataFormat::URational => Self::URational(URational::default()),
            DataFormat::I8 => Self::I8(0),
            DataFormat::Undefined => Self::Undefined(Vec::default()),
            DataFormat::I16 => Self::I16(0),
            DataFormat::I32 => Self::I32(0),
            DataFormat::IRational => Self::IRational(IRational::default()),
            DataFormat::F32 => Self::F32(0.0),
            DataFormat::F64 => Self::F64(0.0),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EntryValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            EntryValue::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            EntryValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            EntryValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned integer variant, widened. Tags such as `ExifImageWidth`
    /// may be stored as either SHORT or LONG.
    pub fn to_u32(&self) -> Option<u32> {
        match self {
            EntryValue::U8(v) => Some(*v as u32),
            EntryValue::U16(v) => Some(*v as u32),
            EntryValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value as a float. Rationals with a zero denominator yield
    /// `None` instead of an infinity.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            EntryValue::URational(v) => v.try_as_float(),
            EntryValue::IRational(v) => v.try_as_float(),
            EntryValue::U8(v) => Some(*v as f64),
            EntryValue::U16(v) => Some(*v as f64),
            EntryValue::U32(v) => Some(*v as f64),
            EntryValue::I8(v) => Some(*v as f64),
            EntryValue::I16(v) => Some(*v as f64),
            EntryValue::I32(v) => Some(*v as f64),
            EntryValue::F32(v) => Some(*v as f64),
            EntryValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_urational(&self) -> Option<URational> {
        if let EntryValue::URational(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_irational(&self) -> Option<IRational> {
        if let EntryValue::IRational(v) = self {
            Some(*v)
        } else {
            None
        }
    }

    pub fn as_urational_array(&self) -> Option<&[URational]> {
        if let EntryValue::URationalArray(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn as_irational_array(&self) -> Option<&[IRational]> {
        if let EntryValue::IRationalArray(v) = self {
            Some(v)
        } else {
            None
        }
    }
}

/// # Exif Data format
///
/// ```txt
/// | Value           |             1 |             2 |              3 |               4 |                 5 |            6 |
/// |-----------------+---------------+---------------+----------------+-----------------+-------------------+--------------|
/// | Format          | unsigned byte | ascii strings | unsigned short |   unsigned long | unsigned rational |  signed byte |
/// | Bytes/component |             1 |             1 |              2 |               4 |                 8 |            1 |
///
/// | Value           |             7 |             8 |              9 |              10 |                11 |           12 |
/// |-----------------+---------------+---------------+----------------+-----------------+-------------------+--------------|
/// | Format          |     undefined |  signed short |    signed long | signed rational |      single float | double float |
/// | Bytes/component |             1 |             2 |              4 |               8 |                 4 |            8 |
/// ```
#[repr(u16)]
#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
    U8 = 1,
    Text = 2,
    U16 = 3,
    U32 = 4,
    URational = 5,
    I8 = 6,
    Undefined = 7,
    I16 = 8,
    I32 = 9,
    IRational = 10,
    F32 = 11,
    F64 = 12,
}

impl DataFormat {
    pub fn component_size(&self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Text | Self::Undefined => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::URational | Self::IRational | Self::F64 => 8,
        }
    }
}

impl TryFrom<u16> for DataFormat {
    type Error = crate::Error;
    fn try_from(v: u16) -> Result<Self, Self::Error> {
        use DataFormat::*;
        let df = match v {
            1 => U8,
            2 => Text,
            3 => U16,
            4 => U32,
            5 => URational,
            6 => I8,
            7 => Undefined,
            8 => I16,
            9 => I32,
            10 => IRational,
            11 => F32,
            12 => F64,
            _ => return Err(format!("invalid data format: {v}").into()),
        };
        Ok(df)
    }
}

#[cfg(feature = "json_dump")]
impl Serialize for EntryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl Display for EntryValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryValue::Text(v) => f.write_str(v),
            EntryValue::URational(v) => Display::fmt(v, f),
            EntryValue::IRational(v) => Display::fmt(v, f),
            EntryValue::U32(v) => Display::fmt(&v, f),
            EntryValue::U16(v) => Display::fmt(&v, f),
            EntryValue::I16(v) => Display::fmt(&v, f),
            EntryValue::I32(v) => Display::fmt(&v, f),
            EntryValue::F32(v) => Display::fmt(&v, f),
            EntryValue::F64(v) => Display::fmt(&v, f),
            EntryValue::U8(v) => Display::fmt(&v, f),
            EntryValue::I8(v) => Display::fmt(&v, f),
            EntryValue::Undefined(v) => {
                write!(f, "Undefined[{}]", elided(v.iter().map(|x| format!("0x{x:02x}")), 8))
            }
            EntryValue::URationalArray(v) => {
                write!(f, "URationalArray[{}]", elided(v.iter().map(|x| x.to_string()), 3))
            }
            EntryValue::IRationalArray(v) => {
                write!(f, "IRationalArray[{}]", elided(v.iter().map(|x| x.to_string()), 3))
            }
        }
    }
}

// Joins up to `max` items and replaces the rest with an ellipsis.
fn elided(items: impl Iterator<Item = String>, max: usize) -> String {
    items
        .take(max + 1)
        .enumerate()
        .map(|(i, x)| if i >= max { "...".to_owned() } else { x })
        .collect::<Vec<String>>()
        .join(", ")
}

pub type URational = Rational<u32>;
pub type IRational = Rational<i32>;

#[cfg_attr(feature = "json_dump", derive(Serialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Rational<T>(pub T, pub T);

impl<T> Rational<T>
where
    T: Copy + Into<f64>,
{
    pub fn as_float(&self) -> f64 {
        self.0.into() / self.1.into()
    }

    pub fn try_as_float(&self) -> Option<f64> {
        let denominator: f64 = self.1.into();
        if denominator == 0.0 {
            None
        } else {
            Some(self.0.into() / denominator)
        }
    }
}

impl<T> Display for Rational<T>
where
    T: Copy + Display + Into<f64>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({:.04})", self.0, self.1, self.as_float())
    }
}

impl<T> From<(T, T)> for Rational<T>
where
    T: Copy,
{
    fn from(value: (T, T)) -> Self {
        Self(value.0, value.1)
    }
}

/// Keeps the magnitude. The sign of signed GPS values lives in the separate
/// reference tags.
impl From<IRational> for URational {
    fn from(value: IRational) -> Self {
        Self(value.0.unsigned_abs(), value.1.unsigned_abs())
    }
}

fn get_cstr(data: &[u8]) -> Result<String, FromUtf8Error> {
    String::from_utf8(data.iter().take_while(|b| **b != 0).cloned().collect())
}

pub(crate) trait TryFromBytes: Sized {
    fn try_from_bytes(bs: &[u8], endian: Endianness) -> Result<Self, Error>;
}

macro_rules! impl_try_from_bytes {
    ($($t:ty),*) => {
        $(impl TryFromBytes for $t {
            fn try_from_bytes(bs: &[u8], endian: Endianness) -> Result<Self, Error> {
                let make_err = || {
                    Error::InvalidData(format!(
                        "data is too small to convert to {}",
                        std::any::type_name::<$t>(),
                    ))
                };
                let (int_bytes, _) = bs
                    .split_at_checked(std::mem::size_of::<Self>())
                    .ok_or_else(make_err)?;
                let int_bytes: [u8; std::mem::size_of::<$t>()] =
                    int_bytes.try_into().map_err(|_| make_err())?;
                match endian {
                    Endianness::Little => Ok(Self::from_le_bytes(int_bytes)),
                    Endianness::Big => Ok(Self::from_be_bytes(int_bytes)),
                    Endianness::Native => Ok(Self::from_ne_bytes(int_bytes)),
                }
            }
        })*
    };
}

impl_try_from_bytes!(u16, i16, u32, i32, f32, f64);

pub(crate) fn decode_rational<T: TryFromBytes>(
    data: &[u8],
    endian: Endianness,
) -> Result<Rational<T>, Error> {
    if data.len() < 8 {
        return Err(Error::InvalidData(
            "data is too small to decode a rational".to_string(),
        ));
    }

    let numerator = T::try_from_bytes(data, endian)?;
    let denominator = T::try_from_bytes(&data[4..], endian)?; // Safe-slice
    Ok(Rational::<T>(numerator, denominator))
}
