use nom::{
    number::{complete, Endianness},
    sequence::tuple,
};

use crate::{
    slice::SliceChecked,
    values::{DataFormat, EntryData, EntryValue, ParseEntryError},
};

pub(crate) const IFD_ENTRY_SIZE: usize = 12;

/// Reads a u16 at `pos` of `data`, `None` when out of bounds.
pub(crate) fn read_u16(data: &[u8], pos: usize, endian: Endianness) -> Option<u16> {
    let bytes = data.slice_at(pos, 2)?;
    complete::u16::<_, nom::error::Error<_>>(endian)(bytes)
        .ok()
        .map(|x| x.1)
}

/// Reads a u32 at `pos` of `data`, `None` when out of bounds.
pub(crate) fn read_u32(data: &[u8], pos: usize, endian: Endianness) -> Option<u32> {
    let bytes = data.slice_at(pos, 4)?;
    complete::u32::<_, nom::error::Error<_>>(endian)(bytes)
        .ok()
        .map(|x| x.1)
}

/// A view of one 12 byte directory entry.
///
/// ```txt
/// | 2   | 2           | 4              | 4                      |
/// | tag | data format | components num | data (value or offset) |
/// ```
///
/// The payload is `components_num * component_size` bytes. Up to four bytes
/// are stored inline in the last field, larger payloads live at
/// `offset_base + value_or_offset`.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryEntry<'a> {
    pub tag: u16,
    pub data_format: DataFormat,
    pub components_num: u32,
    pub value_or_offset: u32,
    // Start of the payload inside the segment.
    pub data_pos: usize,
    pub data: &'a [u8],
    pub endian: Endianness,
}

impl<'a> DirectoryEntry<'a> {
    /// Builds the view for the entry at `pos`. Errors describe why the entry
    /// is invalid; such entries are skipped by the walker.
    ///
    /// `segment[..offset_base + length]` is the usable part of the segment.
    pub fn parse(
        segment: &'a [u8],
        pos: usize,
        offset_base: usize,
        length: usize,
        endian: Endianness,
    ) -> Result<Self, ParseEntryError> {
        let entry_data = segment
            .slice_at(pos, IFD_ENTRY_SIZE)
            .ok_or_else(|| ParseEntryError::InvalidData("entry out of bounds".into()))?;
        let (_, (tag, data_format, components_num, value_or_offset)) = tuple((
            complete::u16::<_, nom::error::Error<_>>(endian),
            complete::u16(endian),
            complete::u32(endian),
            complete::u32(endian),
        ))(entry_data)
        .map_err(|e| ParseEntryError::InvalidData(format!("entry header: {e}")))?;

        let data_format = DataFormat::try_from(data_format)
            .map_err(|e| ParseEntryError::InvalidData(e.to_string()))?;
        let size = (components_num as usize)
            .checked_mul(data_format.component_size())
            .ok_or_else(|| ParseEntryError::InvalidData("entry size overflow".into()))?;

        let data_pos = if size <= 4 {
            pos + 8
        } else {
            offset_base
                .checked_add(value_or_offset as usize)
                .ok_or_else(|| ParseEntryError::InvalidData("entry offset overflow".into()))?
        };

        let limit = offset_base.saturating_add(length).min(segment.len());
        let data = segment[..limit] // Safe-slice
            .slice_at(data_pos, size)
            .ok_or_else(|| {
                ParseEntryError::InvalidData(format!(
                    "entry data {data_pos:#x}+{size:#x} out of bounds"
                ))
            })?;

        Ok(Self {
            tag,
            data_format,
            components_num,
            value_or_offset,
            data_pos,
            data,
            endian,
        })
    }

    /// Offset (relative to the TIFF header) of the directory this entry
    /// points to.
    ///
    /// SHORT and LONG pointers hold the offset in their first element, even
    /// when more elements push the payload out of line. A byte payload larger
    /// than four bytes, such as a MakerNote blob, is the directory itself.
    pub fn pointer_offset(&self) -> Option<u32> {
        match self.data_format {
            DataFormat::U8 | DataFormat::Undefined if self.size() > 4 => {
                Some(self.value_or_offset)
            }
            DataFormat::U8 | DataFormat::Undefined => self.data.first().map(|x| *x as u32),
            DataFormat::U16 => read_u16(self.data, 0, self.endian).map(|x| x as u32),
            DataFormat::U32 => read_u32(self.data, 0, self.endian),
            _ => None,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn value(&self) -> Result<EntryValue, ParseEntryError> {
        EntryValue::parse(&EntryData {
            endian: self.endian,
            data: self.data,
            data_format: self.data_format,
            components_num: self.components_num,
        })
    }
}
