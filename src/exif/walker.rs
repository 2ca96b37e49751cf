use nom::number::Endianness;

use crate::{
    error::Rejection, meta::ImageMeta, parser::ParseOptions, slice::SliceChecked,
};

use super::{
    decoder::decode_entry,
    entry::{read_u16, read_u32, DirectoryEntry, IFD_ENTRY_SIZE},
    header::TIFF_HEADER_START,
    IfdKind,
};

/// Read-only state shared by every directory of one Exif segment.
#[derive(Debug, Clone, Copy)]
struct WalkContext<'a> {
    // The usable part of the segment buffer: `..offset_base + length`.
    data: &'a [u8],
    endian: Endianness,
    // Where the TIFF header starts, all IFD offsets are relative to it.
    offset_base: usize,
    length: usize,
}

impl WalkContext<'_> {
    /// Position in the segment of a TIFF-relative `offset`, if it lies in
    /// `[offset_base, offset_base + length)`.
    fn resolve(&self, offset: u32) -> Option<usize> {
        let pos = self.offset_base.checked_add(offset as usize)?;
        (pos >= self.offset_base && pos < self.offset_base + self.length).then_some(pos)
    }
}

/// Walks the IFD tree of one Exif segment and feeds every entry to the tag
/// decoder.
///
/// Directories are referenced by offsets inside the segment buffer, which is
/// treated as an arena: every reference is resolved and bounds-checked before
/// it is followed. Recursion is limited by depth and by a per-parse directory
/// budget, so looping or fanned-out pointers can't run away.
pub(crate) struct IfdWalker<'a> {
    ctx: WalkContext<'a>,
    options: &'a ParseOptions,
    // Directories visited so far.
    visited: usize,
}

impl<'a> IfdWalker<'a> {
    /// `segment` is an APP1 buffer with the TIFF header at
    /// [`TIFF_HEADER_START`].
    pub fn new(segment: &'a [u8], endian: Endianness, options: &'a ParseOptions) -> Self {
        let offset_base = TIFF_HEADER_START.min(segment.len());
        Self {
            ctx: WalkContext {
                data: segment,
                endian,
                offset_base,
                length: segment.len() - offset_base,
            },
            options,
            visited: 0,
        }
    }

    /// Walks IFD0 and everything reachable from it.
    pub fn walk_ifd0(&mut self, meta: &mut ImageMeta, ifd0_offset: u32) -> Result<(), Rejection> {
        let start = self
            .ctx
            .resolve(ifd0_offset)
            .ok_or(Rejection::FirstIfdOutOfRange(ifd0_offset))?;
        self.walk(meta, start, 0, IfdKind::Exif)
    }

    #[tracing::instrument(skip(self, meta))]
    fn walk(
        &mut self,
        meta: &mut ImageMeta,
        dir_start: usize,
        depth: usize,
        kind: IfdKind,
    ) -> Result<(), Rejection> {
        if depth > self.options.max_ifd_depth {
            return Err(Rejection::TooDeep(depth));
        }
        if self.visited >= self.options.max_directories {
            return Err(Rejection::TooManyDirectories);
        }
        self.visited += 1;

        let ctx = self.ctx;
        let entry_num = read_u16(ctx.data, dir_start, ctx.endian)
            .ok_or(Rejection::DirectoryOutOfBounds(dir_start))?;
        let entries_end = 2 + IFD_ENTRY_SIZE * entry_num as usize;
        if entries_end >= ctx.length {
            return Err(Rejection::DirectoryTooLong {
                start: dir_start,
                entries: entry_num,
            });
        }
        tracing::debug!(entry_num, "directory");

        for i in 0..entry_num as usize {
            let pos = dir_start + 2 + IFD_ENTRY_SIZE * i;
            let entry =
                match DirectoryEntry::parse(ctx.data, pos, ctx.offset_base, ctx.length, ctx.endian)
                {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!(pos, ?e, "skip invalid entry");
                        continue;
                    }
                };

            let child_kind = IfdKind::from_pointer_tag(entry.tag)
                .filter(|k| *k != IfdKind::MakerNote || self.options.parse_maker_note);
            match child_kind {
                Some(child_kind) => match entry.pointer_offset().and_then(|x| ctx.resolve(x)) {
                    Some(child_start) => self.walk_child(meta, child_start, depth + 1, child_kind),
                    None => tracing::debug!(
                        tag = entry.tag,
                        offset = entry.value_or_offset,
                        "sub-ifd pointer out of bounds"
                    ),
                },
                None => decode_entry(meta, kind, &entry),
            }
        }

        // The next IFD continues the same sequence, e.g. ifd0 -> ifd1.
        let next_pos = dir_start + entries_end;
        match read_u32(ctx.data, next_pos, ctx.endian) {
            Some(0) | None => (),
            Some(offset) => match ctx.resolve(offset) {
                Some(next_start) => self.walk_child(meta, next_start, depth + 1, kind),
                None => tracing::debug!(offset, "next ifd out of bounds"),
            },
        }

        if self.options.load_thumbnail {
            self.materialize_thumbnail(meta);
        }
        Ok(())
    }

    // A failed child only drops its own subtree.
    fn walk_child(&mut self, meta: &mut ImageMeta, start: usize, depth: usize, kind: IfdKind) {
        if let Err(e) = self.walk(meta, start, depth, kind) {
            tracing::debug!(start, depth, ?kind, %e, "drop directory");
        }
    }

    // Copies the thumbnail once its offset and size are known.
    fn materialize_thumbnail(&self, meta: &mut ImageMeta) {
        if meta.thumbnail.is_some() || meta.thumbnail_offset == 0 || meta.thumbnail_size == 0 {
            return;
        }
        let data = self
            .ctx
            .offset_base
            .checked_add(meta.thumbnail_offset as usize)
            .and_then(|start| self.ctx.data.slice_at(start, meta.thumbnail_size as usize));
        match data {
            Some(data) => {
                tracing::debug!(size = data.len(), "thumbnail");
                meta.thumbnail = Some(data.to_vec());
            }
            None => tracing::debug!(
                offset = meta.thumbnail_offset,
                size = meta.thumbnail_size,
                "thumbnail out of bounds"
            ),
        }
    }
}
