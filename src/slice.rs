use std::ops::Range;

/// Bounds-checked sub-slicing, so offsets read from the input can be used as
/// indices without risking a panic.
pub(crate) trait SliceChecked<T> {
    fn slice_checked(&self, range: Range<usize>) -> Option<&[T]>;

    /// `len` elements starting at `start`, `None` on overflow or when the
    /// range leaves the slice.
    fn slice_at(&self, start: usize, len: usize) -> Option<&[T]> {
        let end = start.checked_add(len)?;
        self.slice_checked(start..end)
    }
}

impl<T> SliceChecked<T> for [T] {
    fn slice_checked(&self, range: Range<usize>) -> Option<&[T]> {
        if range.start > range.end || range.end > self.len() {
            None
        } else {
            Some(&self[range]) // Safe-slice
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SliceChecked;

    #[test]
    fn slice_checked() {
        let v: Vec<u8> = vec![0, 1, 2, 3, 4, 5];

        assert_eq!(v.slice_checked(0..6).unwrap(), &v[..]);
        assert_eq!(v.slice_checked(1..2).unwrap(), &[1]);
        assert_eq!(v.slice_checked(6..6).unwrap(), &[] as &[u8]);
        assert!(v.slice_checked(5..7).is_none());
        #[allow(clippy::reversed_empty_ranges)]
        let reversed = v.slice_checked(4..3);
        assert!(reversed.is_none());

        assert_eq!(v.slice_at(2, 3).unwrap(), &[2, 3, 4]);
        assert!(v.slice_at(usize::MAX, 2).is_none());
        assert!(v.slice_at(5, 2).is_none());
    }
}
