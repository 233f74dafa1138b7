//! Edit descriptors for incremental reparsing.

use crate::error::EditError;

/// A zero-based row and byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Point {
    /// Line index, counting `\n` bytes.
    pub row: usize,
    /// Byte offset from the start of the line.
    pub column: usize,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The point of byte `offset` in `text`.
    #[must_use]
    pub fn at(text: &str, offset: usize) -> Self {
        let prefix = &text.as_bytes()[..offset.min(text.len())];
        let row = prefix.iter().filter(|&&byte| byte == b'\n').count();
        let line_start = prefix
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |index| index + 1);
        Self {
            row,
            column: prefix.len() - line_start,
        }
    }
}

/// One contiguous replacement: bytes `start_byte..old_end_byte` of the old
/// source became `start_byte..new_end_byte` of the new source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputEdit {
    /// First changed byte.
    pub start_byte: usize,
    /// End of the replaced range in the old source.
    pub old_end_byte: usize,
    /// End of the inserted range in the new source.
    pub new_end_byte: usize,
    /// Point of `start_byte`, if the caller tracks points.
    pub start_point: Option<Point>,
    /// Point of `old_end_byte` in the old source.
    pub old_end_point: Option<Point>,
    /// Point of `new_end_byte` in the new source.
    pub new_end_point: Option<Point>,
}

impl InputEdit {
    /// An edit given by byte offsets only.
    #[must_use]
    pub const fn new(start_byte: usize, old_end_byte: usize, new_end_byte: usize) -> Self {
        Self {
            start_byte,
            old_end_byte,
            new_end_byte,
            start_point: None,
            old_end_point: None,
            new_end_point: None,
        }
    }

    /// The edit that turns `old` into `new`, spanning the bytes between
    /// their common prefix and common suffix.
    #[must_use]
    pub fn diff(old: &str, new: &str) -> Self {
        let prefix = old
            .bytes()
            .zip(new.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        let mut start = prefix;
        while !(old.is_char_boundary(start) && new.is_char_boundary(start)) {
            start -= 1;
        }
        let max_suffix = old.len().min(new.len()) - start;
        let mut suffix = old
            .bytes()
            .rev()
            .zip(new.bytes().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();
        while !(old.is_char_boundary(old.len() - suffix) && new.is_char_boundary(new.len() - suffix)) {
            suffix -= 1;
        }
        let old_end = old.len() - suffix;
        let new_end = new.len() - suffix;
        Self {
            start_byte: start,
            old_end_byte: old_end,
            new_end_byte: new_end,
            start_point: Some(Point::at(old, start)),
            old_end_point: Some(Point::at(old, old_end)),
            new_end_point: Some(Point::at(new, new_end)),
        }
    }

    /// Checks the edit against the old and new source texts.
    pub fn validate(&self, old: &str, new: &str) -> Result<(), EditError> {
        if self.start_byte > self.old_end_byte || self.start_byte > self.new_end_byte {
            return Err(EditError::Unordered {
                start: self.start_byte,
                old_end: self.old_end_byte,
                new_end: self.new_end_byte,
            });
        }
        if self.old_end_byte > old.len() {
            return Err(EditError::OutOfBounds {
                old_end: self.old_end_byte,
                len: old.len(),
            });
        }
        let expected = old.len() - self.old_end_byte + self.new_end_byte;
        if expected != new.len() {
            return Err(EditError::LengthMismatch {
                expected,
                actual: new.len(),
            });
        }
        for (text, offset) in [
            (old, self.start_byte),
            (old, self.old_end_byte),
            (new, self.start_byte),
            (new, self.new_end_byte),
        ] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        check_point("start", self.start_point, old, self.start_byte)?;
        check_point("old end", self.old_end_point, old, self.old_end_byte)?;
        check_point("new end", self.new_end_point, new, self.new_end_byte)?;
        check_unchanged(old, new, self.start_byte, self.old_end_byte, self.new_end_byte)
    }

    /// Maps a byte offset of the old source into the new one, or `None` if
    /// the byte was replaced.
    #[must_use]
    pub fn map_old_offset(&self, offset: usize) -> Option<usize> {
        if offset < self.start_byte {
            Some(offset)
        } else if offset >= self.old_end_byte {
            Some(offset - self.old_end_byte + self.new_end_byte)
        } else {
            None
        }
    }

    /// Maps a byte offset of the new source back into the old one, or
    /// `None` if the byte is part of the inserted text.
    #[must_use]
    pub fn map_new_offset(&self, offset: usize) -> Option<usize> {
        if offset < self.start_byte {
            Some(offset)
        } else if offset >= self.new_end_byte {
            Some(offset - self.new_end_byte + self.old_end_byte)
        } else {
            None
        }
    }
}

/// Checks that the bytes before `start` and after the two end offsets are
/// the same in both texts.
fn check_unchanged(
    old: &str,
    new: &str,
    start: usize,
    old_end: usize,
    new_end: usize,
) -> Result<(), EditError> {
    let (old_bytes, new_bytes) = (old.as_bytes(), new.as_bytes());
    if let Some(offset) = old_bytes[..start]
        .iter()
        .zip(&new_bytes[..start])
        .position(|(a, b)| a != b)
    {
        return Err(EditError::TextMismatch { offset });
    }
    if let Some(index) = old_bytes[old_end..]
        .iter()
        .zip(&new_bytes[new_end..])
        .position(|(a, b)| a != b)
    {
        return Err(EditError::TextMismatch {
            offset: new_end + index,
        });
    }
    Ok(())
}

fn check_point(
    which: &'static str,
    point: Option<Point>,
    text: &str,
    offset: usize,
) -> Result<(), EditError> {
    match point {
        Some(point) if point != Point::at(text, offset) => Err(EditError::PointMismatch {
            which,
            row: point.row,
            column: point.column,
            offset,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_at() {
        let text = "ab\ncd\n\nx";
        assert_eq!(Point::at(text, 0), Point::new(0, 0));
        assert_eq!(Point::at(text, 2), Point::new(0, 2));
        assert_eq!(Point::at(text, 3), Point::new(1, 0));
        assert_eq!(Point::at(text, 7), Point::new(3, 0));
        assert_eq!(Point::at(text, 8), Point::new(3, 1));
    }

    #[test]
    fn test_diff() {
        let edit = InputEdit::diff("#define A 1\n", "#define AB 1\n");
        assert_eq!(
            (edit.start_byte, edit.old_end_byte, edit.new_end_byte),
            (9, 9, 10)
        );
        assert!(edit.validate("#define A 1\n", "#define AB 1\n").is_ok());

        let edit = InputEdit::diff("abc", "abc");
        assert_eq!((edit.start_byte, edit.old_end_byte, edit.new_end_byte), (3, 3, 3));
    }

    #[test]
    fn test_diff_respects_char_boundaries() {
        let old = "x \u{e9} y";
        let new = "x \u{e8} y";
        let edit = InputEdit::diff(old, new);
        assert_eq!((edit.start_byte, edit.old_end_byte, edit.new_end_byte), (2, 4, 4));
        assert!(edit.validate(old, new).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_edits() {
        let old = "abcdef";
        assert_eq!(
            InputEdit::new(4, 2, 4).validate(old, old),
            Err(EditError::Unordered {
                start: 4,
                old_end: 2,
                new_end: 4
            })
        );
        assert_eq!(
            InputEdit::new(2, 9, 9).validate(old, "abcdefghi"),
            Err(EditError::OutOfBounds { old_end: 9, len: 6 })
        );
        assert_eq!(
            InputEdit::new(2, 3, 5).validate(old, "abcdef"),
            Err(EditError::LengthMismatch {
                expected: 8,
                actual: 6
            })
        );
        assert_eq!(
            InputEdit::new(1, 2, 2).validate("\u{e9}x", "\u{e8}x"),
            Err(EditError::NotCharBoundary { offset: 1 })
        );

        assert_eq!(
            InputEdit::new(4, 5, 5).validate("abcdef", "abXdeZ"),
            Err(EditError::TextMismatch { offset: 2 })
        );
        assert_eq!(
            InputEdit::new(1, 2, 2).validate("abcdef", "aXcdeY"),
            Err(EditError::TextMismatch { offset: 5 })
        );

        let mut edit = InputEdit::new(1, 1, 2);
        edit.start_point = Some(Point::new(1, 0));
        assert_eq!(
            edit.validate("ab\n", "aXb\n"),
            Err(EditError::PointMismatch {
                which: "start",
                row: 1,
                column: 0,
                offset: 1
            })
        );
    }

    #[test]
    fn test_offset_mapping() {
        let edit = InputEdit::new(4, 6, 9);
        assert_eq!(edit.map_old_offset(3), Some(3));
        assert_eq!(edit.map_old_offset(4), None);
        assert_eq!(edit.map_old_offset(6), Some(9));
        assert_eq!(edit.map_new_offset(8), None);
        assert_eq!(edit.map_new_offset(9), Some(6));
        assert_eq!(edit.map_new_offset(12), Some(9));
    }
}
