//! Offset-based text edits.
//!
//! The import rewriter never mutates source text while walking the AST. It
//! records `(range, replacement)` pairs into an [`EditList`] and applies them
//! in one pass afterwards, copying untouched bytes verbatim.

use std::ops::Range;

use crate::error::{CoreError, Result};

/// A single replacement of `start..end` (byte offsets) by `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl Edit {
    pub fn replace(range: Range<u32>, text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            text: text.into(),
        }
    }

    pub fn delete(range: Range<u32>) -> Self {
        Self::replace(range, String::new())
    }

    pub fn is_deletion(&self) -> bool {
        self.text.is_empty()
    }

    fn contains(&self, other: &Edit) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditList {
    edits: Vec<Edit>,
}

impl EditList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Sort by start offset and drop edits that fall inside a deletion.
    ///
    /// A suppressed import statement deletes a range that can still contain
    /// other rewritten specifiers (`if (x) import("a").then(() => import("b"))`),
    /// and those must disappear along with it. Any other overlap is an error.
    fn normalized(&self) -> Result<Vec<&Edit>> {
        let mut sorted: Vec<&Edit> = self.edits.iter().collect();
        // Wider edits first at equal start so a deletion swallows what it contains
        sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

        let mut kept: Vec<&Edit> = Vec::with_capacity(sorted.len());
        for edit in sorted {
            if let Some(last) = kept.last() {
                if last.is_deletion() && last.contains(edit) {
                    continue;
                }
                if edit.is_deletion() && edit.contains(last) {
                    kept.pop();
                } else if edit.start < last.end {
                    return Err(CoreError::OverlappingEdits {
                        first_start: last.start,
                        first_end: last.end,
                        second_start: edit.start,
                        second_end: edit.end,
                    });
                }
            }
            kept.push(edit);
        }
        Ok(kept)
    }

    /// Produce the edited text.
    pub fn apply(&self, text: &str) -> Result<String> {
        let edits = self.normalized()?;
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0usize;

        for edit in edits {
            let start = edit.start as usize;
            let end = edit.end as usize;
            if start > end
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                return Err(CoreError::EditOutOfBounds {
                    start: edit.start,
                    end: edit.end,
                    len: text.len(),
                });
            }
            out.push_str(&text[cursor..start]);
            out.push_str(&edit.text);
            cursor = end;
        }

        out.push_str(&text[cursor..]);
        Ok(out)
    }
}

impl Extend<Edit> for EditList {
    fn extend<I: IntoIterator<Item = Edit>>(&mut self, iter: I) {
        self.edits.extend(iter);
    }
}

impl FromIterator<Edit> for EditList {
    fn from_iter<I: IntoIterator<Item = Edit>>(iter: I) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}
