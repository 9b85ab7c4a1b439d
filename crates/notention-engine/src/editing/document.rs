use xi_rope::Rope;
use xi_rope::delta::Builder;

use super::{ChangeEvent, EditOutcome};
use crate::error::EngineError;

/// The note body as a rope buffer with a revision counter.
///
/// The buffer is the single source of truth for the note text; annotations
/// and widgets are projections over it and never feed back into it. No
/// parsing or discovery failure ever mutates the buffer.
pub struct Document {
    buffer: Rope,
    revision: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            revision: 0,
        }
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies one change event, returning the compiled delta and the dirty
    /// range in post-edit coordinates.
    pub fn apply(&mut self, event: &ChangeEvent) -> Result<EditOutcome, EngineError> {
        if event.revision != self.revision {
            return Err(EngineError::StaleRevision {
                event: event.revision,
                document: self.revision,
            });
        }
        let range = &event.deleted_range;
        if range.start > range.end || range.end > self.buffer.len() {
            return Err(EngineError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.buffer.len(),
            });
        }

        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range.clone(), Rope::from(event.inserted_text.as_str()));
        let delta = builder.build();
        self.buffer = delta.apply(&self.buffer);
        self.revision += 1;

        Ok(EditOutcome {
            delta,
            changed: range.start..range.start + event.inserted_text.len(),
            revision: self.revision,
        })
    }

    /// The text of the whole line(s) covering `range`, plus the absolute
    /// offset where the slice starts. This is what the scanner examines:
    /// line-bounded, never the whole document.
    pub fn line_slice(&self, range: std::ops::Range<usize>) -> (String, usize) {
        let len = self.buffer.len();
        let start_line = self.buffer.line_of_offset(range.start.min(len));
        let start = self.buffer.offset_of_line(start_line);
        let end_line = self.buffer.line_of_offset(range.end.min(len));
        let last_line = self.buffer.line_of_offset(len);
        let end = if end_line >= last_line {
            len
        } else {
            self.buffer.offset_of_line(end_line + 1)
        };
        (self.buffer.slice_to_cow(start..end).to_string(), start)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
