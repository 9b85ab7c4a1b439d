use xi_rope::RopeInfo;
use xi_rope::delta::Delta;

/// One edit from the editing surface: `deleted_range` is replaced by
/// `inserted_text`. Pure insertions carry an empty range, pure deletions an
/// empty string. `revision` is the document revision the event was built
/// against; a mismatch is rejected as stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub inserted_text: String,
    pub deleted_range: std::ops::Range<usize>,
    pub cursor: usize,
    pub revision: u64,
}

impl ChangeEvent {
    pub fn insert(at: usize, text: impl Into<String>, revision: u64) -> Self {
        let inserted_text = text.into();
        Self {
            cursor: at + inserted_text.len(),
            inserted_text,
            deleted_range: at..at,
            revision,
        }
    }

    pub fn delete(range: std::ops::Range<usize>, revision: u64) -> Self {
        Self {
            inserted_text: String::new(),
            cursor: range.start,
            deleted_range: range,
            revision,
        }
    }
}

/// Result of applying a change event to the document.
#[derive(Debug)]
pub struct EditOutcome {
    /// The compiled edit, used to shift annotation spans.
    pub delta: Delta<RopeInfo>,
    /// Bytes touched by the edit, in post-edit coordinates.
    pub changed: std::ops::Range<usize>,
    /// Document revision after the edit.
    pub revision: u64,
}
