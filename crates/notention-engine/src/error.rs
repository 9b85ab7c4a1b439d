use thiserror::Error;

use crate::note::NoteId;

/// Errors surfaced by the annotation engine.
///
/// Parse failures are never errors: malformed or ambiguous inline syntax is
/// recovered locally by the scanner, which treats it as literal text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A change event referenced bytes outside the current buffer.
    #[error("edit range {start}..{end} is outside the document (len {len})")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        len: usize,
    },

    /// A change event was built against an older revision of the document.
    /// Editing is serialized per note, so this indicates a misbehaving caller.
    #[error("stale change event: event revision {event}, document revision {document}")]
    StaleRevision { event: u64, document: u64 },

    /// A publish was requested while another publish for the same note is
    /// still in flight. The note's state is unchanged; the caller may retry
    /// once the in-flight operation settles.
    #[error("publish already in flight for note {0}")]
    PublishConflict(NoteId),
}
