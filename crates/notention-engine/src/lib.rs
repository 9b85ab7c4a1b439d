pub mod annotations;
pub mod editing;
pub mod error;
pub mod note;
pub mod scanner;
pub mod semantics;
pub mod span;
pub mod widgets;

// Re-export key types for easier usage
pub use annotations::{
    Annotation, AnnotationId, AnnotationKind, AnnotationRegistry, Operator, Reconciliation,
};
pub use editing::{ChangeEvent, Document, EditOutcome};
pub use error::EngineError;
pub use note::{Note, NoteId, NoteRecord, PublicationStatus, PublisherId};
pub use scanner::{Candidate, CandidateState, Scan, scan};
pub use semantics::{PropertyPair, extract};
pub use span::Span;
pub use widgets::{WidgetCmd, WidgetSynchronizer};
