//! Typed annotations derived from inline micro-syntax, and the registry
//! that owns their lifecycle across edits.

mod registry;
mod types;

pub use registry::{AnnotationRegistry, Reconciliation};
pub use types::{Annotation, AnnotationId, AnnotationKind, Operator};
