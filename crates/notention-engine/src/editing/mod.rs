//! Document buffer and the change-event stream consumed from the editing
//! surface.
//!
//! The buffer is a single `xi_rope::Rope`; every change event compiles to a
//! `Delta`, which is the common currency for shifting annotation spans
//! (`AnnotationRegistry::transform`) and locating the dirty region for the
//! scanner. Editing is synchronous and serialized per note: all entry points
//! take `&mut self`, so a reconcile cycle can never overlap another.

mod change;
mod document;

pub use change::{ChangeEvent, EditOutcome};
pub use document::Document;
