//! Property extraction: the semantic view over a note's annotations.

use serde::{Deserialize, Serialize};

use crate::annotations::{AnnotationKind, AnnotationRegistry};

/// A flat key/value pair derived from a property annotation. The operator
/// form (`:` vs `:is:`) affects display only, so it is dropped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyPair {
    pub key: String,
    pub value: String,
}

impl PropertyPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Derives the note's property set from its current annotations.
///
/// Deterministic: ordered by annotation creation, independent of how or
/// whether widgets were rendered. Duplicate keys are retained; keys are
/// multi-valued.
pub fn extract(registry: &AnnotationRegistry) -> Vec<PropertyPair> {
    registry
        .annotations()
        .iter()
        .filter_map(|a| match &a.kind {
            AnnotationKind::Property { key, value, .. } => {
                Some(PropertyPair::new(key.clone(), value.clone()))
            }
            AnnotationKind::Tag { .. } => None,
        })
        .collect()
}

/// The note's tag labels, in creation order.
pub fn tags(registry: &AnnotationRegistry) -> Vec<String> {
    registry
        .annotations()
        .iter()
        .filter_map(|a| match &a.kind {
            AnnotationKind::Tag { label } => Some(label.clone()),
            AnnotationKind::Property { .. } => None,
        })
        .collect()
}
