use uuid::Uuid;

use crate::span::Span;

/// Stable identifier for an annotation. Survives edits: the registry updates
/// an annotation's span in place rather than recreating it, so widget
/// identity in the editing surface is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(Uuid);

impl AnnotationId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The operator of a property annotation. Distinguishes the display form
/// only; both forms flatten to the same key/value pair for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Written `[key:value]`.
    Is,
    /// Written `[key:is:value]`.
    QualifiedIs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationKind {
    /// `#label`. The label contains no whitespace and no sigil.
    Tag { label: String },
    /// `[key:value]` or `[key:is:value]`. Key case is preserved as typed.
    Property {
        key: String,
        operator: Operator,
        value: String,
    },
}

impl AnnotationKind {
    /// The identity component used when rebinding candidates to existing
    /// annotations: the tag label or the property key.
    pub fn key(&self) -> &str {
        match self {
            AnnotationKind::Tag { label } => label,
            AnnotationKind::Property { key, .. } => key,
        }
    }

    /// True when `other` is the same variant (tag vs property), regardless
    /// of label/key/value.
    pub fn same_variant(&self, other: &AnnotationKind) -> bool {
        matches!(
            (self, other),
            (AnnotationKind::Tag { .. }, AnnotationKind::Tag { .. })
                | (
                    AnnotationKind::Property { .. },
                    AnnotationKind::Property { .. }
                )
        )
    }
}

/// A typed annotation bound to a span of the note buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_key_is_label_for_tags_and_key_for_properties() {
        let tag = AnnotationKind::Tag {
            label: "testing".into(),
        };
        let prop = AnnotationKind::Property {
            key: "status".into(),
            operator: Operator::Is,
            value: "open".into(),
        };
        assert_eq!(tag.key(), "testing");
        assert_eq!(prop.key(), "status");
        assert!(!tag.same_variant(&prop));
    }
}
