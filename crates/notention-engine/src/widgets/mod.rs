//! Widget synchronizer: projects the annotation set onto the editing
//! surface as an explicit command diff.
//!
//! The annotation registry is the single source of truth; widgets are a
//! pure projection of it. Each sync pass compares the reconciliation
//! against the widgets already on screen and emits the minimal command set,
//! so syncing an unchanged buffer emits nothing.

use std::collections::HashMap;

use crate::annotations::{
    AnnotationId, AnnotationKind, AnnotationRegistry, Operator, Reconciliation,
};
use crate::span::Span;

/// Document-mutation commands sent to the editing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCmd {
    Insert {
        id: AnnotationId,
        span: Span,
        label: String,
    },
    Move {
        id: AnnotationId,
        span: Span,
    },
    /// The annotation's content changed in place (same id, new rendering).
    Relabel {
        id: AnnotationId,
        label: String,
    },
    Remove {
        id: AnnotationId,
    },
}

/// Rendered widget text, a pure function of the annotation.
pub fn render_label(kind: &AnnotationKind) -> String {
    match kind {
        AnnotationKind::Tag { label } => format!("#{label}"),
        AnnotationKind::Property {
            key,
            operator: Operator::Is,
            value,
        } => format!("{key}:{value}"),
        AnnotationKind::Property {
            key,
            operator: Operator::QualifiedIs,
            value,
        } => format!("{key} is {value}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WidgetView {
    span: Span,
    label: String,
}

/// Tracks which widgets exist on the surface, keyed by annotation id.
/// At most one widget per annotation id can ever exist: inserts go through
/// the id map, and the registry never reports an id as created twice.
#[derive(Debug, Default)]
pub struct WidgetSynchronizer {
    views: HashMap<AnnotationId, WidgetView>,
}

impl WidgetSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn widget_count(&self) -> usize {
        self.views.len()
    }

    pub fn has_widget(&self, id: AnnotationId) -> bool {
        self.views.contains_key(&id)
    }

    /// Translates a reconciliation into surface commands and records the
    /// resulting widget state.
    pub fn sync(
        &mut self,
        reconciliation: &Reconciliation,
        registry: &AnnotationRegistry,
    ) -> Vec<WidgetCmd> {
        let mut cmds = Vec::new();

        for &id in reconciliation.created.iter().chain(&reconciliation.updated) {
            let Some(annotation) = registry.get(id) else {
                continue;
            };
            let label = render_label(&annotation.kind);
            match self.views.get_mut(&id) {
                None => {
                    cmds.push(WidgetCmd::Insert {
                        id,
                        span: annotation.span,
                        label: label.clone(),
                    });
                    self.views.insert(
                        id,
                        WidgetView {
                            span: annotation.span,
                            label,
                        },
                    );
                }
                Some(view) => {
                    if view.span != annotation.span {
                        view.span = annotation.span;
                        cmds.push(WidgetCmd::Move {
                            id,
                            span: annotation.span,
                        });
                    }
                    if view.label != label {
                        view.label = label.clone();
                        cmds.push(WidgetCmd::Relabel { id, label });
                    }
                }
            }
        }

        for &id in &reconciliation.removed {
            if self.views.remove(&id).is_some() {
                cmds.push(WidgetCmd::Remove { id });
            }
        }

        cmds
    }
}
