use log::debug;
use xi_rope::RopeInfo;
use xi_rope::delta::{Delta, Transformer};

use super::types::{Annotation, AnnotationId};
use crate::scanner::Candidate;
use crate::span::Span;

/// Result of reconciling one scan against the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub created: Vec<AnnotationId>,
    pub updated: Vec<AnnotationId>,
    pub removed: Vec<AnnotationId>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Owns the annotations of one note, in creation order.
///
/// Identity is stable across edits: an annotation whose span shifted because
/// of an upstream insert/delete, or whose value was edited in place, keeps
/// its id so the widget layer never destroys and recreates its widget.
#[derive(Debug, Default)]
pub struct AnnotationRegistry {
    items: Vec<Annotation>,
}

impl AnnotationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.items
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shifts every annotation span through an edit delta, returning the ids
    /// whose offsets actually moved.
    ///
    /// Start positions use `after = true` so an insertion at the exact start
    /// pushes the annotation forward; end positions use `after = false` so
    /// an insertion at the exact end does not absorb the new text. A span
    /// the edit destroyed collapses to empty and is retired by the next
    /// reconcile pass over its region.
    pub fn transform(&mut self, delta: &Delta<RopeInfo>, buffer_len: usize) -> Vec<AnnotationId> {
        let mut transformer = Transformer::new(delta);
        let mut moved = Vec::new();
        for annotation in &mut self.items {
            let new_start = transformer.transform(annotation.span.start, true);
            let new_end = transformer.transform(annotation.span.end, false);
            let new_span = if new_start <= new_end && new_end <= buffer_len {
                Span::new(new_start, new_end)
            } else {
                let at = new_start.min(buffer_len);
                Span::new(at, at)
            };
            if new_span != annotation.span {
                annotation.span = new_span;
                moved.push(annotation.id);
            }
        }
        moved
    }

    /// Reconciles the scanned `region` against the registry.
    ///
    /// Only annotations intersecting the region participate. Closed
    /// candidates are bound to existing annotations by variant + key
    /// equality plus span overlap, falling back to overlap alone (so an
    /// in-place key or value edit updates rather than recreates). Existing
    /// annotations in the region with no matching candidate are removed;
    /// a previously valid span that became unparsable fails silently.
    /// Open candidates are never promoted.
    pub fn reconcile(&mut self, region: Span, candidates: &[Candidate]) -> Reconciliation {
        let mut rec = Reconciliation::default();

        let mut free: Vec<usize> = (0..self.items.len())
            .filter(|&i| in_region(self.items[i].span, region))
            .collect();

        for candidate in candidates {
            let Candidate::Closed { span, kind } = candidate else {
                continue;
            };
            let pick = free
                .iter()
                .position(|&i| {
                    let a = &self.items[i];
                    a.kind.same_variant(kind)
                        && a.kind.key() == kind.key()
                        && a.span.intersects(*span)
                })
                .or_else(|| {
                    free.iter().position(|&i| {
                        let a = &self.items[i];
                        a.kind.same_variant(kind) && a.span.intersects(*span)
                    })
                });

            match pick {
                Some(slot) => {
                    let idx = free.remove(slot);
                    let existing = &mut self.items[idx];
                    if existing.span != *span || existing.kind != *kind {
                        existing.span = *span;
                        existing.kind = kind.clone();
                        rec.updated.push(existing.id);
                    }
                }
                None => {
                    let annotation = Annotation {
                        id: AnnotationId::fresh(),
                        kind: kind.clone(),
                        span: *span,
                    };
                    rec.created.push(annotation.id);
                    self.items.push(annotation);
                }
            }
        }

        // Whatever is left in the region no longer matches any pattern.
        free.sort_unstable_by(|a, b| b.cmp(a));
        for idx in free {
            let gone = self.items.remove(idx);
            debug!("annotation {} no longer parses, removed", gone.id);
            rec.removed.push(gone.id);
        }

        rec
    }
}

/// An empty span (collapsed by a deletion) has no overlap with anything but
/// still belongs to the region that swallowed it.
fn in_region(span: Span, region: Span) -> bool {
    span.intersects(region)
        || (span.is_empty() && span.start >= region.start && span.start <= region.end)
}
