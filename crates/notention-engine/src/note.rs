use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::annotations::{Annotation, AnnotationRegistry};
use crate::editing::{ChangeEvent, Document};
use crate::error::EngineError;
use crate::scanner;
use crate::semantics::{self, PropertyPair};
use crate::widgets::{WidgetCmd, WidgetSynchronizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable identifier of the entity that published a note. Opaque to the
/// engine; the network layer attaches it to delivered notes and discovery
/// deduplicates responses by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublisherId(String);

impl PublisherId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PublisherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationStatus {
    Draft,
    Publishing,
    Published,
}

/// The immutable form of a note sent to (and received from) the network
/// layer: derived properties and tags, no buffer internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub note_id: NoteId,
    pub publisher: PublisherId,
    pub title: String,
    pub tags: Vec<String>,
    pub properties: Vec<PropertyPair>,
    /// Unix seconds at the time the publish was initiated.
    pub published_at: u64,
}

/// A note: text buffer, annotations, widget state, and publication status.
///
/// All editing entry points take `&mut self`, which serializes the
/// scan → reconcile → synchronize cycle per note.
pub struct Note {
    id: NoteId,
    title: String,
    owner: PublisherId,
    document: Document,
    registry: AnnotationRegistry,
    widgets: WidgetSynchronizer,
    status: PublicationStatus,
}

impl Note {
    pub fn new(title: impl Into<String>, owner: PublisherId) -> Self {
        Self {
            id: NoteId::fresh(),
            title: title.into(),
            owner,
            document: Document::new(),
            registry: AnnotationRegistry::new(),
            widgets: WidgetSynchronizer::new(),
            status: PublicationStatus::Draft,
        }
    }

    pub fn id(&self) -> NoteId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn owner(&self) -> &PublisherId {
        &self.owner
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    pub fn revision(&self) -> u64 {
        self.document.revision()
    }

    pub fn status(&self) -> PublicationStatus {
        self.status
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.registry.annotations()
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.widget_count()
    }

    /// The derived property set (read-only to external consumers).
    pub fn properties(&self) -> Vec<PropertyPair> {
        semantics::extract(&self.registry)
    }

    pub fn tags(&self) -> Vec<String> {
        semantics::tags(&self.registry)
    }

    /// Runs one edit through the full cycle: apply to the buffer, shift
    /// annotation spans, rescan the dirty region, reconcile, and emit the
    /// widget command diff.
    pub fn apply_change(&mut self, event: &ChangeEvent) -> Result<Vec<WidgetCmd>, EngineError> {
        let outcome = self.document.apply(event)?;
        let moved = self.registry.transform(&outcome.delta, self.document.len());

        let (line, base) = self.document.line_slice(outcome.changed.clone());
        let scan = scanner::scan(&line, base, outcome.changed);
        let mut rec = self.registry.reconcile(scan.region, &scan.candidates);

        // Annotations shifted by the delta but outside the rescanned region
        // still need their widgets moved.
        for id in moved {
            if !rec.updated.contains(&id)
                && !rec.removed.contains(&id)
                && !rec.created.contains(&id)
            {
                rec.updated.push(id);
            }
        }

        Ok(self.widgets.sync(&rec, &self.registry))
    }

    /// Starts publishing: snapshots the note as a [`NoteRecord`] and moves
    /// to `Publishing`. A second call while one publish is in flight is
    /// rejected with [`EngineError::PublishConflict`] and changes nothing.
    pub fn begin_publish(&mut self) -> Result<NoteRecord, EngineError> {
        if self.status == PublicationStatus::Publishing {
            return Err(EngineError::PublishConflict(self.id));
        }
        self.status = PublicationStatus::Publishing;
        Ok(NoteRecord {
            note_id: self.id,
            publisher: self.owner.clone(),
            title: self.title.clone(),
            tags: self.tags(),
            properties: self.properties(),
            published_at: unix_now(),
        })
    }

    pub fn complete_publish(&mut self) {
        self.status = PublicationStatus::Published;
    }

    /// The publish failed or was rolled back; the note returns to draft.
    /// Buffer and annotations are untouched.
    pub fn fail_publish(&mut self) {
        if self.status == PublicationStatus::Publishing {
            self.status = PublicationStatus::Draft;
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note() -> Note {
        Note::new("test note", PublisherId::new("npub-owner"))
    }

    #[test]
    fn publish_conflict_is_rejected_without_state_change() {
        let mut note = note();
        let record = note.begin_publish().unwrap();
        assert_eq!(record.title, "test note");
        assert_eq!(note.status(), PublicationStatus::Publishing);

        let err = note.begin_publish().unwrap_err();
        assert!(matches!(err, EngineError::PublishConflict(id) if id == note.id()));
        assert_eq!(note.status(), PublicationStatus::Publishing);

        note.complete_publish();
        assert_eq!(note.status(), PublicationStatus::Published);
    }

    #[test]
    fn republish_after_publish_is_allowed() {
        let mut note = note();
        note.begin_publish().unwrap();
        note.complete_publish();
        assert!(note.begin_publish().is_ok());
    }

    #[test]
    fn failed_publish_returns_to_draft() {
        let mut note = note();
        note.begin_publish().unwrap();
        note.fail_publish();
        assert_eq!(note.status(), PublicationStatus::Draft);
    }

    #[test]
    fn record_carries_derived_tags_and_properties() {
        let mut note = note();
        note.apply_change(&ChangeEvent::insert(0, "#rust [service:Web Design] ", 0))
            .unwrap();

        let record = note.begin_publish().unwrap();
        assert_eq!(record.tags, vec!["rust".to_string()]);
        assert_eq!(
            record.properties,
            vec![PropertyPair::new("service", "Web Design")]
        );
        assert!(record.published_at > 0);
    }

    #[test]
    fn editing_before_a_widget_moves_it() {
        let mut note = note();
        note.apply_change(&ChangeEvent::insert(0, "#tag ", 0)).unwrap();
        let span = note.annotations()[0].span;

        // Typing a word at the start of the buffer shifts the tag right.
        let cmds = note
            .apply_change(&ChangeEvent::insert(0, "hello ", 1))
            .unwrap();
        assert!(
            cmds.iter()
                .any(|c| matches!(c, WidgetCmd::Move { span: s, .. } if s.start == span.start + 6))
        );
        assert_eq!(note.widget_count(), 1);
    }
}
