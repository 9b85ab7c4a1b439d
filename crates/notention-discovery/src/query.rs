use std::collections::HashMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use notention_engine::{NoteId, PropertyPair};

/// Maps seeker-side property keys to the provider-side keys they should
/// match, e.g. a seeker's `looking-for` matches a provider's `service`.
///
/// The mapping is an explicitly enumerated table, not a fuzzy key
/// similarity heuristic. Keys with no entry fall back to exact key match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    map: HashMap<String, String>,
}

impl SynonymTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in seeker → provider key mapping.
    pub fn builtin() -> Self {
        let map = [
            ("looking-for", "service"),
            ("budget", "price"),
            ("seeking", "offering"),
            ("required-skill", "skill"),
            ("hiring-for", "role"),
            ("needed-by", "deadline"),
            ("available-from", "startDate"),
            ("available-until", "endDate"),
            ("project-status", "status"),
            ("task-priority", "priority"),
            ("in-city", "city"),
            ("near-location", "location"),
            ("event-date", "startDateTime"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { map }
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn insert(&mut self, seeker_key: impl Into<String>, provider_key: impl Into<String>) {
        self.map.insert(seeker_key.into(), provider_key.into());
    }

    /// The provider-side key a seeker key should match, if mapped.
    pub fn resolve(&self, seeker_key: &str) -> Option<&str> {
        self.map.get(seeker_key).map(String::as_str)
    }
}

/// One match criterion derived from a seeker property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    /// The key as typed on the seeker note. Case preserved.
    pub seeker_key: String,
    /// The key looked for on provider notes (synonym-mapped, or equal to
    /// `seeker_key` when unmapped).
    pub key: String,
    pub value: String,
}

impl Criterion {
    /// True when some property has a related key (the mapped key or the raw
    /// seeker key) and an overlapping value. Keys compare case-sensitively,
    /// values case-insensitively (exact or substring either way).
    pub fn satisfied_by(&self, properties: &[PropertyPair]) -> bool {
        properties
            .iter()
            .any(|p| (p.key == self.key || p.key == self.seeker_key) && values_overlap(&p.value, &self.value))
    }
}

fn values_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// A seeker note's properties turned into network match criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub source_note: NoteId,
    pub criteria: Vec<Criterion>,
    pub issued_at: SystemTime,
}

impl DiscoveryQuery {
    /// Builds a query from the seeker note's extracted properties.
    ///
    /// Fails with [`DiscoveryError::EmptyQuery`] when the note has no
    /// properties; discovery never runs an unconstrained broadcast.
    pub fn build(
        source_note: NoteId,
        properties: &[PropertyPair],
        synonyms: &SynonymTable,
    ) -> Result<Self, DiscoveryError> {
        if properties.is_empty() {
            return Err(DiscoveryError::EmptyQuery);
        }
        let criteria = properties
            .iter()
            .map(|p| Criterion {
                key: synonyms.resolve(&p.key).unwrap_or(&p.key).to_string(),
                seeker_key: p.key.clone(),
                value: p.value.clone(),
            })
            .collect();
        Ok(Self {
            source_note,
            criteria,
            issued_at: SystemTime::now(),
        })
    }

    /// The criteria a candidate's properties satisfy.
    pub fn satisfied<'q>(&'q self, properties: &[PropertyPair]) -> Vec<&'q Criterion> {
        self.criteria
            .iter()
            .filter(|c| c.satisfied_by(properties))
            .collect()
    }
}
