//! Continuity conflicts between fact assertions.

use super::assertion::FactId;
use crate::consistency::Severity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a continuity conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a new unique conflict ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConflictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a conflict is settled. Each action is a one-way transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// The earlier fact stands; the newer one is the mistake.
    KeepOriginal,
    /// The newer fact stands; the story has moved on.
    UseNewer,
    /// Not actually a conflict; drop it from the active list.
    Dismiss,
}

/// A detected contradiction between two or more fact assertions.
///
/// Conflicts arrive pre-identified by the external collaborator; the
/// fact log owns only the resolution workflow. `fact_ids` are ordered
/// earliest first, as supplied by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuityConflict {
    /// Unique identifier.
    pub id: ConflictId,
    /// The contradicting facts, earliest first. Always at least two.
    pub fact_ids: Vec<FactId>,
    /// How serious the contradiction is.
    pub severity: Severity,
    /// Human-readable description of the contradiction.
    pub description: String,
    /// Whether the author has settled it.
    pub resolved: bool,
    /// Resolution annotation, set when resolved.
    pub resolution: Option<String>,
}

impl ContinuityConflict {
    /// Create a new unresolved conflict.
    pub fn new(fact_ids: Vec<FactId>, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            id: ConflictId::new(),
            fact_ids,
            severity,
            description: description.into(),
            resolved: false,
            resolution: None,
        }
    }

    /// The earliest involved fact.
    pub fn original_fact(&self) -> Option<FactId> {
        self.fact_ids.first().copied()
    }

    /// The latest involved fact.
    pub fn newest_fact(&self) -> Option<FactId> {
        self.fact_ids.last().copied()
    }

    /// Check if this conflict involves a given fact.
    pub fn involves(&self, fact_id: FactId) -> bool {
        self.fact_ids.contains(&fact_id)
    }
}
