//! The unified issue type and its resolution lifecycle.
//!
//! Every detector emits `Issue` records. The full issue set is recomputed
//! from scratch on every relevant data change; the only state that
//! survives recomputation is the status annotation map, keyed by a
//! deterministic issue id derived from the issue kind, the sorted
//! participant ids, and (for text-derived issues) a normalized
//! fingerprint of the offending text.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Heuristic flag worth a look.
    Warning,
    /// Structural contradiction in the story model.
    Error,
}

impl Severity {
    /// Get the display name for this severity.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// The kind of inconsistency an issue reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    /// A reference edge or textual claim that runs against timeline order.
    TimelineParadox,
    /// A character asserted to be in two places at the same story moment.
    CharacterLocationConflict,
    /// A foreshadowing edge pointing at a deleted beat.
    OrphanedForeshadowing,
    /// A payoff edge pointing at a deleted beat.
    OrphanedPayoff,
    /// Prose that appears to break a worldbuilding rule.
    RuleViolation,
    /// Dialogue that does not match a character's voice profile.
    VoiceDeviation,
}

impl IssueKind {
    /// Stable key used in issue identity.
    pub fn key(&self) -> &'static str {
        match self {
            IssueKind::TimelineParadox => "timeline_paradox",
            IssueKind::CharacterLocationConflict => "character_location_conflict",
            IssueKind::OrphanedForeshadowing => "orphaned_foreshadowing",
            IssueKind::OrphanedPayoff => "orphaned_payoff",
            IssueKind::RuleViolation => "rule_violation",
            IssueKind::VoiceDeviation => "voice_deviation",
        }
    }

    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            IssueKind::TimelineParadox => "Timeline paradox",
            IssueKind::CharacterLocationConflict => "Location conflict",
            IssueKind::OrphanedForeshadowing => "Orphaned foreshadowing",
            IssueKind::OrphanedPayoff => "Orphaned payoff",
            IssueKind::RuleViolation => "Rule violation",
            IssueKind::VoiceDeviation => "Voice deviation",
        }
    }
}

/// Deterministic issue identity.
///
/// Two runs over the same data produce the same ids, which is what lets
/// status annotations survive recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IssueId(String);

impl IssueId {
    /// Derive an id from the kind, the participant entity ids, and an
    /// optional fingerprint of the offending text.
    ///
    /// Participants are sorted so the caller's ordering does not matter.
    /// The fingerprint disambiguates multiple text-derived issues between
    /// the same participants (two offending sentences in one chapter, or
    /// an edge paradox and a textual paradox on the same beat pair).
    pub fn derive(kind: IssueKind, participants: &[Uuid], fingerprint: Option<&str>) -> Self {
        let mut sorted: Vec<Uuid> = participants.to_vec();
        sorted.sort();
        sorted.dedup();

        let mut id = String::from(kind.key());
        for uuid in &sorted {
            id.push(':');
            id.push_str(&uuid.simple().to_string());
        }
        if let Some(fingerprint) = fingerprint {
            id.push(':');
            id.push_str(&normalize_fingerprint(fingerprint));
        }
        Self(id)
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase and collapse whitespace so incidental formatting changes do
/// not change issue identity.
fn normalize_fingerprint(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Resolution status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IssueStatus {
    /// Freshly detected, awaiting a decision.
    #[default]
    Pending,
    /// The author decided this is not worth addressing.
    Ignored,
    /// The author has seen it and accepts it for now.
    Acknowledged,
    /// The author reports the underlying data has been corrected.
    Fixed,
}

impl IssueStatus {
    /// Whether this issue still needs a decision.
    pub fn is_open(&self) -> bool {
        matches!(self, IssueStatus::Pending)
    }

    /// Get the display name for this status.
    pub fn name(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::Ignored => "Ignored",
            IssueStatus::Acknowledged => "Acknowledged",
            IssueStatus::Fixed => "Fixed",
        }
    }
}

/// A single detected inconsistency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Deterministic identity.
    pub id: IssueId,
    /// What kind of inconsistency this is.
    pub kind: IssueKind,
    /// How serious it is.
    pub severity: Severity,
    /// Current resolution status.
    pub status: IssueStatus,
    /// Sorted ids of the originating entities (beats, characters, rules,
    /// chapters).
    pub participants: Vec<Uuid>,
    /// Human-readable description of the problem.
    pub description: String,
    /// Human-readable suggestion for fixing it.
    pub suggestion: String,
}

impl Issue {
    /// Create a new pending issue. Participants are sorted and deduped.
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        participants: Vec<Uuid>,
        fingerprint: Option<&str>,
        description: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        let id = IssueId::derive(kind, &participants, fingerprint);
        let mut sorted = participants;
        sorted.sort();
        sorted.dedup();
        Self {
            id,
            kind,
            severity,
            status: IssueStatus::Pending,
            participants: sorted,
            description: description.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Retained status annotations, merged onto freshly recomputed issues.
///
/// Writes are single-actor and idempotent keyed by issue id; there is no
/// concurrent writer in the cooperative UI model, so no locking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueTracker {
    annotations: HashMap<IssueId, IssueStatus>,
}

impl IssueTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status for an id. Unannotated issues are pending.
    pub fn status(&self, id: &IssueId) -> IssueStatus {
        self.annotations.get(id).copied().unwrap_or_default()
    }

    /// Mark an issue ignored. Returns false if the issue already carries a
    /// different terminal status (undo first).
    pub fn ignore(&mut self, id: &IssueId) -> bool {
        self.transition(id, IssueStatus::Ignored)
    }

    /// Mark an issue acknowledged.
    pub fn acknowledge(&mut self, id: &IssueId) -> bool {
        self.transition(id, IssueStatus::Acknowledged)
    }

    /// Mark an issue fixed.
    pub fn mark_fixed(&mut self, id: &IssueId) -> bool {
        self.transition(id, IssueStatus::Fixed)
    }

    /// Return an issue to pending from any terminal status.
    pub fn undo(&mut self, id: &IssueId) {
        self.annotations.remove(id);
    }

    fn transition(&mut self, id: &IssueId, to: IssueStatus) -> bool {
        match self.annotations.get(id) {
            None => {
                self.annotations.insert(id.clone(), to);
                true
            }
            Some(current) if *current == to => true,
            Some(_) => false,
        }
    }

    /// Overlay retained annotations onto a freshly recomputed issue list.
    pub fn merge(&self, issues: &mut [Issue]) {
        for issue in issues.iter_mut() {
            issue.status = self.status(&issue.id);
        }
    }

    /// Drop annotations whose issues no longer exist.
    ///
    /// Not called automatically: an issue that disappears and reappears
    /// (a beat edited away and back) keeps its status unless the caller
    /// opts into pruning.
    pub fn prune(&mut self, live: &[Issue]) {
        let live_ids: std::collections::HashSet<&IssueId> =
            live.iter().map(|issue| &issue.id).collect();
        self.annotations.retain(|id, _| live_ids.contains(id));
    }

    /// Number of retained annotations.
    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }
}
