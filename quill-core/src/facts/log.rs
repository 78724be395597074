//! The fact log: grouping for display and conflict resolution.

use super::assertion::{FactAssertion, FactId};
use super::conflict::{ConflictId, ConflictResolution, ContinuityConflict};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Store for extracted facts and collaborator-supplied conflicts.
///
/// Facts are append-only and never mutated; conflict resolution touches
/// only the conflict records themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactLog {
    facts: Vec<FactAssertion>,
    conflicts: Vec<ContinuityConflict>,
}

impl FactLog {
    /// Create an empty fact log.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Facts
    // =========================================================================

    /// Add an extracted fact.
    pub fn add_fact(&mut self, fact: FactAssertion) -> FactId {
        let id = fact.id;
        self.facts.push(fact);
        id
    }

    /// Add a batch of extracted facts.
    pub fn add_facts(&mut self, facts: impl IntoIterator<Item = FactAssertion>) {
        self.facts.extend(facts);
    }

    /// Get a fact by ID.
    pub fn get_fact(&self, id: FactId) -> Option<&FactAssertion> {
        self.facts.iter().find(|f| f.id == id)
    }

    /// All facts about a subject, in extraction order.
    pub fn facts_about(&self, subject_id: Uuid) -> Vec<&FactAssertion> {
        self.facts
            .iter()
            .filter(|f| f.subject_id == subject_id)
            .collect()
    }

    /// All facts grouped by subject, subjects in stable order.
    pub fn facts_by_subject(&self) -> BTreeMap<Uuid, Vec<&FactAssertion>> {
        let mut grouped: BTreeMap<Uuid, Vec<&FactAssertion>> = BTreeMap::new();
        for fact in &self.facts {
            grouped.entry(fact.subject_id).or_default().push(fact);
        }
        grouped
    }

    /// Total number of facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    // =========================================================================
    // Conflicts
    // =========================================================================

    /// Add a collaborator-supplied conflict. Conflicts that reference
    /// fewer than two known facts are dropped (fail soft).
    pub fn add_conflict(&mut self, conflict: ContinuityConflict) -> Option<ConflictId> {
        let known = conflict
            .fact_ids
            .iter()
            .filter(|id| self.get_fact(**id).is_some())
            .count();
        if known < 2 {
            return None;
        }
        let id = conflict.id;
        self.conflicts.push(conflict);
        Some(id)
    }

    /// Get a conflict by ID.
    pub fn get_conflict(&self, id: ConflictId) -> Option<&ContinuityConflict> {
        self.conflicts.iter().find(|c| c.id == id)
    }

    /// Conflicts still awaiting a decision.
    pub fn active_conflicts(&self) -> Vec<&ContinuityConflict> {
        self.conflicts.iter().filter(|c| !c.resolved).collect()
    }

    /// All conflicts involving a fact.
    pub fn conflicts_involving(&self, fact_id: FactId) -> Vec<&ContinuityConflict> {
        self.conflicts
            .iter()
            .filter(|c| c.involves(fact_id))
            .collect()
    }

    /// Apply a resolution action to a conflict.
    ///
    /// Keep-original and use-newer are one-way transitions to
    /// `resolved = true` with an annotation naming the winning fact;
    /// dismiss removes the record entirely. Returns false if the
    /// conflict is unknown or already resolved.
    pub fn resolve_conflict(&mut self, id: ConflictId, action: ConflictResolution) -> bool {
        if action == ConflictResolution::Dismiss {
            let before = self.conflicts.len();
            self.conflicts.retain(|c| c.id != id || c.resolved);
            return self.conflicts.len() != before;
        }

        let winner = {
            let Some(conflict) = self.conflicts.iter().find(|c| c.id == id) else {
                return false;
            };
            if conflict.resolved {
                return false;
            }
            match action {
                ConflictResolution::KeepOriginal => conflict.original_fact(),
                ConflictResolution::UseNewer => conflict.newest_fact(),
                ConflictResolution::Dismiss => unreachable!(),
            }
        };

        let annotation = match (action, winner.and_then(|w| self.get_fact(w))) {
            (ConflictResolution::KeepOriginal, Some(fact)) => {
                format!("Kept original: {}", fact.assertion)
            }
            (ConflictResolution::UseNewer, Some(fact)) => {
                format!("Used newer: {}", fact.assertion)
            }
            (ConflictResolution::KeepOriginal, None) => "Kept original fact".to_string(),
            (ConflictResolution::UseNewer, None) => "Used newer fact".to_string(),
            (ConflictResolution::Dismiss, _) => unreachable!(),
        };

        if let Some(conflict) = self.conflicts.iter_mut().find(|c| c.id == id) {
            conflict.resolved = true;
            conflict.resolution = Some(annotation);
            true
        } else {
            false
        }
    }

    /// Number of conflicts, resolved included.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::Severity;
    use crate::facts::{Confidence, FactType, SubjectKind};
    use crate::story::ChapterId;

    fn sample_fact(subject: Uuid, assertion: &str) -> FactAssertion {
        FactAssertion::new(
            subject,
            SubjectKind::Character,
            FactType::Physical,
            assertion,
            "supporting quote",
            ChapterId::new(),
            Confidence::Explicit,
        )
    }

    #[test]
    fn test_grouping_by_subject() {
        let mira = Uuid::new_v4();
        let tom = Uuid::new_v4();
        let mut log = FactLog::new();
        log.add_fact(sample_fact(mira, "Mira has green eyes"));
        log.add_fact(sample_fact(tom, "Tom limps"));
        log.add_fact(sample_fact(mira, "Mira is left-handed"));

        let grouped = log.facts_by_subject();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&mira].len(), 2);
        assert_eq!(grouped[&tom].len(), 1);
        assert_eq!(log.facts_about(mira).len(), 2);
    }

    #[test]
    fn test_keep_original() {
        let mira = Uuid::new_v4();
        let mut log = FactLog::new();
        let green = log.add_fact(sample_fact(mira, "Mira has green eyes"));
        let brown = log.add_fact(sample_fact(mira, "Mira has brown eyes"));

        let id = log
            .add_conflict(ContinuityConflict::new(
                vec![green, brown],
                Severity::Error,
                "Eye color changes",
            ))
            .unwrap();

        assert!(log.resolve_conflict(id, ConflictResolution::KeepOriginal));
        let conflict = log.get_conflict(id).unwrap();
        assert!(conflict.resolved);
        assert!(conflict.resolution.as_ref().unwrap().contains("green eyes"));

        // One-way: a second resolution attempt is rejected.
        assert!(!log.resolve_conflict(id, ConflictResolution::UseNewer));
        // Facts themselves are untouched.
        assert_eq!(log.get_fact(brown).unwrap().assertion, "Mira has brown eyes");
    }

    #[test]
    fn test_use_newer() {
        let mira = Uuid::new_v4();
        let mut log = FactLog::new();
        let green = log.add_fact(sample_fact(mira, "Mira has green eyes"));
        let brown = log.add_fact(sample_fact(mira, "Mira has brown eyes"));

        let id = log
            .add_conflict(ContinuityConflict::new(
                vec![green, brown],
                Severity::Error,
                "Eye color changes",
            ))
            .unwrap();

        assert!(log.resolve_conflict(id, ConflictResolution::UseNewer));
        let resolution = log.get_conflict(id).unwrap().resolution.clone().unwrap();
        assert!(resolution.contains("brown eyes"));
    }

    #[test]
    fn test_dismiss_removes_from_active_list() {
        let mira = Uuid::new_v4();
        let mut log = FactLog::new();
        let a = log.add_fact(sample_fact(mira, "A"));
        let b = log.add_fact(sample_fact(mira, "B"));

        let id = log
            .add_conflict(ContinuityConflict::new(
                vec![a, b],
                Severity::Warning,
                "Not really a conflict",
            ))
            .unwrap();
        assert_eq!(log.active_conflicts().len(), 1);

        assert!(log.resolve_conflict(id, ConflictResolution::Dismiss));
        assert!(log.active_conflicts().is_empty());
        assert_eq!(log.conflict_count(), 0);
        // Repeat dismissal is a no-op.
        assert!(!log.resolve_conflict(id, ConflictResolution::Dismiss));
    }

    #[test]
    fn test_conflict_with_unknown_facts_is_dropped() {
        let mut log = FactLog::new();
        let orphaned = ContinuityConflict::new(
            vec![FactId::new(), FactId::new()],
            Severity::Warning,
            "References nothing we know",
        );
        assert!(log.add_conflict(orphaned).is_none());
        assert_eq!(log.conflict_count(), 0);
    }

    #[test]
    fn test_resolving_unknown_conflict_fails() {
        let mut log = FactLog::new();
        assert!(!log.resolve_conflict(ConflictId::new(), ConflictResolution::KeepOriginal));
    }
}
