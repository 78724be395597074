//! Narrative consistency verification.
//!
//! Five detectors over an in-memory story snapshot, all pure and
//! side-effect free, safe to re-run on every edit. Their outputs flow
//! through the shared issue lifecycle in [`issue`].

pub mod issue;
pub mod location;
pub mod orphan;
pub mod rules;
pub mod text;
pub mod timeline;
pub mod voice;

pub use issue::{Issue, IssueId, IssueKind, IssueStatus, IssueTracker, Severity};
pub use location::detect_location_conflicts;
pub use orphan::detect_orphaned_references;
pub use rules::{detect_rule_violations, extract_rule, ExtractedRule, RuleTemplate, RULE_TEMPLATES};
pub use timeline::detect_timeline_paradoxes;
pub use voice::{detect_voice_deviations, extract_dialogue, DialogueLine};

use crate::story::{Chapter, Character, PlotBeat, WikiEntry};

/// A read-only view of everything the detectors consume.
#[derive(Debug, Clone, Default)]
pub struct StorySnapshot<'a> {
    pub beats: &'a [PlotBeat],
    pub characters: &'a [Character],
    pub wiki_entries: &'a [WikiEntry],
    pub chapters: &'a [Chapter],
}

/// Run every detector over a snapshot and overlay retained annotations.
///
/// Issues are sorted by id, so two runs over unchanged data produce an
/// identical list.
pub fn check_story(snapshot: &StorySnapshot<'_>, tracker: &IssueTracker) -> Vec<Issue> {
    let mut issues = Vec::new();
    issues.extend(detect_timeline_paradoxes(snapshot.beats));
    issues.extend(detect_location_conflicts(snapshot.beats, snapshot.characters));
    issues.extend(detect_orphaned_references(snapshot.beats));
    issues.extend(detect_rule_violations(snapshot.wiki_entries, snapshot.chapters));
    issues.extend(detect_voice_deviations(snapshot.characters, snapshot.chapters));

    issues.sort_by(|a, b| a.id.cmp(&b.id));
    tracker.merge(&mut issues);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::PlotBeat;

    #[test]
    fn test_empty_snapshot_is_clean() {
        let snapshot = StorySnapshot::default();
        let tracker = IssueTracker::new();
        assert!(check_story(&snapshot, &tracker).is_empty());
    }

    #[test]
    fn test_annotations_survive_recomputation() {
        let target = PlotBeat::new("Hint", 1);
        let source = PlotBeat::new("Reveal", 5).with_foreshadowing(target.id);
        let beats = vec![source, target];
        let snapshot = StorySnapshot {
            beats: &beats,
            ..Default::default()
        };

        let mut tracker = IssueTracker::new();
        let first = check_story(&snapshot, &tracker);
        assert_eq!(first.len(), 1);
        tracker.ignore(&first[0].id);

        let second = check_story(&snapshot, &tracker);
        assert_eq!(second[0].status, IssueStatus::Ignored);
    }
}
