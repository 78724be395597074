//! Orphaned reference detection.
//!
//! Beats are deletable independently of the edges pointing at them, so a
//! dangling id is an expected runtime state. It must be surfaced rather
//! than silently followed or dropped.

use super::issue::{Issue, IssueKind, Severity};
use crate::story::{BeatId, PlotBeat};
use std::collections::HashSet;

/// Scan all beats for edges whose target no longer exists.
pub fn detect_orphaned_references(beats: &[PlotBeat]) -> Vec<Issue> {
    let live: HashSet<BeatId> = beats.iter().map(|b| b.id).collect();
    let mut ordered: Vec<&PlotBeat> = beats.iter().collect();
    ordered.sort_by_key(|b| (b.timeline_position, b.id));

    let mut issues = Vec::new();

    for beat in ordered {
        for target in &beat.foreshadowing {
            if !live.contains(target) {
                issues.push(orphan_issue(beat, *target, IssueKind::OrphanedForeshadowing));
            }
        }
        for source in &beat.payoffs {
            if !live.contains(source) {
                issues.push(orphan_issue(beat, *source, IssueKind::OrphanedPayoff));
            }
        }
    }

    issues
}

fn orphan_issue(beat: &PlotBeat, dangling: BeatId, kind: IssueKind) -> Issue {
    let edge = match kind {
        IssueKind::OrphanedForeshadowing => "foreshadowing",
        _ => "payoff",
    };
    Issue::new(
        kind,
        Severity::Warning,
        vec![beat.id.as_uuid(), dangling.as_uuid()],
        None,
        format!(
            "\"{}\" has a {} reference to a beat that no longer exists",
            beat.title, edge
        ),
        format!("Remove the dangling {} reference from \"{}\"", edge, beat.title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intact_references() {
        let target = PlotBeat::new("Target", 5);
        let source = PlotBeat::new("Source", 1).with_foreshadowing(target.id);
        assert!(detect_orphaned_references(&[source, target]).is_empty());
    }

    #[test]
    fn test_deleted_target_is_surfaced() {
        let target = PlotBeat::new("Target", 5);
        let source = PlotBeat::new("Source", 1)
            .with_foreshadowing(target.id)
            .with_payoff(BeatId::new());

        // Target deleted: only source survives.
        let issues = detect_orphaned_references(&[source.clone()]);
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .any(|i| i.kind == IssueKind::OrphanedForeshadowing));
        assert!(issues.iter().any(|i| i.kind == IssueKind::OrphanedPayoff));
    }

    #[test]
    fn test_removing_the_edge_removes_the_issue() {
        let mut source = PlotBeat::new("Source", 1).with_foreshadowing(BeatId::new());
        assert_eq!(detect_orphaned_references(std::slice::from_ref(&source)).len(), 1);

        source.foreshadowing.clear();
        assert!(detect_orphaned_references(&[source]).is_empty());
    }

    #[test]
    fn test_one_issue_per_dangling_reference() {
        let source = PlotBeat::new("Source", 1)
            .with_foreshadowing(BeatId::new())
            .with_foreshadowing(BeatId::new());
        assert_eq!(detect_orphaned_references(&[source]).len(), 2);
    }
}
