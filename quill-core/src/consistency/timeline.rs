//! Timeline paradox detection.
//!
//! A foreshadowing edge must point strictly forward in time, a payoff
//! edge strictly backward. On top of the edge checks, an O(n²) textual
//! scan flags an earlier beat whose free text explicitly claims to depend
//! on a later one ("after <title>", "following <title>", "because of
//! <title>") — that is an error, not just a warning, because the author
//! wrote the dependency down.

use super::issue::{Issue, IssueKind, Severity};
use crate::story::{BeatId, PlotBeat};
use std::collections::HashMap;

/// Phrases that assert a textual dependency on another beat.
const DEPENDENCY_PHRASES: [&str; 3] = ["after", "following", "because of"];

/// Scan the full beat set for timeline paradoxes.
///
/// Beats are iterated in (position, id) order so repeated runs over
/// unchanged input produce an identical issue list. Edges whose target
/// does not resolve are skipped here; the orphan detector owns them.
pub fn detect_timeline_paradoxes(beats: &[PlotBeat]) -> Vec<Issue> {
    let by_id: HashMap<BeatId, &PlotBeat> = beats.iter().map(|b| (b.id, b)).collect();
    let mut ordered: Vec<&PlotBeat> = beats.iter().collect();
    ordered.sort_by_key(|b| (b.timeline_position, b.id));

    let mut issues = Vec::new();

    for beat in &ordered {
        for target_id in &beat.foreshadowing {
            let Some(target) = by_id.get(target_id) else {
                continue;
            };
            if target.timeline_position <= beat.timeline_position {
                issues.push(edge_paradox(beat, target, EdgeRole::Foreshadowing));
            }
        }
        for source_id in &beat.payoffs {
            let Some(source) = by_id.get(source_id) else {
                continue;
            };
            if source.timeline_position >= beat.timeline_position {
                issues.push(edge_paradox(beat, source, EdgeRole::Payoff));
            }
        }
    }

    // Textual dependencies: an earlier beat's prose naming a later beat.
    for earlier in &ordered {
        let text = earlier.combined_text().to_lowercase();
        for later in &ordered {
            if earlier.timeline_position >= later.timeline_position {
                continue;
            }
            if later.title.is_empty() {
                continue;
            }
            let title = later.title.to_lowercase();
            for phrase in DEPENDENCY_PHRASES {
                let claim = format!("{phrase} {title}");
                if text.contains(&claim) {
                    issues.push(textual_paradox(earlier, later, &claim));
                }
            }
        }
    }

    issues
}

enum EdgeRole {
    Foreshadowing,
    Payoff,
}

fn edge_paradox(beat: &PlotBeat, other: &PlotBeat, role: EdgeRole) -> Issue {
    let (fingerprint, description, suggestion) = match role {
        EdgeRole::Foreshadowing => (
            "foreshadowing",
            format!(
                "\"{}\" (position {}) foreshadows \"{}\" (position {}), but a \
                 foreshadowing edge must point strictly forward in time",
                beat.title, beat.timeline_position, other.title, other.timeline_position
            ),
            format!(
                "Move \"{}\" later than \"{}\" on the timeline, or turn the edge into a payoff",
                other.title, beat.title
            ),
        ),
        EdgeRole::Payoff => (
            "payoff",
            format!(
                "\"{}\" (position {}) pays off \"{}\" (position {}), but a payoff \
                 edge must point strictly backward in time",
                beat.title, beat.timeline_position, other.title, other.timeline_position
            ),
            format!(
                "Move \"{}\" earlier than \"{}\" on the timeline, or turn the edge into foreshadowing",
                other.title, beat.title
            ),
        ),
    };

    Issue::new(
        IssueKind::TimelineParadox,
        Severity::Warning,
        vec![beat.id.as_uuid(), other.id.as_uuid()],
        Some(fingerprint),
        description,
        suggestion,
    )
}

fn textual_paradox(earlier: &PlotBeat, later: &PlotBeat, claim: &str) -> Issue {
    Issue::new(
        IssueKind::TimelineParadox,
        Severity::Error,
        vec![earlier.id.as_uuid(), later.id.as_uuid()],
        Some(claim),
        format!(
            "\"{}\" (position {}) is described as happening \"{}\", but \"{}\" is at \
             the later position {}",
            earlier.title, earlier.timeline_position, claim, later.title, later.timeline_position
        ),
        format!(
            "Reorder the beats or rewrite the description of \"{}\" so it does not \
             depend on \"{}\"",
            earlier.title, later.title
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::PlotBeat;

    #[test]
    fn test_valid_forward_foreshadowing() {
        let payoff = PlotBeat::new("The Reveal", 5);
        let setup = PlotBeat::new("The Hint", 1).with_foreshadowing(payoff.id);

        let issues = detect_timeline_paradoxes(&[setup, payoff]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_backward_foreshadowing_is_a_paradox() {
        let target = PlotBeat::new("The Hint", 1);
        let source = PlotBeat::new("The Reveal", 5).with_foreshadowing(target.id);

        let issues = detect_timeline_paradoxes(&[source, target]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::TimelineParadox);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_equal_position_foreshadowing_is_a_paradox() {
        let target = PlotBeat::new("Same Moment", 3);
        let source = PlotBeat::new("Also Same Moment", 3).with_foreshadowing(target.id);

        let issues = detect_timeline_paradoxes(&[source, target]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_forward_payoff_is_a_paradox() {
        let later = PlotBeat::new("The Consequence", 8);
        let earlier = PlotBeat::new("The Cause", 2).with_payoff(later.id);

        let issues = detect_timeline_paradoxes(&[earlier.clone(), later]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("backward"));
    }

    #[test]
    fn test_textual_dependency_is_an_error() {
        let later = PlotBeat::new("The Fire", 9);
        let earlier = PlotBeat::new("The Rebuilding", 2)
            .with_summary("The town rebuilds after The Fire destroyed the granary.");

        let issues = detect_timeline_paradoxes(&[earlier, later]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].description.contains("after the fire"));
    }

    #[test]
    fn test_textual_phrase_variants() {
        let later = PlotBeat::new("The Coronation", 7);
        let earlier = PlotBeat::new("Unrest", 1)
            .with_notes("Riots break out because of The Coronation decree.");

        let issues = detect_timeline_paradoxes(&[earlier, later]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_dangling_edges_are_skipped() {
        let beat = PlotBeat::new("Lonely", 1).with_foreshadowing(BeatId::new());
        let issues = detect_timeline_paradoxes(&[beat]);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_idempotent_output() {
        let payoff = PlotBeat::new("B", 1);
        let setup = PlotBeat::new("A", 5).with_foreshadowing(payoff.id);
        let beats = vec![setup, payoff];

        let first = detect_timeline_paradoxes(&beats);
        let second = detect_timeline_paradoxes(&beats);
        let first_ids: Vec<_> = first.iter().map(|issue| issue.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|issue| issue.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
