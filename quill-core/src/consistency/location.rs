//! Character location conflict detection.
//!
//! Equal `timeline_position` is the simultaneity proxy: the model has no
//! richer time representation, so two beats at the same ordinal are the
//! same story moment. A character present in two such beats with
//! differing locations cannot be in both.

use super::issue::{Issue, IssueKind, Severity};
use crate::story::{Character, CharacterId, PlotBeat};
use std::collections::BTreeMap;

/// Scan for characters present in two places at the same story moment.
///
/// One error issue is emitted per (beat pair, shared character). Groups
/// and pairs are visited in sorted order for deterministic output.
pub fn detect_location_conflicts(beats: &[PlotBeat], characters: &[Character]) -> Vec<Issue> {
    let mut by_position: BTreeMap<i32, Vec<&PlotBeat>> = BTreeMap::new();
    for beat in beats {
        by_position.entry(beat.timeline_position).or_default().push(beat);
    }

    let mut issues = Vec::new();

    for group in by_position.values_mut() {
        group.sort_by_key(|b| b.id);
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                let (Some(loc_a), Some(loc_b)) = (&first.location, &second.location) else {
                    continue;
                };
                if loc_a.to_lowercase() == loc_b.to_lowercase() {
                    continue;
                }

                let mut shared: Vec<CharacterId> = first
                    .characters_involved
                    .iter()
                    .filter(|id| second.involves(**id))
                    .copied()
                    .collect();
                shared.sort();

                for character_id in shared {
                    issues.push(conflict_issue(first, second, character_id, characters));
                }
            }
        }
    }

    issues
}

fn conflict_issue(
    first: &PlotBeat,
    second: &PlotBeat,
    character_id: CharacterId,
    characters: &[Character],
) -> Issue {
    // Missing character records degrade to the id string, never a panic.
    let name = characters
        .iter()
        .find(|c| c.id == character_id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| character_id.to_string());

    let (loc_a, loc_b) = (
        first.location.as_deref().unwrap_or(""),
        second.location.as_deref().unwrap_or(""),
    );

    Issue::new(
        IssueKind::CharacterLocationConflict,
        Severity::Error,
        vec![
            first.id.as_uuid(),
            second.id.as_uuid(),
            character_id.as_uuid(),
        ],
        None,
        format!(
            "{} is in {} during \"{}\" and in {} during \"{}\", both at timeline \
             position {}",
            name, loc_a, first.title, loc_b, second.title, first.timeline_position
        ),
        format!(
            "Move one of the beats to a different timeline position, or remove {} \
             from one of them",
            name
        ),
    )
}
