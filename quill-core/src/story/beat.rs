//! Plot beats and their reference edges.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a plot beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeatId(Uuid);

impl BeatId {
    /// Create a new unique beat ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID, used for deterministic issue identity.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BeatId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An authored story event with a position on the ordinal timeline.
///
/// Foreshadowing edges point forward in time (to beats with strictly
/// greater `timeline_position`), payoff edges point backward. Edges are
/// stored as bare ids with no referential-integrity enforcement; a
/// dangling edge is a valid state surfaced by the orphan detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotBeat {
    /// Unique identifier.
    pub id: BeatId,
    /// Short title, also used by the textual-dependency scan.
    pub title: String,
    /// Integer ordinal on the story timeline. Equal positions mean the
    /// same story moment.
    pub timeline_position: i32,
    /// Where this beat takes place, if anywhere specific.
    pub location: Option<String>,
    /// Characters present in this beat.
    pub characters_involved: Vec<super::CharacterId>,
    /// Forward references to beats this one sets up.
    pub foreshadowing: Vec<BeatId>,
    /// Backward references to beats this one resolves.
    pub payoffs: Vec<BeatId>,
    /// One-line summary.
    pub summary: String,
    /// Longer prose description.
    pub detailed_description: String,
    /// Author notes.
    pub notes: String,
}

impl PlotBeat {
    /// Create a new beat at the given timeline position.
    pub fn new(title: impl Into<String>, timeline_position: i32) -> Self {
        Self {
            id: BeatId::new(),
            title: title.into(),
            timeline_position,
            location: None,
            characters_involved: Vec::new(),
            foreshadowing: Vec::new(),
            payoffs: Vec::new(),
            summary: String::new(),
            detailed_description: String::new(),
            notes: String::new(),
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Add a character to this beat.
    pub fn with_character(mut self, character_id: super::CharacterId) -> Self {
        if !self.characters_involved.contains(&character_id) {
            self.characters_involved.push(character_id);
        }
        self
    }

    /// Add a foreshadowing edge.
    pub fn with_foreshadowing(mut self, target: BeatId) -> Self {
        self.foreshadowing.push(target);
        self
    }

    /// Add a payoff edge.
    pub fn with_payoff(mut self, source: BeatId) -> Self {
        self.payoffs.push(source);
        self
    }

    /// Set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the detailed description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.detailed_description = description.into();
        self
    }

    /// Set the author notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// All free-text fields concatenated, for textual scans.
    pub fn combined_text(&self) -> String {
        let mut text = String::with_capacity(
            self.summary.len() + self.detailed_description.len() + self.notes.len() + 2,
        );
        text.push_str(&self.summary);
        text.push(' ');
        text.push_str(&self.detailed_description);
        text.push(' ');
        text.push_str(&self.notes);
        text
    }

    /// Check whether a character appears in this beat.
    pub fn involves(&self, character_id: super::CharacterId) -> bool {
        self.characters_involved.contains(&character_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::CharacterId;

    #[test]
    fn test_beat_creation() {
        let beat = PlotBeat::new("The Stolen Letter", 3)
            .with_location("The Library")
            .with_summary("Mira finds the letter missing.");

        assert_eq!(beat.title, "The Stolen Letter");
        assert_eq!(beat.timeline_position, 3);
        assert_eq!(beat.location.as_deref(), Some("The Library"));
        assert!(beat.foreshadowing.is_empty());
    }

    #[test]
    fn test_character_dedup() {
        let mira = CharacterId::new();
        let beat = PlotBeat::new("Beat", 0)
            .with_character(mira)
            .with_character(mira);
        assert_eq!(beat.characters_involved.len(), 1);
        assert!(beat.involves(mira));
    }

    #[test]
    fn test_combined_text() {
        let beat = PlotBeat::new("Beat", 0)
            .with_summary("A summary.")
            .with_description("Details.")
            .with_notes("A note.");
        let text = beat.combined_text();
        assert!(text.contains("A summary."));
        assert!(text.contains("Details."));
        assert!(text.contains("A note."));
    }
}
