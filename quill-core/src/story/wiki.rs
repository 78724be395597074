//! Worldbuilding wiki entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a wiki entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Create a new unique entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID, used for deterministic issue identity.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categories of wiki entries. Only `Rules` entries feed the rule matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryCategory {
    /// A worldbuilding rule ("magic requires hand gestures").
    Rules,
    /// Background lore.
    Lore,
    /// A place.
    Place,
    /// An object or artifact.
    Item,
}

impl EntryCategory {
    /// Get the display name for this category.
    pub fn name(&self) -> &'static str {
        match self {
            EntryCategory::Rules => "Rules",
            EntryCategory::Lore => "Lore",
            EntryCategory::Place => "Place",
            EntryCategory::Item => "Item",
        }
    }
}

/// A worldbuilding wiki entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiEntry {
    /// Unique identifier.
    pub id: EntryId,
    /// Entry name.
    pub name: String,
    /// What kind of entry this is.
    pub category: EntryCategory,
    /// Free-text description; for rule entries this is the source of the
    /// keyword/negation extraction.
    pub description: String,
}

impl WikiEntry {
    /// Create a new wiki entry.
    pub fn new(
        name: impl Into<String>,
        category: EntryCategory,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            name: name.into(),
            category,
            description: description.into(),
        }
    }

    /// Shorthand for a rule entry.
    pub fn rule(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, EntryCategory::Rules, description)
    }

    /// Whether this entry feeds the rule matcher.
    pub fn is_rule(&self) -> bool {
        self.category == EntryCategory::Rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_shorthand() {
        let entry = WikiEntry::rule("Gesture Law", "Magic requires hand gestures");
        assert!(entry.is_rule());
        assert_eq!(entry.category.name(), "Rules");
    }

    #[test]
    fn test_non_rule_entry() {
        let entry = WikiEntry::new("The Old Capital", EntryCategory::Place, "A ruined city");
        assert!(!entry.is_rule());
    }
}
