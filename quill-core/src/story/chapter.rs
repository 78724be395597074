//! Chapters of manuscript prose.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChapterId(Uuid);

impl ChapterId {
    /// Create a new unique chapter ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID, used for deterministic issue identity.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chapter of the manuscript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique identifier.
    pub id: ChapterId,
    /// Chapter title.
    pub title: String,
    /// Position in the manuscript, 1-based.
    pub number: u32,
    /// Full prose content.
    pub content: String,
}

impl Chapter {
    /// Create a new chapter.
    pub fn new(title: impl Into<String>, number: u32, content: impl Into<String>) -> Self {
        Self {
            id: ChapterId::new(),
            title: title.into(),
            number,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_creation() {
        let chapter = Chapter::new("The Crossing", 4, "They crossed at dawn.");
        assert_eq!(chapter.number, 4);
        assert!(chapter.content.contains("dawn"));
    }
}
