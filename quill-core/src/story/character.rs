//! Characters and their voice profiles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(Uuid);

impl CharacterId {
    /// Create a new unique character ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID, used for deterministic issue identity.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A character's configured vocabulary register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VocabularyLevel {
    /// Elevated, precise speech; slang reads as out of character.
    Formal,
    /// No strong register; nothing is flagged.
    Neutral,
    /// Relaxed speech; stiffly formal wording reads as out of character.
    Casual,
    /// Heavy slang; formal wording reads as out of character.
    Slang,
}

impl VocabularyLevel {
    /// Get the display name for this register.
    pub fn name(&self) -> &'static str {
        match self {
            VocabularyLevel::Formal => "Formal",
            VocabularyLevel::Neutral => "Neutral",
            VocabularyLevel::Casual => "Casual",
            VocabularyLevel::Slang => "Slang",
        }
    }
}

/// Voice consistency rule source for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Configured vocabulary register.
    pub vocabulary: VocabularyLevel,
    /// Free-text speech pattern notes (e.g. "stutters when nervous").
    pub speech_patterns: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            vocabulary: VocabularyLevel::Neutral,
            speech_patterns: String::new(),
        }
    }
}

/// A story character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: CharacterId,
    /// Primary name.
    pub name: String,
    /// Alternative names or nicknames used in prose.
    pub aliases: Vec<String>,
    /// Voice consistency profile.
    pub voice: VoiceProfile,
}

impl Character {
    /// Create a new character.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            aliases: Vec::new(),
            voice: VoiceProfile::default(),
        }
    }

    /// Add an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the vocabulary register.
    pub fn with_vocabulary(mut self, vocabulary: VocabularyLevel) -> Self {
        self.voice.vocabulary = vocabulary;
        self
    }

    /// Set the speech pattern notes.
    pub fn with_speech_patterns(mut self, patterns: impl Into<String>) -> Self {
        self.voice.speech_patterns = patterns.into();
        self
    }

    /// Check if a name matches this character (case-insensitive).
    pub fn matches_name(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        if self.name.to_lowercase() == query_lower {
            return true;
        }
        self.aliases.iter().any(|a| a.to_lowercase() == query_lower)
    }

    /// All names this character goes by (primary name first).
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(|a| a.as_str()))
    }
}
