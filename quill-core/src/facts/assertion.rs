//! Fact assertions extracted from the manuscript.

use crate::story::ChapterId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a fact assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactId(Uuid);

impl FactId {
    /// Create a new unique fact ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of story subject a fact is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    Character,
    Location,
    Item,
    Event,
    Other,
}

impl SubjectKind {
    /// Get the display name for this subject kind.
    pub fn name(&self) -> &'static str {
        match self {
            SubjectKind::Character => "Character",
            SubjectKind::Location => "Location",
            SubjectKind::Item => "Item",
            SubjectKind::Event => "Event",
            SubjectKind::Other => "Other",
        }
    }
}

/// Categories of fact assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactType {
    /// Physical appearance or attributes.
    Physical,
    /// What a subject knows.
    Knowledge,
    /// Where a subject is or was.
    Location,
    /// Connection between subjects.
    Relationship,
    /// When something happened.
    Temporal,
    /// What a subject owns or carries.
    Possession,
    /// Current state or condition.
    State,
}

impl FactType {
    /// Get the display name for this fact type.
    pub fn name(&self) -> &'static str {
        match self {
            FactType::Physical => "Physical",
            FactType::Knowledge => "Knowledge",
            FactType::Location => "Location",
            FactType::Relationship => "Relationship",
            FactType::Temporal => "Temporal",
            FactType::Possession => "Possession",
            FactType::State => "State",
        }
    }
}

/// How confident the extraction collaborator was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Stated outright in the prose.
    Explicit,
    /// Read between the lines.
    Inferred,
}

/// An atomic extracted claim about a story subject.
///
/// Assertions are created by the external extraction collaborator and
/// are immutable once created; resolution of conflicts never rewrites
/// the underlying facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactAssertion {
    /// Unique identifier.
    pub id: FactId,
    /// The subject this fact is about.
    pub subject_id: Uuid,
    /// What kind of subject it is.
    pub subject_type: SubjectKind,
    /// Category of the fact.
    pub fact_type: FactType,
    /// The claim in natural language.
    pub assertion: String,
    /// Supporting quote from the manuscript.
    pub quote: String,
    /// Chapter the fact was extracted from.
    pub source_chapter: ChapterId,
    /// Extraction confidence.
    pub confidence: Confidence,
}

impl FactAssertion {
    /// Create a new fact assertion.
    pub fn new(
        subject_id: Uuid,
        subject_type: SubjectKind,
        fact_type: FactType,
        assertion: impl Into<String>,
        quote: impl Into<String>,
        source_chapter: ChapterId,
        confidence: Confidence,
    ) -> Self {
        Self {
            id: FactId::new(),
            subject_id,
            subject_type,
            fact_type,
            assertion: assertion.into(),
            quote: quote.into(),
            source_chapter,
            confidence,
        }
    }
}
