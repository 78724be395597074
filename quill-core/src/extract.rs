//! The external AI extraction collaborator.
//!
//! The engine never analyzes prose semantically itself; fact extraction,
//! conflict detection, and passage rewriting are delegated to Claude.
//! The core's only obligations at this boundary are prompt construction
//! and fail-soft parsing: a reply that does not parse as JSON is returned
//! as raw text, a usable deliverable rather than an error.

use crate::consistency::Severity;
use crate::facts::{Confidence, ContinuityConflict, FactAssertion, FactId, FactType, SubjectKind};
use crate::story::{Chapter, Character};
use claude::{Claude, Message, Request};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// Default model for extraction (fast and cheap).
const EXTRACTION_MODEL: &str = "claude-3-5-haiku-20241022";

/// Maximum tokens for extraction responses.
const EXTRACTION_MAX_TOKENS: usize = 2000;

/// Errors from the collaborator boundary. Parse failures are not errors;
/// only transport and configuration problems surface here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("API error: {0:?}")]
    Api(#[from] claude::Error),
}

/// What came back from the collaborator: the structured payload we asked
/// for, or the raw text when parsing failed.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome<T> {
    Structured(T),
    Text(String),
}

impl<T> ExtractionOutcome<T> {
    /// The structured payload, if parsing succeeded.
    pub fn structured(self) -> Option<T> {
        match self {
            ExtractionOutcome::Structured(value) => Some(value),
            ExtractionOutcome::Text(_) => None,
        }
    }
}

/// Client for the fact-extraction and conflict-analysis collaborator.
pub struct FactExtractor {
    client: Claude,
    model: String,
}

impl FactExtractor {
    /// Create a new extractor with the given API client.
    pub fn new(client: Claude) -> Self {
        Self {
            client,
            model: EXTRACTION_MODEL.to_string(),
        }
    }

    /// Create from environment (ANTHROPIC_API_KEY).
    pub fn from_env() -> Result<Self, claude::Error> {
        let client = Claude::from_env()?;
        Ok(Self::new(client))
    }

    /// Set a custom model for extraction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Extract fact assertions from a chapter.
    pub async fn extract_facts(
        &self,
        chapter: &Chapter,
        characters: &[Character],
    ) -> Result<ExtractionOutcome<Vec<FactAssertion>>, ExtractError> {
        let prompt = build_extraction_prompt(chapter, characters);
        let request = Request::new(vec![Message::user(&prompt)])
            .with_model(&self.model)
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_temperature(0.0);

        let response = self.client.complete(request).await?;
        Ok(parse_facts_response(&response.text(), chapter, characters))
    }

    /// Ask the collaborator which of the given facts contradict each other.
    pub async fn detect_conflicts(
        &self,
        facts: &[FactAssertion],
    ) -> Result<ExtractionOutcome<Vec<ContinuityConflict>>, ExtractError> {
        let prompt = build_conflict_prompt(facts);
        let request = Request::new(vec![Message::user(&prompt)])
            .with_model(&self.model)
            .with_max_tokens(EXTRACTION_MAX_TOKENS)
            .with_temperature(0.0);

        let response = self.client.complete(request).await?;
        Ok(parse_conflicts_response(&response.text(), facts))
    }

    /// Ask for a rewritten passage. The deliverable is raw text.
    pub async fn rewrite_passage(
        &self,
        passage: &str,
        instruction: &str,
    ) -> Result<String, ExtractError> {
        let prompt = format!(
            "Rewrite the following passage. {instruction}\n\n\
             Respond with only the rewritten passage, no commentary.\n\n{passage}"
        );
        let request = Request::new(vec![Message::user(&prompt)])
            .with_model(&self.model)
            .with_max_tokens(EXTRACTION_MAX_TOKENS);

        let response = self.client.complete(request).await?;
        Ok(response.text())
    }
}

// ============================================================================
// Prompt construction
// ============================================================================

fn build_extraction_prompt(chapter: &Chapter, characters: &[Character]) -> String {
    let known_names = characters
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are extracting factual assertions from a chapter of a novel for a continuity tracker.

## Known Characters
{known_names}

## Chapter {number}: {title}
{content}

## Instructions
List atomic factual claims about characters, places, and objects. For each, give:
- "subject": the subject's name (use a Known Character name when it applies)
- "fact_type": one of physical, knowledge, location, relationship, temporal, possession, state
- "assertion": the claim in one sentence
- "quote": the supporting passage, verbatim
- "confidence": "explicit" if stated outright, "inferred" if read between the lines

Respond with ONLY a JSON object (no markdown, no explanation outside the JSON):
{{"facts": [{{"subject": "...", "fact_type": "...", "assertion": "...", "quote": "...", "confidence": "..."}}]}}"#,
        number = chapter.number,
        title = chapter.title,
        content = chapter.content,
    )
}

fn build_conflict_prompt(facts: &[FactAssertion]) -> String {
    let mut listing = String::new();
    for fact in facts {
        listing.push_str(&format!(
            "- [{}] ({}) {}\n",
            fact.id,
            fact.fact_type.name(),
            fact.assertion
        ));
    }

    format!(
        r#"You are checking a novel's extracted facts for continuity contradictions.

## Facts
{listing}
## Instructions
Find pairs or groups of facts that contradict each other. Reference facts by the id in brackets. Severity is "error" for hard contradictions and "warning" for tensions worth a look.

Respond with ONLY a JSON object (no markdown, no explanation outside the JSON):
{{"conflicts": [{{"fact_ids": ["id1", "id2"], "severity": "error", "description": "..."}}]}}

If there are no contradictions, return an empty array."#
    )
}

// ============================================================================
// Fail-soft response parsing
// ============================================================================

#[derive(Debug, Deserialize)]
struct FactsResponse {
    #[serde(default)]
    facts: Vec<WireFact>,
}

#[derive(Debug, Deserialize)]
struct WireFact {
    subject: String,
    #[serde(default)]
    fact_type: String,
    assertion: String,
    #[serde(default)]
    quote: String,
    #[serde(default)]
    confidence: String,
}

#[derive(Debug, Deserialize)]
struct ConflictsResponse {
    #[serde(default)]
    conflicts: Vec<WireConflict>,
}

#[derive(Debug, Deserialize)]
struct WireConflict {
    #[serde(default)]
    fact_ids: Vec<String>,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    description: String,
}

/// Parse a fact-extraction reply. Unknown subjects become `Other` with a
/// name-derived id; facts with unrecognized types are dropped.
fn parse_facts_response(
    text: &str,
    chapter: &Chapter,
    characters: &[Character],
) -> ExtractionOutcome<Vec<FactAssertion>> {
    let json = extract_json(text);
    let Ok(parsed) = serde_json::from_str::<FactsResponse>(json) else {
        return ExtractionOutcome::Text(text.to_string());
    };

    let facts = parsed
        .facts
        .into_iter()
        .filter_map(|wire| {
            let fact_type = parse_fact_type(&wire.fact_type)?;
            let (subject_id, subject_type) = resolve_subject(&wire.subject, characters);
            let confidence = if wire.confidence.eq_ignore_ascii_case("explicit") {
                Confidence::Explicit
            } else {
                Confidence::Inferred
            };
            Some(FactAssertion::new(
                subject_id,
                subject_type,
                fact_type,
                wire.assertion,
                wire.quote,
                chapter.id,
                confidence,
            ))
        })
        .collect();

    ExtractionOutcome::Structured(facts)
}

/// Parse a conflict-analysis reply. Conflicts that resolve fewer than two
/// known fact ids are dropped.
fn parse_conflicts_response(
    text: &str,
    facts: &[FactAssertion],
) -> ExtractionOutcome<Vec<ContinuityConflict>> {
    let json = extract_json(text);
    let Ok(parsed) = serde_json::from_str::<ConflictsResponse>(json) else {
        return ExtractionOutcome::Text(text.to_string());
    };

    let conflicts = parsed
        .conflicts
        .into_iter()
        .filter_map(|wire| {
            let fact_ids: Vec<FactId> = wire
                .fact_ids
                .iter()
                .filter_map(|id_str| {
                    facts
                        .iter()
                        .find(|f| f.id.to_string() == *id_str)
                        .map(|f| f.id)
                })
                .collect();
            if fact_ids.len() < 2 {
                return None;
            }
            let severity = if wire.severity.eq_ignore_ascii_case("error") {
                Severity::Error
            } else {
                Severity::Warning
            };
            Some(ContinuityConflict::new(fact_ids, severity, wire.description))
        })
        .collect();

    ExtractionOutcome::Structured(conflicts)
}

fn parse_fact_type(raw: &str) -> Option<FactType> {
    match raw.to_lowercase().as_str() {
        "physical" => Some(FactType::Physical),
        "knowledge" => Some(FactType::Knowledge),
        "location" => Some(FactType::Location),
        "relationship" => Some(FactType::Relationship),
        "temporal" => Some(FactType::Temporal),
        "possession" => Some(FactType::Possession),
        "state" => Some(FactType::State),
        _ => None,
    }
}

/// Resolve a subject name against known characters. Unknown subjects get
/// a deterministic name-derived id so repeated extractions agree.
fn resolve_subject(name: &str, characters: &[Character]) -> (Uuid, SubjectKind) {
    if let Some(character) = characters.iter().find(|c| c.matches_name(name)) {
        return (character.id.as_uuid(), SubjectKind::Character);
    }
    let derived = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.to_lowercase().as_bytes());
    (derived, SubjectKind::Other)
}

/// Extract JSON from a response that might have markdown code blocks.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Chapter, Character};

    fn sample_chapter() -> Chapter {
        Chapter::new("The Crossing", 4, "Mira crossed the river at dawn.")
    }

    #[test]
    fn test_extract_json_plain() {
        let text = r#"{"facts": []}"#;
        assert_eq!(extract_json(text), text);
    }

    #[test]
    fn test_extract_json_markdown() {
        let text = "```json\n{\"facts\": []}\n```";
        assert_eq!(extract_json(text), r#"{"facts": []}"#);
    }

    #[test]
    fn test_extract_json_markdown_no_specifier() {
        let text = "```\n{\"conflicts\": []}\n```";
        assert_eq!(extract_json(text), r#"{"conflicts": []}"#);
    }

    #[test]
    fn test_parse_facts_resolves_subjects() {
        let mira = Character::new("Mira");
        let chapter = sample_chapter();
        let reply = r#"{"facts": [
            {"subject": "Mira", "fact_type": "location", "assertion": "Mira crossed the river", "quote": "Mira crossed the river at dawn.", "confidence": "explicit"},
            {"subject": "The Old Mill", "fact_type": "state", "assertion": "The mill is abandoned", "confidence": "inferred"}
        ]}"#;

        let facts = parse_facts_response(reply, &chapter, std::slice::from_ref(&mira))
            .structured()
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].subject_id, mira.id.as_uuid());
        assert_eq!(facts[0].subject_type, SubjectKind::Character);
        assert_eq!(facts[0].confidence, Confidence::Explicit);
        assert_eq!(facts[1].subject_type, SubjectKind::Other);
        assert_eq!(facts[1].confidence, Confidence::Inferred);
        assert_eq!(facts[1].source_chapter, chapter.id);
    }

    #[test]
    fn test_unknown_subject_id_is_deterministic() {
        let chapter = sample_chapter();
        let reply = r#"{"facts": [{"subject": "The Old Mill", "fact_type": "state", "assertion": "abandoned"}]}"#;

        let first = parse_facts_response(reply, &chapter, &[]).structured().unwrap();
        let second = parse_facts_response(reply, &chapter, &[]).structured().unwrap();
        assert_eq!(first[0].subject_id, second[0].subject_id);
    }

    #[test]
    fn test_unrecognized_fact_type_is_dropped() {
        let chapter = sample_chapter();
        let reply = r#"{"facts": [{"subject": "Mira", "fact_type": "astrological", "assertion": "born under Mars"}]}"#;

        let facts = parse_facts_response(reply, &chapter, &[]).structured().unwrap();
        assert!(facts.is_empty());
    }

    #[test]
    fn test_unparseable_reply_falls_back_to_text() {
        let chapter = sample_chapter();
        let reply = "I could not find any facts in this chapter, sorry.";

        match parse_facts_response(reply, &chapter, &[]) {
            ExtractionOutcome::Text(text) => assert!(text.contains("sorry")),
            other => panic!("expected text fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_conflicts_resolves_ids() {
        let chapter = sample_chapter();
        let subject = Uuid::new_v4();
        let green = FactAssertion::new(
            subject,
            SubjectKind::Character,
            FactType::Physical,
            "green eyes",
            "",
            chapter.id,
            Confidence::Explicit,
        );
        let brown = FactAssertion::new(
            subject,
            SubjectKind::Character,
            FactType::Physical,
            "brown eyes",
            "",
            chapter.id,
            Confidence::Explicit,
        );
        let reply = format!(
            r#"{{"conflicts": [{{"fact_ids": ["{}", "{}"], "severity": "error", "description": "eye color"}}]}}"#,
            green.id, brown.id
        );

        let conflicts = parse_conflicts_response(&reply, &[green.clone(), brown.clone()])
            .structured()
            .unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].fact_ids, vec![green.id, brown.id]);
        assert_eq!(conflicts[0].severity, Severity::Error);
    }

    #[test]
    fn test_conflict_with_unknown_ids_is_dropped() {
        let reply = r#"{"conflicts": [{"fact_ids": ["nope", "also-nope"], "severity": "error", "description": "x"}]}"#;
        let conflicts = parse_conflicts_response(reply, &[]).structured().unwrap();
        assert!(conflicts.is_empty());
    }
}
