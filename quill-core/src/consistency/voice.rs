//! Character voice deviation matching.
//!
//! Dialogue is pulled out of chapter prose with a speaker-attribution
//! pattern (a quoted span plus "Name said/asked/..." on either side,
//! falling back to the nearest character name in a ±50-character context
//! window). Each attributed line is compared against the speaker's
//! configured vocabulary register and speech-pattern notes. Lines whose
//! speaker cannot be resolved are skipped; a missed deviation is cheaper
//! than a wrong accusation.

use super::issue::{Issue, IssueKind, Severity};
use super::text::contains_word;
use crate::story::{Chapter, Character, CharacterId, VocabularyLevel};
use lazy_static::lazy_static;

/// Context window size on each side of a quote, in characters.
const CONTEXT_WINDOW: usize = 50;

/// Minimum word count before a missing speech pattern is flagged; a
/// two-word line has no room to stutter.
const MIN_PATTERN_WORDS: usize = 4;

/// Verbs that attribute a quote to a speaker.
const SPEECH_VERBS: &[&str] = &[
    "said", "asked", "replied", "whispered", "shouted", "muttered", "answered", "exclaimed",
    "cried", "snapped", "murmured", "called", "added",
];

lazy_static! {
    static ref SLANG_TOKENS: Vec<&'static str> = vec![
        "gonna", "wanna", "gotta", "kinda", "sorta", "dunno", "ain't", "yeah", "nah", "cool",
        "dude", "y'know", "whatever", "stuff",
    ];
    static ref FORMAL_TOKENS: Vec<&'static str> = vec![
        "shall", "whom", "indeed", "moreover", "furthermore", "nevertheless", "henceforth",
        "therefore", "accordingly", "evidently", "daresay",
    ];
    static ref HESITATION_TOKENS: Vec<&'static str> =
        vec!["um", "uh", "er", "erm", "well", "i mean"];
}

/// A line of dialogue extracted from prose.
#[derive(Debug, Clone)]
pub struct DialogueLine {
    /// The quoted text, without the quote marks.
    pub quote: String,
    /// Resolved speaker, if attribution succeeded.
    pub speaker: Option<CharacterId>,
    /// Prose context around the quote.
    pub context: String,
}

/// Extract dialogue lines and attribute speakers.
pub fn extract_dialogue(content: &str, characters: &[Character]) -> Vec<DialogueLine> {
    let chars: Vec<char> = content.chars().collect();
    let mut lines = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let close = match chars[i] {
            '"' => '"',
            '\u{201C}' => '\u{201D}',
            _ => {
                i += 1;
                continue;
            }
        };
        let start = i + 1;
        let Some(offset) = chars[start..].iter().position(|&c| c == close) else {
            break;
        };
        let end = start + offset;

        let quote: String = chars[start..end].iter().collect();
        let before: String = chars[i.saturating_sub(CONTEXT_WINDOW)..i].iter().collect();
        let after_end = (end + 1 + CONTEXT_WINDOW).min(chars.len());
        let after: String = chars[(end + 1).min(chars.len())..after_end].iter().collect();

        if !quote.trim().is_empty() {
            let speaker = attribute_speaker(&before, &after, characters);
            lines.push(DialogueLine {
                quote,
                speaker,
                context: format!("{before} {after}"),
            });
        }

        i = end + 1;
    }

    lines
}

/// Resolve the speaker from the context around a quote.
///
/// Explicit attribution ("Mira said" / "said Mira", either side) wins;
/// otherwise the character name nearest the quote in the context window
/// is used. `None` means no character could be resolved.
fn attribute_speaker(before: &str, after: &str, characters: &[Character]) -> Option<CharacterId> {
    let before_lower = before.to_lowercase();
    let after_lower = after.to_lowercase();

    for character in characters {
        for name in character.all_names() {
            let name_lower = name.to_lowercase();
            for verb in SPEECH_VERBS {
                let name_verb = format!("{name_lower} {verb}");
                let verb_name = format!("{verb} {name_lower}");
                if contains_word(&before_lower, &name_verb)
                    || contains_word(&after_lower, &name_verb)
                    || contains_word(&before_lower, &verb_name)
                    || contains_word(&after_lower, &verb_name)
                {
                    return Some(character.id);
                }
            }
        }
    }

    // Fallback: nearest character name mentioned in the window.
    let mut best: Option<(usize, CharacterId)> = None;
    for character in characters {
        for name in character.all_names() {
            let name_lower = name.to_lowercase();
            if let Some(pos) = before_lower.rfind(&name_lower) {
                let distance = before_lower.len() - (pos + name_lower.len());
                if best.map_or(true, |(d, _)| distance < d) {
                    best = Some((distance, character.id));
                }
            }
            if let Some(pos) = after_lower.find(&name_lower) {
                if best.map_or(true, |(d, _)| pos < d) {
                    best = Some((pos, character.id));
                }
            }
        }
    }
    best.map(|(_, id)| id)
}

/// Scan every chapter's dialogue against its speakers' voice profiles.
pub fn detect_voice_deviations(characters: &[Character], chapters: &[Chapter]) -> Vec<Issue> {
    let mut ordered: Vec<&Chapter> = chapters.iter().collect();
    ordered.sort_by_key(|c| (c.number, c.id));

    let mut issues = Vec::new();

    for chapter in ordered {
        for line in extract_dialogue(&chapter.content, characters) {
            let Some(speaker_id) = line.speaker else {
                continue;
            };
            let Some(character) = characters.iter().find(|c| c.id == speaker_id) else {
                continue;
            };
            issues.extend(check_line(character, chapter, &line.quote));
        }
    }

    issues
}

fn check_line(character: &Character, chapter: &Chapter, quote: &str) -> Vec<Issue> {
    let quote_lower = quote.to_lowercase();
    let mut issues = Vec::new();

    match character.voice.vocabulary {
        VocabularyLevel::Formal => {
            if let Some(token) = SLANG_TOKENS.iter().find(|t| contains_word(&quote_lower, t)) {
                issues.push(deviation_issue(
                    character,
                    chapter,
                    quote,
                    format!(
                        "{} has a formal register but says \"{}\" (\"{}\")",
                        character.name, token, quote
                    ),
                ));
            }
        }
        VocabularyLevel::Casual | VocabularyLevel::Slang => {
            if let Some(token) = FORMAL_TOKENS.iter().find(|t| contains_word(&quote_lower, t)) {
                issues.push(deviation_issue(
                    character,
                    chapter,
                    quote,
                    format!(
                        "{} has a {} register but uses the formal \"{}\" (\"{}\")",
                        character.name,
                        character.voice.vocabulary.name().to_lowercase(),
                        token,
                        quote
                    ),
                ));
            }
        }
        VocabularyLevel::Neutral => {}
    }

    let patterns = character.voice.speech_patterns.to_lowercase();
    if (patterns.contains("stutter") || patterns.contains("hesita"))
        && quote_lower.split_whitespace().count() >= MIN_PATTERN_WORDS
        && !has_hesitation_markers(&quote_lower)
    {
        issues.push(deviation_issue(
            character,
            chapter,
            quote,
            format!(
                "{} is documented as stuttering or hesitating, but \"{}\" flows cleanly",
                character.name, quote
            ),
        ));
    }

    issues
}

fn deviation_issue(
    character: &Character,
    chapter: &Chapter,
    quote: &str,
    description: String,
) -> Issue {
    Issue::new(
        IssueKind::VoiceDeviation,
        Severity::Warning,
        vec![character.id.as_uuid(), chapter.id.as_uuid()],
        Some(quote),
        description,
        format!(
            "Rewrite the line to match {}'s voice profile, or update the profile",
            character.name
        ),
    )
}

/// Hesitation markers: filler tokens, ellipses, or a stutter like "w-wait".
fn has_hesitation_markers(quote_lower: &str) -> bool {
    if quote_lower.contains("...") || quote_lower.contains('\u{2026}') {
        return true;
    }
    if HESITATION_TOKENS.iter().any(|t| contains_word(quote_lower, t)) {
        return true;
    }
    has_stutter(quote_lower)
}

/// A letter, a dash, then the same letter ("w-wait", "n-n-no").
fn has_stutter(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.windows(3).any(|w| {
        w[1] == b'-' && w[0].is_ascii_alphabetic() && w[0] == w[2]
    })
}
