//! Rule-based prose violation matching.
//!
//! A rule entry's free-text description is parsed against a fixed,
//! enumerable template table ("X requires Y", "X must have Y", "only X
//! can Y", "X cannot Y", "X never Y"), producing an [`ExtractedRule`]:
//! a trigger keyword set plus either a set of terms whose *absence*
//! signals a violation, or a set whose *co-occurrence* does. Recognized
//! domain vocabularies (casting verbs for magic, and friends) expand the
//! extracted terms into synonym sets to raise recall.
//!
//! The whole thing is an intentional heuristic: false positives and
//! negatives are expected, and the output is a suggestion list for human
//! review. Unparseable descriptions extract no rule and flag nothing.

use super::issue::{Issue, IssueKind, Severity};
use super::text::{contains_word, split_sentences, tokenize};
use crate::story::{Chapter, WikiEntry};
use lazy_static::lazy_static;

/// One row of the template table: a name for test output plus the
/// extraction function that recognizes the template in a description.
pub struct RuleTemplate {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<ExtractedRule>,
}

/// The template table, tried in order. Prohibition templates come first
/// so "magic can never be cast indoors" does not mis-parse as "can".
pub static RULE_TEMPLATES: &[RuleTemplate] = &[
    RuleTemplate {
        name: "x cannot y",
        extract: extract_cannot,
    },
    RuleTemplate {
        name: "x never y",
        extract: extract_never,
    },
    RuleTemplate {
        name: "only x can y",
        extract: extract_only_can,
    },
    RuleTemplate {
        name: "x requires y",
        extract: extract_requires,
    },
    RuleTemplate {
        name: "x must have y",
        extract: extract_must_have,
    },
];

/// A rule compiled from a description, ready to scan prose.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedRule {
    /// Violation = a trigger term present, domain co-occurrence satisfied,
    /// and every required term absent. ("magic requires hand gestures")
    RequiredMarkers {
        triggers: Vec<String>,
        required: Vec<String>,
    },
    /// Violation = a subject term and a forbidden term in one sentence.
    /// ("the dead cannot speak")
    ForbiddenPair {
        subjects: Vec<String>,
        forbidden: Vec<String>,
    },
}

/// Compile a rule description via the template table. `None` means no
/// template matched; the rule is skipped (fail soft).
pub fn extract_rule(description: &str) -> Option<ExtractedRule> {
    let lowered = description.to_lowercase();
    RULE_TEMPLATES
        .iter()
        .find_map(|template| (template.extract)(&lowered))
}

/// Scan every chapter against every rule entry.
pub fn detect_rule_violations(entries: &[WikiEntry], chapters: &[Chapter]) -> Vec<Issue> {
    let mut rules: Vec<&WikiEntry> = entries.iter().filter(|e| e.is_rule()).collect();
    rules.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    let mut ordered_chapters: Vec<&Chapter> = chapters.iter().collect();
    ordered_chapters.sort_by_key(|c| (c.number, c.id));

    let mut issues = Vec::new();

    for entry in rules {
        let Some(rule) = extract_rule(&entry.description) else {
            continue;
        };
        for chapter in &ordered_chapters {
            for sentence in split_sentences(&chapter.content) {
                if sentence_violates(&rule, &sentence.to_lowercase()) {
                    issues.push(violation_issue(entry, chapter, sentence));
                }
            }
        }
    }

    issues
}

/// Test one lowercase sentence against a compiled rule.
pub fn sentence_violates(rule: &ExtractedRule, sentence: &str) -> bool {
    match rule {
        ExtractedRule::RequiredMarkers { triggers, required } => {
            if !triggers.iter().any(|t| contains_word(sentence, t)) {
                return false;
            }
            // Domain co-occurrence: when the triggers belong to a known
            // domain, an action verb from that domain must also appear,
            // so a bare mention ("magic was forbidden here") is not
            // treated as the rule's activity happening.
            if let Some(domain) = domain_of(triggers) {
                if !domain.actions.iter().any(|a| contains_word(sentence, a)) {
                    return false;
                }
            }
            !required.iter().any(|r| contains_word(sentence, r))
        }
        ExtractedRule::ForbiddenPair { subjects, forbidden } => {
            subjects.iter().any(|s| contains_word(sentence, s))
                && forbidden.iter().any(|f| contains_word(sentence, f))
        }
    }
}

fn violation_issue(entry: &WikiEntry, chapter: &Chapter, sentence: &str) -> Issue {
    Issue::new(
        IssueKind::RuleViolation,
        Severity::Warning,
        vec![entry.id.as_uuid(), chapter.id.as_uuid()],
        Some(sentence),
        format!(
            "\"{}\" in chapter {} may break the rule \"{}\" ({})",
            sentence, chapter.number, entry.name, entry.description
        ),
        format!(
            "Revise the sentence to honor \"{}\", or update the rule entry",
            entry.name
        ),
    )
}

// ============================================================================
// Template extraction functions
// ============================================================================

fn extract_requires(description: &str) -> Option<ExtractedRule> {
    split_on(description, " requires ").map(|(lhs, rhs)| ExtractedRule::RequiredMarkers {
        triggers: expand_phrase(lhs),
        required: expand_phrase(rhs),
    })
}

fn extract_must_have(description: &str) -> Option<ExtractedRule> {
    split_on(description, " must have ").map(|(lhs, rhs)| ExtractedRule::RequiredMarkers {
        triggers: expand_phrase(lhs),
        required: expand_phrase(rhs),
    })
}

fn extract_only_can(description: &str) -> Option<ExtractedRule> {
    let rest = description.trim().strip_prefix("only ")?;
    let (actors, action) = rest.split_once(" can ")?;
    // The licensed actors become the required markers: the action
    // happening without any of them named is the violation.
    Some(ExtractedRule::RequiredMarkers {
        triggers: expand_phrase(action),
        required: expand_phrase(actors),
    })
}

fn extract_cannot(description: &str) -> Option<ExtractedRule> {
    let (lhs, rhs) = split_on(description, " cannot ").or_else(|| split_on(description, " can't "))?;
    Some(ExtractedRule::ForbiddenPair {
        subjects: expand_phrase(lhs),
        forbidden: expand_phrase(rhs),
    })
}

fn extract_never(description: &str) -> Option<ExtractedRule> {
    let (lhs, rhs) = split_on(description, " can never ")
        .or_else(|| split_on(description, " never "))?;
    Some(ExtractedRule::ForbiddenPair {
        subjects: expand_phrase(lhs),
        forbidden: expand_phrase(rhs),
    })
}

fn split_on<'a>(text: &'a str, connective: &str) -> Option<(&'a str, &'a str)> {
    let (lhs, rhs) = text.split_once(connective)?;
    let lhs = lhs.trim();
    let rhs = rhs.trim().trim_end_matches(['.', '!']);
    if lhs.is_empty() || rhs.is_empty() {
        None
    } else {
        Some((lhs, rhs))
    }
}

// ============================================================================
// Domain vocabularies and synonym expansion
// ============================================================================

/// A recognized domain: nouns that name it and verbs that mean it is
/// being performed.
pub struct DomainVocabulary {
    pub name: &'static str,
    pub terms: &'static [&'static str],
    pub actions: &'static [&'static str],
}

pub static DOMAINS: &[DomainVocabulary] = &[
    DomainVocabulary {
        name: "magic",
        terms: &[
            "magic", "magical", "spell", "spells", "sorcery", "enchantment", "incantation",
            "hex", "charm", "arcane", "ritual",
        ],
        actions: &[
            "cast", "casting", "conjure", "conjured", "conjuring", "summon", "summoned",
            "summoning", "invoke", "invoked", "enchant", "enchanted", "bewitch", "bewitched",
            "chant", "chanted",
        ],
    },
    DomainVocabulary {
        name: "combat",
        terms: &[
            "combat", "fight", "duel", "battle", "blade", "sword", "swords", "weapon",
            "weapons",
        ],
        actions: &[
            "fought", "struck", "strike", "stabbed", "slashed", "parried", "swung",
            "attacked", "wounded",
        ],
    },
];

lazy_static! {
    /// General-purpose synonym groups. A term expands to its whole group.
    static ref SYNONYM_GROUPS: Vec<Vec<&'static str>> = vec![
        vec![
            "gesture", "gestures", "gestured", "hand", "hands", "wave", "waved", "waving",
            "motion", "motioned", "sign",
        ],
        vec!["speak", "speaks", "spoke", "spoken", "speech", "talk", "talked", "say", "said"],
        vec!["royalty", "king", "queen", "prince", "princess", "crown", "royal"],
        vec!["night", "nightfall", "dark", "darkness", "midnight"],
        vec!["iron", "cold iron", "wrought iron"],
    ];
}

/// Find the domain a trigger set belongs to, if any.
fn domain_of(triggers: &[String]) -> Option<&'static DomainVocabulary> {
    DOMAINS.iter().find(|domain| {
        triggers
            .iter()
            .any(|t| domain.terms.contains(&t.as_str()) || domain.actions.contains(&t.as_str()))
    })
}

/// Expand a template-captured phrase into a keyword set: content words,
/// their synonym groups, and their domain vocabularies.
pub fn expand_phrase(phrase: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in tokenize(phrase) {
        if STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        push_unique(&mut terms, word.clone());

        for group in SYNONYM_GROUPS.iter() {
            if group.contains(&word.as_str()) {
                for synonym in group {
                    push_unique(&mut terms, synonym.to_string());
                }
            }
        }
        for domain in DOMAINS {
            if domain.terms.contains(&word.as_str()) {
                for term in domain.terms.iter().chain(domain.actions) {
                    push_unique(&mut terms, term.to_string());
                }
            }
        }
    }
    terms
}

fn push_unique(terms: &mut Vec<String>, term: String) {
    if !terms.contains(&term) {
        terms.push(term);
    }
}

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "any", "all", "some", "to", "of", "in", "on", "at", "by", "be", "is",
    "are", "was", "were", "being", "been", "it", "its", "their", "them", "who", "that", "which",
    "with", "without", "for", "and", "or", "use", "using", "used", "one", "ones", "person",
    "people",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Chapter, WikiEntry};

    #[test]
    fn test_requires_template() {
        let rule = extract_rule("Magic requires hand gestures").unwrap();
        match &rule {
            ExtractedRule::RequiredMarkers { triggers, required } => {
                assert!(triggers.contains(&"magic".to_string()));
                assert!(triggers.contains(&"cast".to_string()));
                assert!(required.contains(&"hand".to_string()));
                assert!(required.contains(&"waving".to_string()));
            }
            other => panic!("wrong rule form: {other:?}"),
        }
    }

    #[test]
    fn test_must_have_template() {
        let rule = extract_rule("Sorcery must have a spoken incantation").unwrap();
        assert!(matches!(rule, ExtractedRule::RequiredMarkers { .. }));
    }

    #[test]
    fn test_only_can_template() {
        let rule = extract_rule("Only royalty can wield the crownblade").unwrap();
        match &rule {
            ExtractedRule::RequiredMarkers { triggers, required } => {
                assert!(triggers.contains(&"crownblade".to_string()));
                assert!(required.contains(&"queen".to_string()));
            }
            other => panic!("wrong rule form: {other:?}"),
        }
    }

    #[test]
    fn test_cannot_template() {
        let rule = extract_rule("The dead cannot speak").unwrap();
        match &rule {
            ExtractedRule::ForbiddenPair { subjects, forbidden } => {
                assert!(subjects.contains(&"dead".to_string()));
                assert!(forbidden.contains(&"spoke".to_string()));
            }
            other => panic!("wrong rule form: {other:?}"),
        }
    }

    #[test]
    fn test_never_template() {
        let rule = extract_rule("Dragons never lie").unwrap();
        assert!(matches!(rule, ExtractedRule::ForbiddenPair { .. }));
    }

    #[test]
    fn test_unparseable_description_extracts_nothing() {
        assert!(extract_rule("The weather here is usually mild").is_none());
        assert!(extract_rule("").is_none());
    }

    #[test]
    fn test_template_table_is_enumerable() {
        assert_eq!(RULE_TEMPLATES.len(), 5);
        let mut names: Vec<_> = RULE_TEMPLATES.iter().map(|t| t.name).collect();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_each_template_is_independently_callable() {
        // The table rows are plain functions; exercise them directly.
        assert!(extract_requires("magic requires gestures").is_some());
        assert!(extract_requires("magic forbids gestures").is_none());
        assert!(extract_only_can("only royalty can rule").is_some());
        assert!(extract_only_can("royalty can rule").is_none());
        assert!(extract_cannot("the dead cannot speak").is_some());
        assert!(extract_never("dragons never lie").is_some());
    }

    #[test]
    fn test_violation_without_required_marker() {
        let rule = WikiEntry::rule("Gesture Law", "Magic requires hand gestures");
        let chapter = Chapter::new("One", 1, "She cast a spell instantly.");

        let issues = detect_rule_violations(&[rule], &[chapter]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::RuleViolation);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert!(issues[0].description.contains("She cast a spell instantly"));
        assert!(issues[0].description.contains("Gesture Law"));
    }

    #[test]
    fn test_no_violation_with_required_marker() {
        let rule = WikiEntry::rule("Gesture Law", "Magic requires hand gestures");
        let chapter = Chapter::new("One", 1, "She cast a spell, waving her hand.");

        assert!(detect_rule_violations(&[rule], &[chapter]).is_empty());
    }

    #[test]
    fn test_bare_mention_is_not_a_violation() {
        // "magic" appears but no casting verb, so the rule's activity is
        // not happening in this sentence.
        let rule = WikiEntry::rule("Gesture Law", "Magic requires hand gestures");
        let chapter = Chapter::new("One", 1, "Magic had been outlawed for a century.");

        assert!(detect_rule_violations(&[rule], &[chapter]).is_empty());
    }

    #[test]
    fn test_forbidden_pair_violation() {
        let rule = WikiEntry::rule("Silence of the Dead", "The dead cannot speak");
        let chapter = Chapter::new("Two", 2, "The dead man spoke slowly from the bier.");

        let issues = detect_rule_violations(&[rule], &[chapter]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_non_rule_entries_are_ignored() {
        let lore = WikiEntry::new(
            "History",
            crate::story::EntryCategory::Lore,
            "Magic requires hand gestures",
        );
        let chapter = Chapter::new("One", 1, "She cast a spell instantly.");

        assert!(detect_rule_violations(&[lore], &[chapter]).is_empty());
    }

    #[test]
    fn test_one_issue_per_offending_sentence() {
        let rule = WikiEntry::rule("Gesture Law", "Magic requires hand gestures");
        let chapter = Chapter::new(
            "One",
            1,
            "She cast a spell instantly. Later she conjured fire again.",
        );

        let issues = detect_rule_violations(&[rule], &[chapter]);
        assert_eq!(issues.len(), 2);
        assert_ne!(issues[0].id, issues[1].id);
    }
}
