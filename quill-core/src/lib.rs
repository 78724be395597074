//! Narrative consistency engine for long-form fiction.
//!
//! This crate provides:
//! - A read-only story model (plot beats, characters, wiki rules, chapters)
//! - Pure detectors for timeline paradoxes, location conflicts, orphaned
//!   references, rule violations, and voice deviations
//! - A shared issue lifecycle whose status annotations survive
//!   recomputation
//! - A fact log with conflict-resolution workflow
//! - An async boundary to the AI extraction collaborator
//!
//! # Quick Start
//!
//! ```
//! use quill_core::consistency::{check_story, IssueTracker, StorySnapshot};
//! use quill_core::story::PlotBeat;
//!
//! let reveal = PlotBeat::new("The Reveal", 1);
//! let hint = PlotBeat::new("The Hint", 5).with_foreshadowing(reveal.id);
//! let beats = vec![hint, reveal];
//!
//! let snapshot = StorySnapshot { beats: &beats, ..Default::default() };
//! let mut tracker = IssueTracker::new();
//!
//! let issues = check_story(&snapshot, &tracker);
//! assert_eq!(issues.len(), 1);
//!
//! // Decisions stick across recomputation.
//! tracker.ignore(&issues[0].id);
//! let issues = check_story(&snapshot, &tracker);
//! assert!(!issues[0].status.is_open());
//! ```

pub mod consistency;
pub mod extract;
pub mod facts;
pub mod story;

// Primary public API
pub use consistency::{
    check_story, Issue, IssueId, IssueKind, IssueStatus, IssueTracker, Severity, StorySnapshot,
};
pub use extract::{ExtractError, ExtractionOutcome, FactExtractor};
pub use facts::{ConflictResolution, ContinuityConflict, FactAssertion, FactLog};
pub use story::{Chapter, Character, PlotBeat, VoiceProfile, WikiEntry};
