//! Narrative data model: beats, characters, wiki entries, chapters.

mod beat;
mod chapter;
mod character;
mod wiki;

pub use beat::{BeatId, PlotBeat};
pub use chapter::{Chapter, ChapterId};
pub use character::{Character, CharacterId, VocabularyLevel, VoiceProfile};
pub use wiki::{EntryCategory, EntryId, WikiEntry};
