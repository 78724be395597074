//! Extracted fact assertions and continuity conflict resolution.

mod assertion;
mod conflict;
mod log;

pub use assertion::{Confidence, FactAssertion, FactId, FactType, SubjectKind};
pub use conflict::{ConflictId, ConflictResolution, ContinuityConflict};
pub use log::FactLog;
