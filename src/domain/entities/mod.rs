//! Domain entities - Core business objects with identity

mod action;
mod class_progression;

pub use action::{ActionAttempt, ActionFollowUp, AttemptDetails, TargetOutcome};
pub use class_progression::{ClassProgression, LevelRecord, OwnerLink, XpLogEntry};
