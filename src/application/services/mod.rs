//! Application services - Use case implementations
//!
//! Each service implements one table-facing workflow over the outbound
//! ports: brokering rolls between participants, advancing class
//! progressions, narrating attempts, and running their follow-ups.

pub mod followup_service;
pub mod outcome_composer;
pub mod progression_service;
pub mod roll_request_service;

// Re-export roll request service types
pub use roll_request_service::{
    RollRequestError, RollRequestOptions, RollRequestOutcome, RollRequestService,
};

// Re-export progression service types
pub use progression_service::{
    LevelUpPlan, LevelUpReport, ProgressionService, ReportLine, XpGrant,
};

// Re-export composer types
pub use outcome_composer::{OutcomeComposer, OutcomeTemplates};

// Re-export follow-up service types
pub use followup_service::{FollowUpService, FollowUpSummary};
