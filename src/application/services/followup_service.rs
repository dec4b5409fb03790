//! Follow-Up Service - Effects, table draws, and macros after an attempt
//!
//! Runs the follow-up work an action declared once its roll has resolved.
//! Follow-ups are isolated from each other: a failing one is reported
//! through the notification port and the rest still run, so a broken macro
//! cannot swallow an effect application.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::application::ports::outbound::{ContentPort, NotificationPort};
use crate::domain::entities::{ActionAttempt, ActionFollowUp};
use crate::domain::value_objects::TargetRef;

/// What the follow-up pass accomplished.
#[derive(Debug, Clone, Default)]
pub struct FollowUpSummary {
    pub effects_applied: usize,
    /// Table draw results in declaration order, for the caller to narrate.
    pub table_results: Vec<String>,
    pub macros_run: usize,
    pub failures: usize,
}

/// Service executing declared follow-ups
pub struct FollowUpService {
    content: Arc<dyn ContentPort>,
    notifications: Arc<dyn NotificationPort>,
}

impl FollowUpService {
    pub fn new(content: Arc<dyn ContentPort>, notifications: Arc<dyn NotificationPort>) -> Self {
        Self {
            content,
            notifications,
        }
    }

    /// Run every follow-up the attempt declared.
    ///
    /// Attack-like attempts apply effects to the targets they hit; anything
    /// else applies them to every target. Failures are counted, reported,
    /// and skipped over.
    #[instrument(skip(self, attempt), fields(actor = %attempt.actor))]
    pub async fn run_follow_ups(&self, attempt: &ActionAttempt) -> FollowUpSummary {
        let mut summary = FollowUpSummary::default();
        for follow_up in &attempt.details.follow_ups {
            match follow_up {
                ActionFollowUp::ApplyEffect { effect } => {
                    self.apply_effect(attempt, effect, &mut summary).await;
                }
                ActionFollowUp::DrawTable { table } => match self.content.roll_table(table).await {
                    Ok(result) => {
                        debug!("Drew from table {}", table);
                        summary.table_results.push(result);
                    }
                    Err(e) => {
                        summary.failures += 1;
                        error!("Table draw from {} failed: {}", table, e);
                        self.notifications
                            .error(&format!("Drawing from {} failed: {}", table, e));
                    }
                },
                ActionFollowUp::RunMacro { name } => {
                    let payload = match serde_json::to_value(attempt) {
                        Ok(payload) => payload,
                        Err(e) => {
                            summary.failures += 1;
                            error!("Could not serialize the attempt for macro {}: {}", name, e);
                            continue;
                        }
                    };
                    match self.content.execute_macro(name, &payload).await {
                        Ok(()) => {
                            debug!("Ran macro {}", name);
                            summary.macros_run += 1;
                        }
                        Err(e) => {
                            summary.failures += 1;
                            error!("Macro {} failed: {}", name, e);
                            self.notifications
                                .error(&format!("Macro {} failed: {}", name, e));
                        }
                    }
                }
            }
        }
        summary
    }

    async fn apply_effect(
        &self,
        attempt: &ActionAttempt,
        effect: &Value,
        summary: &mut FollowUpSummary,
    ) {
        let targets: Vec<&TargetRef> = if attempt.details.attack_like {
            attempt.hit_targets().collect()
        } else {
            attempt.outcomes.iter().map(|o| &o.target).collect()
        };
        for target in targets {
            let reference = match &target.reference {
                Some(reference) => reference,
                None => {
                    debug!("No document behind {}, skipping the effect", target.name);
                    continue;
                }
            };
            match self.content.create_effect(reference, effect).await {
                Ok(()) => summary.effects_applied += 1,
                Err(e) => {
                    summary.failures += 1;
                    error!("Applying an effect to {} failed: {}", target.name, e);
                    self.notifications
                        .error(&format!("Applying an effect to {} failed: {}", target.name, e));
                }
            }
        }
    }
}
