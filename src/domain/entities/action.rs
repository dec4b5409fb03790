//! Action attempt entity - a resolved action awaiting narration and follow-ups

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TargetRef;

/// Outcome of an action against a single target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: TargetRef,
    pub hit: bool,
    /// Evaluated roll total, when the action was rolled.
    pub total: Option<i32>,
}

impl TargetOutcome {
    pub fn hit(target: TargetRef) -> Self {
        Self {
            target,
            hit: true,
            total: None,
        }
    }

    pub fn miss(target: TargetRef) -> Self {
        Self {
            target,
            hit: false,
            total: None,
        }
    }

    pub fn with_total(mut self, total: i32) -> Self {
        self.total = Some(total);
        self
    }
}

/// Follow-up work declared by an action, executed after evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionFollowUp {
    /// Apply a host-defined effect document to targets that were hit.
    ApplyEffect { effect: serde_json::Value },
    /// Draw from a host roll table and fold the result into the outcome.
    DrawTable { table: String },
    /// Run a host macro by name.
    RunMacro { name: String },
}

/// Presentation and follow-up details of an attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttemptDetails {
    /// Flavor template carried by the action itself, overriding the
    /// configured set.
    pub template: Option<String>,
    /// Template used when the attempt must stay hidden from its audience.
    pub blind_template: Option<String>,
    /// Attack-like attempts narrate differently and gate effects on hits.
    pub attack_like: bool,
    pub follow_ups: Vec<ActionFollowUp>,
}

/// A player action that has been resolved against its targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionAttempt {
    pub actor: String,
    pub item: Option<String>,
    pub outcomes: Vec<TargetOutcome>,
    pub details: AttemptDetails,
}

impl ActionAttempt {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            item: None,
            outcomes: Vec::new(),
            details: AttemptDetails::default(),
        }
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn with_outcome(mut self, outcome: TargetOutcome) -> Self {
        self.outcomes.push(outcome);
        self
    }

    pub fn with_details(mut self, details: AttemptDetails) -> Self {
        self.details = details;
        self
    }

    pub fn as_attack(mut self) -> Self {
        self.details.attack_like = true;
        self
    }

    pub fn first_target(&self) -> Option<&TargetRef> {
        self.outcomes.first().map(|o| &o.target)
    }

    /// Targets the attempt actually connected with.
    pub fn hit_targets(&self) -> impl Iterator<Item = &TargetRef> {
        self.outcomes.iter().filter(|o| o.hit).map(|o| &o.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_target() {
        let attempt = ActionAttempt::new("Ilsa")
            .with_outcome(TargetOutcome::hit(TargetRef::new("Goblin")))
            .with_outcome(TargetOutcome::miss(TargetRef::new("Orc")));
        assert_eq!(attempt.first_target().unwrap().name, "Goblin");
    }

    #[test]
    fn test_hit_targets_filters_misses() {
        let attempt = ActionAttempt::new("Ilsa")
            .with_outcome(TargetOutcome::hit(TargetRef::new("Goblin")))
            .with_outcome(TargetOutcome::miss(TargetRef::new("Orc")))
            .with_outcome(TargetOutcome::hit(TargetRef::new("Troll")));
        let names: Vec<_> = attempt.hit_targets().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Goblin", "Troll"]);
    }
}
