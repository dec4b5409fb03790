//! Outcome Composer - Flavor text for resolved attempts
//!
//! Turns an `ActionAttempt` into the line of narration that accompanies its
//! roll. Template selection is mechanical: attack-like or not, with or
//! without a target, with or without an item. An attempt can carry its own
//! template, which wins over the configured set.

use serde::{Deserialize, Serialize};

use crate::domain::entities::ActionAttempt;

/// The configurable template set, one entry per narration shape.
///
/// Placeholders `{actor}`, `{target}` and `{item}` are substituted at
/// composition time. Defaults are plain English.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeTemplates {
    pub attack: String,
    pub attack_without_item: String,
    pub attack_without_target: String,
    pub attack_plain: String,
    pub general: String,
    pub general_without_item: String,
    pub general_without_target: String,
    pub general_plain: String,
    /// Used when the attempt must not reveal what happened.
    pub blind: String,
}

impl Default for OutcomeTemplates {
    fn default() -> Self {
        Self {
            attack: "{actor} attacks {target} with {item}!".to_string(),
            attack_without_item: "{actor} attacks {target}!".to_string(),
            attack_without_target: "{actor} attacks with {item}!".to_string(),
            attack_plain: "{actor} attacks!".to_string(),
            general: "{actor} uses {item} on {target}.".to_string(),
            general_without_item: "{actor} acts on {target}.".to_string(),
            general_without_target: "{actor} uses {item}.".to_string(),
            general_plain: "{actor} acts.".to_string(),
            blind: "{actor} attempts something unseen.".to_string(),
        }
    }
}

impl OutcomeTemplates {
    fn select(&self, attack_like: bool, has_target: bool, has_item: bool) -> &str {
        match (attack_like, has_target, has_item) {
            (true, true, true) => &self.attack,
            (true, true, false) => &self.attack_without_item,
            (true, false, true) => &self.attack_without_target,
            (true, false, false) => &self.attack_plain,
            (false, true, true) => &self.general,
            (false, true, false) => &self.general_without_item,
            (false, false, true) => &self.general_without_target,
            (false, false, false) => &self.general_plain,
        }
    }
}

/// Service composing attempt narration
#[derive(Debug, Clone, Default)]
pub struct OutcomeComposer {
    templates: OutcomeTemplates,
}

impl OutcomeComposer {
    pub fn new(templates: OutcomeTemplates) -> Self {
        Self { templates }
    }

    /// Compose the narration line for an attempt.
    pub fn compose_attempt(&self, attempt: &ActionAttempt) -> String {
        let (target, item) = substitution_names(attempt);
        let template = attempt.details.template.as_deref().unwrap_or_else(|| {
            self.templates
                .select(attempt.details.attack_like, target.is_some(), item.is_some())
        });
        substitute(template, &attempt.actor, target.as_deref(), item)
    }

    /// Compose the narration shown in place of a hidden attempt.
    ///
    /// Substitutes the same names as [`Self::compose_attempt`]; only the
    /// template changes.
    pub fn compose_blind(&self, attempt: &ActionAttempt) -> String {
        let (target, item) = substitution_names(attempt);
        let template = attempt
            .details
            .blind_template
            .as_deref()
            .unwrap_or(&self.templates.blind);
        substitute(template, &attempt.actor, target.as_deref(), item)
    }
}

fn substitution_names(attempt: &ActionAttempt) -> (Option<String>, Option<&str>) {
    let names: Vec<&str> = attempt
        .outcomes
        .iter()
        .map(|o| o.target.name.as_str())
        .collect();
    let target = (!names.is_empty()).then(|| join_names(&names));
    (target, attempt.item.as_deref())
}

fn substitute(template: &str, actor: &str, target: Option<&str>, item: Option<&str>) -> String {
    template
        .replace("{actor}", actor)
        .replace("{target}", target.unwrap_or(""))
        .replace("{item}", item.unwrap_or(""))
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}
