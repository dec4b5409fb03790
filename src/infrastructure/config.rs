//! Rules configuration
//!
//! Loaded from `WRLDBLDR_*` environment variables. Everything has a
//! default; setting a variable to something unrecognized is an error
//! rather than a silent fallback.

use std::env;

use anyhow::{bail, Context, Result};

use crate::application::services::OutcomeTemplates;
use crate::domain::value_objects::{CombatRuleSet, RulesetSelection, SavingThrowRuleSet};

/// Rules configuration loaded from environment
#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    /// Descending (THAC0) or ascending attack presentation
    pub combat_rules: CombatRuleSet,
    /// Full or abbreviated saving throw labels
    pub save_labels: SavingThrowRuleSet,
    /// Narration template set, overridable as JSON
    pub templates: OutcomeTemplates,
}

impl RulesConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let combat_rules = match env::var("WRLDBLDR_COMBAT_RULES") {
            Ok(value) => parse_combat_rules(&value)?,
            Err(_) => CombatRuleSet::default(),
        };
        let save_labels = match env::var("WRLDBLDR_SAVE_LABELS") {
            Ok(value) => parse_save_labels(&value)?,
            Err(_) => SavingThrowRuleSet::default(),
        };
        let templates = match env::var("WRLDBLDR_OUTCOME_TEMPLATES") {
            Ok(value) => serde_json::from_str(&value)
                .context("WRLDBLDR_OUTCOME_TEMPLATES must be a JSON template set")?,
            Err(_) => OutcomeTemplates::default(),
        };

        Ok(Self {
            combat_rules,
            save_labels,
            templates,
        })
    }

    pub fn ruleset_selection(&self) -> RulesetSelection {
        RulesetSelection::new(self.combat_rules, self.save_labels)
    }
}

fn parse_combat_rules(value: &str) -> Result<CombatRuleSet> {
    match value.trim().to_ascii_lowercase().as_str() {
        "descending" | "thac0" => Ok(CombatRuleSet::Descending),
        "ascending" | "bonus" => Ok(CombatRuleSet::Ascending),
        other => bail!(
            "WRLDBLDR_COMBAT_RULES must be descending or ascending, got {:?}",
            other
        ),
    }
}

fn parse_save_labels(value: &str) -> Result<SavingThrowRuleSet> {
    match value.trim().to_ascii_lowercase().as_str() {
        "standard" | "full" => Ok(SavingThrowRuleSet::Standard),
        "abbreviated" | "short" => Ok(SavingThrowRuleSet::Abbreviated),
        other => bail!(
            "WRLDBLDR_SAVE_LABELS must be standard or abbreviated, got {:?}",
            other
        ),
    }
}
