//! Interaction port - Dialogs presented to the local participant
//!
//! Every prompt is a suspension point: the service awaits the user's answer
//! and treats a dismissed dialog as a clean cancellation (`Ok(None)` or
//! `Ok(false)`), never as an error.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::value_objects::{RollMode, RollParameters};

/// Pre-filled values for a roll parameter dialog.
#[derive(Debug, Clone)]
pub struct RollPromptSeed {
    pub title: String,
    pub dice_count: u32,
    pub die_size: u32,
    /// Modifier as it should appear in the input field.
    pub modifier: String,
    pub reversed_success: bool,
    pub roll_mode: RollMode,
}

impl RollPromptSeed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dice_count: 1,
            die_size: 20,
            modifier: String::new(),
            reversed_success: false,
            roll_mode: RollMode::default(),
        }
    }

    /// Seed a dialog from existing parameters, for re-prompting.
    pub fn from_parameters(title: impl Into<String>, parameters: &RollParameters) -> Self {
        Self {
            title: title.into(),
            dice_count: parameters.dice_count,
            die_size: parameters.die_size,
            modifier: parameters.modifier.display_value(),
            reversed_success: parameters.reversed_success,
            roll_mode: parameters.roll_mode,
        }
    }
}

/// Raw text captured from a roll parameter dialog.
///
/// Fields stay as strings here; coercion to safe numbers happens in
/// [`RollParameters`] so malformed input can never abort a flow.
#[derive(Debug, Clone)]
pub struct RawRollInput {
    pub dice_count: String,
    pub die_size: String,
    pub modifier: String,
    pub roll_mode: RollMode,
}

impl RawRollInput {
    /// Echo a seed back unchanged, as an accepted dialog would.
    pub fn from_seed(seed: &RollPromptSeed) -> Self {
        Self {
            dice_count: seed.dice_count.to_string(),
            die_size: seed.die_size.to_string(),
            modifier: seed.modifier.clone(),
            roll_mode: seed.roll_mode,
        }
    }

    pub fn into_parameters(self, reversed_success: bool) -> RollParameters {
        RollParameters::new(
            self.dice_count.trim().parse().unwrap_or(1),
            self.die_size.trim().parse().unwrap_or(20),
            crate::domain::value_objects::RollModifier::parse(&self.modifier),
            reversed_success,
            self.roll_mode,
        )
    }
}

/// A yes/no confirmation dialog.
#[derive(Debug, Clone)]
pub struct ConfirmPrompt {
    pub title: String,
    pub body: String,
}

impl ConfirmPrompt {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Raw text captured from an experience grant dialog.
#[derive(Debug, Clone)]
pub struct RawXpInput {
    pub amount: String,
    pub note: String,
}

/// Port for dialog interaction with the local participant
#[async_trait]
pub trait InteractionPort: Send + Sync {
    /// Open a roll parameter dialog. `Ok(None)` means the user cancelled.
    async fn prompt_roll_parameters(&self, seed: &RollPromptSeed) -> Result<Option<RawRollInput>>;

    /// Ask a yes/no question. Dismissing the dialog counts as no.
    async fn confirm(&self, prompt: &ConfirmPrompt) -> Result<bool>;

    /// Open an experience grant dialog. `Ok(None)` means cancelled.
    async fn prompt_xp_grant(&self, title: &str) -> Result<Option<RawXpInput>>;

    /// Ask for a free-text note. `Ok(None)` means cancelled; an empty
    /// string is a deliberate blank.
    async fn prompt_note(&self, title: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::RollModifier;

    #[test]
    fn test_raw_input_coerces_malformed_numbers() {
        let raw = RawRollInput {
            dice_count: "two".to_string(),
            die_size: "".to_string(),
            modifier: "@wis".to_string(),
            roll_mode: RollMode::Public,
        };
        let params = raw.into_parameters(true);
        assert_eq!(params.dice_count, 1);
        assert_eq!(params.die_size, 20);
        assert_eq!(params.modifier, RollModifier::Attribute("@wis".to_string()));
        assert!(params.reversed_success);
    }

    #[test]
    fn test_seed_round_trips_through_raw_input() {
        let params = RollParameters::new(3, 6, RollModifier::Fixed(-1), false, RollMode::Blind);
        let seed = RollPromptSeed::from_parameters("Damage", &params);
        let echoed = RawRollInput::from_seed(&seed).into_parameters(false);
        assert_eq!(echoed, params);
    }
}
