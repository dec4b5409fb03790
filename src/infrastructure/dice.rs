//! Dice evaluation adapters
//!
//! `ThreadRngDiceRoller` evaluates plain `NdS` formulas with the process
//! RNG, for hosts without a native dice engine. `ScriptedDiceRoller`
//! replays a fixed sequence of totals for deterministic flows.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use tracing::warn;

use crate::application::ports::outbound::{DiceRollerPort, DocumentPort, RollEvaluation};
use crate::domain::value_objects::DocumentRef;

const MAX_DICE: u32 = 10_000;

enum FormulaModifier {
    None,
    Fixed(i32),
    Attribute(String),
}

struct ParsedFormula {
    count: u32,
    size: i32,
    modifier: FormulaModifier,
}

impl ParsedFormula {
    /// Parse `NdS`, `NdS + k`, `NdS - k`, or `NdS+@path`.
    fn parse(formula: &str) -> Result<Self> {
        let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
        let (count_str, rest) = match compact.split_once(['d', 'D']) {
            Some(parts) => parts,
            None => bail!("Unsupported dice formula: {}", formula),
        };
        let count = if count_str.is_empty() {
            1
        } else {
            match count_str.parse::<u32>() {
                Ok(count) => count,
                Err(_) => bail!("Unsupported dice formula: {}", formula),
            }
        };
        if count > MAX_DICE {
            bail!("Refusing to roll {} dice", count);
        }

        let (size_str, tail) = match rest.find(['+', '-']) {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let size = match size_str.parse::<i32>() {
            Ok(size) if size > 0 => size,
            _ => bail!("Unsupported dice formula: {}", formula),
        };

        let modifier = if tail.is_empty() {
            FormulaModifier::None
        } else if let Ok(fixed) = tail.parse::<i32>() {
            FormulaModifier::Fixed(fixed)
        } else if let Some(token) = tail.strip_prefix('+') {
            FormulaModifier::Attribute(token.to_string())
        } else {
            bail!("Unsupported dice formula: {}", formula)
        };

        Ok(Self {
            count: count.max(1),
            size,
            modifier,
        })
    }
}

/// Local roller backed by the thread RNG.
///
/// Attribute modifiers resolve through the document port when one was
/// provided; anything that does not resolve counts as zero so a stale
/// reference can never abort a roll.
pub struct ThreadRngDiceRoller {
    documents: Option<Arc<dyn DocumentPort>>,
}

impl ThreadRngDiceRoller {
    pub fn new() -> Self {
        Self { documents: None }
    }

    /// Resolve `@path` modifiers against host documents.
    pub fn with_documents(documents: Arc<dyn DocumentPort>) -> Self {
        Self {
            documents: Some(documents),
        }
    }

    async fn resolve_attribute(&self, actor: Option<&DocumentRef>, token: &str) -> i32 {
        let path = token.trim_start_matches('@');
        let (documents, actor) = match (self.documents.as_ref(), actor) {
            (Some(documents), Some(actor)) => (documents, actor),
            _ => {
                warn!("No document to resolve {} against, using 0", token);
                return 0;
            }
        };
        match documents.read_property(actor, path).await {
            Ok(Some(value)) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|v| v.round() as i64))
                .unwrap_or(0) as i32,
            Ok(None) => {
                warn!("{} did not resolve, using 0", token);
                0
            }
            Err(e) => {
                warn!("Resolving {} failed, using 0: {}", token, e);
                0
            }
        }
    }
}

impl Default for ThreadRngDiceRoller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiceRollerPort for ThreadRngDiceRoller {
    async fn roll(&self, actor: Option<&DocumentRef>, formula: &str) -> Result<RollEvaluation> {
        let parsed = ParsedFormula::parse(formula)?;
        let modifier = match &parsed.modifier {
            FormulaModifier::None => 0,
            FormulaModifier::Fixed(fixed) => *fixed,
            FormulaModifier::Attribute(token) => self.resolve_attribute(actor, token).await,
        };

        let mut dice = Vec::with_capacity(parsed.count as usize);
        {
            // ThreadRng is not Send; keep it out of scope across awaits.
            let mut rng = rand::thread_rng();
            for _ in 0..parsed.count {
                dice.push(rng.gen_range(1..=parsed.size));
            }
        }
        let total = dice.iter().map(|&die| i64::from(die)).sum::<i64>() + i64::from(modifier);
        let total = match i32::try_from(total) {
            Ok(total) => total,
            Err(_) => bail!("Roll total for {} is out of range", formula),
        };
        Ok(RollEvaluation {
            formula: formula.to_string(),
            total,
            dice,
        })
    }
}

/// Roller replaying a fixed sequence of totals.
///
/// Each scripted total is handed out as a single-die evaluation of
/// whatever formula was asked for. Rolling past the end of the script is
/// an error.
pub struct ScriptedDiceRoller {
    totals: Mutex<VecDeque<i32>>,
}

impl ScriptedDiceRoller {
    pub fn new(totals: impl IntoIterator<Item = i32>) -> Self {
        Self {
            totals: Mutex::new(totals.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DiceRollerPort for ScriptedDiceRoller {
    async fn roll(&self, _actor: Option<&DocumentRef>, formula: &str) -> Result<RollEvaluation> {
        let mut totals = self.totals.lock().await;
        match totals.pop_front() {
            Some(total) => Ok(RollEvaluation {
                formula: formula.to_string(),
                total,
                dice: vec![total],
            }),
            None => bail!("Scripted roller has no result left for {}", formula),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::HostDocument;
    use crate::infrastructure::memory::MemoryHost;

    #[tokio::test]
    async fn test_rolls_stay_in_range() {
        let roller = ThreadRngDiceRoller::new();
        for _ in 0..100 {
            let evaluation = roller.roll(None, "3d6").await.unwrap();
            assert_eq!(evaluation.dice.len(), 3);
            assert!((3..=18).contains(&evaluation.total));
            assert!(evaluation.dice.iter().all(|d| (1..=6).contains(d)));
        }
    }

    #[tokio::test]
    async fn test_fixed_modifiers_shift_the_total() {
        let roller = ThreadRngDiceRoller::new();
        let evaluation = roller.roll(None, "2d6 + 3").await.unwrap();
        assert_eq!(evaluation.total, evaluation.dice.iter().sum::<i32>() + 3);

        let evaluation = roller.roll(None, "1d4 - 2").await.unwrap();
        assert_eq!(evaluation.total, evaluation.dice.iter().sum::<i32>() - 2);
    }

    #[tokio::test]
    async fn test_attribute_modifier_resolves_through_documents() {
        let host = Arc::new(MemoryHost::new().with_document(HostDocument::new(
            DocumentRef::new("actor.ilsa"),
            "Ilsa",
            serde_json::json!({ "abilities": { "str": { "mod": 2 } } }),
        )));
        let roller = ThreadRngDiceRoller::with_documents(host);
        let actor = DocumentRef::new("actor.ilsa");
        let evaluation = roller
            .roll(Some(&actor), "1d4+@abilities.str.mod")
            .await
            .unwrap();
        assert_eq!(evaluation.total, evaluation.dice[0] + 2);
    }

    #[tokio::test]
    async fn test_unresolved_attribute_counts_as_zero() {
        let roller = ThreadRngDiceRoller::new();
        let evaluation = roller.roll(None, "1d4+@str").await.unwrap();
        assert_eq!(evaluation.total, evaluation.dice[0]);
    }

    #[tokio::test]
    async fn test_malformed_formulas_are_rejected() {
        let roller = ThreadRngDiceRoller::new();
        assert!(roller.roll(None, "fireball").await.is_err());
        assert!(roller.roll(None, "2x6").await.is_err());
        assert!(roller.roll(None, "2d").await.is_err());
        assert!(roller.roll(None, "999999d6").await.is_err());
    }

    #[tokio::test]
    async fn test_overflowing_totals_are_rejected() {
        let roller = ThreadRngDiceRoller::new();
        assert!(roller.roll(None, "1d6+2147483647").await.is_err());

        let evaluation = roller.roll(None, "10000d10000").await.unwrap();
        assert_eq!(evaluation.dice.len(), 10_000);
        assert!(evaluation.total >= 10_000);
    }

    #[tokio::test]
    async fn test_scripted_roller_replays_in_order() {
        let roller = ScriptedDiceRoller::new([4, 1]);
        assert_eq!(roller.roll(None, "1d6").await.unwrap().total, 4);
        assert_eq!(roller.roll(None, "1d6").await.unwrap().total, 1);
        assert!(roller.roll(None, "1d6").await.is_err());
    }

    #[test]
    fn test_formula_parsing() {
        let parsed = ParsedFormula::parse("d20").unwrap();
        assert_eq!((parsed.count, parsed.size), (1, 20));
        assert!(matches!(parsed.modifier, FormulaModifier::None));

        let parsed = ParsedFormula::parse("2D8 - 1").unwrap();
        assert_eq!((parsed.count, parsed.size), (2, 8));
        assert!(matches!(parsed.modifier, FormulaModifier::Fixed(-1)));

        let parsed = ParsedFormula::parse("1d6+@dex").unwrap();
        assert!(matches!(parsed.modifier, FormulaModifier::Attribute(ref token) if token == "@dex"));
    }
}
