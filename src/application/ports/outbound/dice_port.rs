//! Dice roller port - The only source of randomness
//!
//! Handing evaluation to the host keeps this crate deterministic and lets
//! hosts plug in their own rollers (native dice, seeded replays, test
//! sequences).

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::DocumentRef;

/// An evaluated roll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollEvaluation {
    /// The formula that was evaluated, canonical form.
    pub formula: String,
    pub total: i32,
    /// Individual die results in roll order.
    pub dice: Vec<i32>,
}

/// Port for evaluating dice formulas
///
/// `actor` gives attribute references in the formula something to resolve
/// against; rollers without document access treat unresolved attributes
/// as zero.
#[async_trait]
pub trait DiceRollerPort: Send + Sync {
    async fn roll(&self, actor: Option<&DocumentRef>, formula: &str) -> Result<RollEvaluation>;
}
