//! Value objects - Immutable objects defined by their attributes

mod dice;
mod ids;
mod monster_table;
mod roll_mode;
mod rule_system;
mod targets;
mod xp_award;

pub use dice::{canonical_check, CheckOperator, RollModifier, RollParameters};
pub use ids::*;
pub use monster_table::{MonsterStatEntry, MonsterStatTable, MonsterTableError, XpFormula};
pub use roll_mode::RollMode;
pub use rule_system::{
    CombatRuleSet, RulesetSelection, SaveCategory, SaveTargets, SavingThrowRuleSet,
};
pub use targets::{TargetRef, TargetSelection};
pub use xp_award::XpAward;
