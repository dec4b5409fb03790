//! Monster statistics by hit-dice tier
//!
//! One row per hit-dice tier from 0 (less than one die) to 22. Each row
//! carries the attack-roll offset relative to a one-die creature, the five
//! saving throw targets, and the experience formula used when awarding XP
//! for a defeated monster.

use serde::{Deserialize, Serialize};

use super::rule_system::SaveTargets;
use super::xp_award::XpAward;

/// Experience formula attached to a hit-dice tier.
///
/// `base_plus` is used instead of `base` when the creature's hit dice carry
/// a "+" (a 2+1 HD monster is worth more than a flat 2 HD one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpFormula {
    pub base: i32,
    pub base_plus: i32,
    pub per_hp: i32,
    pub per_ability: i32,
}

impl XpFormula {
    pub const fn new(base: i32, base_plus: i32, per_hp: i32, per_ability: i32) -> Self {
        Self {
            base,
            base_plus,
            per_hp,
            per_ability,
        }
    }

    /// Compute the award for one defeated creature.
    pub fn award(&self, has_plus: bool, hit_points: i32, special_abilities: u32) -> i32 {
        let base = if has_plus { self.base_plus } else { self.base };
        let hit_points = hit_points.max(0);
        (base + self.per_hp * hit_points + self.per_ability * special_abilities as i32).max(0)
    }
}

/// One row of the monster statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStatEntry {
    pub tier: u8,
    /// Attack-roll offset relative to a one-hit-die creature.
    pub attack_offset: i32,
    pub saves: SaveTargets,
    pub xp: XpFormula,
}

impl MonsterStatEntry {
    /// The award for defeating one creature of this tier, ready to be
    /// summed with other defeats and divided among the party.
    pub fn xp_award(&self, has_plus: bool, hit_points: i32, special_abilities: u32) -> XpAward {
        XpAward::new(i64::from(self.xp.award(has_plus, hit_points, special_abilities)))
    }
}

const fn entry(tier: u8, attack_offset: i32, saves: SaveTargets, xp: XpFormula) -> MonsterStatEntry {
    MonsterStatEntry {
        tier,
        attack_offset,
        saves,
        xp,
    }
}

#[rustfmt::skip]
const MONSTER_ROWS: &[MonsterStatEntry] = &[
    entry(0,  -1, SaveTargets::new(14, 15, 16, 17, 18), XpFormula::new(5,    10,   1,  10)),
    entry(1,   0, SaveTargets::new(12, 13, 14, 15, 16), XpFormula::new(10,   20,   1,  25)),
    entry(2,   1, SaveTargets::new(12, 13, 14, 15, 16), XpFormula::new(20,   35,   2,  30)),
    entry(3,   2, SaveTargets::new(12, 13, 14, 15, 16), XpFormula::new(35,   60,   3,  50)),
    entry(4,   3, SaveTargets::new(10, 11, 12, 13, 14), XpFormula::new(60,   90,   4,  75)),
    entry(5,   4, SaveTargets::new(10, 11, 12, 13, 14), XpFormula::new(90,   150,  5,  125)),
    entry(6,   5, SaveTargets::new(10, 11, 12, 13, 14), XpFormula::new(150,  225,  6,  175)),
    entry(7,   6, SaveTargets::new(8,  9,  10, 10, 12), XpFormula::new(225,  375,  8,  275)),
    entry(8,   7, SaveTargets::new(8,  9,  10, 10, 12), XpFormula::new(375,  600,  10, 400)),
    entry(9,   7, SaveTargets::new(8,  9,  10, 10, 12), XpFormula::new(600,  700,  12, 550)),
    entry(10,  8, SaveTargets::new(6,  7,  8,  8,  10), XpFormula::new(700,  800,  13, 600)),
    entry(11,  8, SaveTargets::new(6,  7,  8,  8,  10), XpFormula::new(800,  1100, 14, 700)),
    entry(12,  9, SaveTargets::new(6,  7,  8,  8,  10), XpFormula::new(1100, 1350, 16, 800)),
    entry(13,  9, SaveTargets::new(4,  5,  6,  5,  8),  XpFormula::new(1350, 1600, 17, 950)),
    entry(14, 10, SaveTargets::new(4,  5,  6,  5,  8),  XpFormula::new(1600, 1850, 18, 1100)),
    entry(15, 10, SaveTargets::new(4,  5,  6,  5,  8),  XpFormula::new(1850, 2100, 19, 1250)),
    entry(16, 11, SaveTargets::new(2,  3,  4,  3,  6),  XpFormula::new(2100, 2400, 20, 1400)),
    entry(17, 11, SaveTargets::new(2,  3,  4,  3,  6),  XpFormula::new(2400, 2700, 21, 1600)),
    entry(18, 12, SaveTargets::new(2,  3,  4,  3,  6),  XpFormula::new(2700, 3000, 22, 1800)),
    entry(19, 12, SaveTargets::new(2,  2,  2,  2,  4),  XpFormula::new(3000, 3500, 23, 2000)),
    entry(20, 13, SaveTargets::new(2,  2,  2,  2,  4),  XpFormula::new(3500, 4000, 24, 2250)),
    entry(21, 13, SaveTargets::new(2,  2,  2,  2,  4),  XpFormula::new(4000, 4500, 25, 2500)),
    entry(22, 14, SaveTargets::new(2,  2,  2,  2,  2),  XpFormula::new(4500, 5000, 26, 2750)),
];

/// Table data failed its integrity check.
#[derive(Debug, thiserror::Error)]
pub enum MonsterTableError {
    /// Two rows claim the same hit-dice tier
    #[error("Duplicate monster table tier: {0}")]
    DuplicateTier(u8),
}

/// The loaded, integrity-checked monster statistics table.
#[derive(Debug, Clone)]
pub struct MonsterStatTable {
    rows: Vec<MonsterStatEntry>,
}

impl MonsterStatTable {
    /// Load the built-in table.
    pub fn load() -> Result<Self, MonsterTableError> {
        Self::load_from(MONSTER_ROWS)
    }

    /// Load from explicit rows, rejecting duplicate tiers.
    pub fn load_from(rows: &[MonsterStatEntry]) -> Result<Self, MonsterTableError> {
        let mut seen = std::collections::HashSet::new();
        for row in rows {
            if !seen.insert(row.tier) {
                return Err(MonsterTableError::DuplicateTier(row.tier));
            }
        }
        Ok(Self {
            rows: rows.to_vec(),
        })
    }

    /// Exact-match lookup by tier. Tiers outside the table return `None`.
    pub fn lookup(&self, tier: u8) -> Option<&MonsterStatEntry> {
        self.rows.iter().find(|row| row.tier == tier)
    }

    pub fn rows(&self) -> &[MonsterStatEntry] {
        &self.rows
    }
}
