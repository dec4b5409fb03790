//! Rule set selection for combat math and saving throw vocabulary

use serde::{Deserialize, Serialize};

/// How attack progression is expressed to players.
///
/// The level tables store the legacy descending to-hit number; hosts running
/// ascending armor class present the same progression as a bonus instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatRuleSet {
    /// Descending to-hit target against armor class 0.
    Descending,
    /// Ascending attack bonus added to the d20 roll.
    Ascending,
}

impl CombatRuleSet {
    /// Convert a stored to-hit number into this rule set's representation.
    pub fn attack_value(&self, to_hit: i32) -> i32 {
        match self {
            CombatRuleSet::Descending => to_hit,
            CombatRuleSet::Ascending => 19 - to_hit,
        }
    }

    pub fn attack_label(&self) -> &'static str {
        match self {
            CombatRuleSet::Descending => "THAC0",
            CombatRuleSet::Ascending => "Attack bonus",
        }
    }

    /// Render an attack value the way sheets for this rule set print it.
    pub fn format_attack(&self, to_hit: i32) -> String {
        match self {
            CombatRuleSet::Descending => format!("{}", to_hit),
            CombatRuleSet::Ascending => format!("{:+}", self.attack_value(to_hit)),
        }
    }
}

impl Default for CombatRuleSet {
    fn default() -> Self {
        Self::Descending
    }
}

/// The five saving throw categories shared by every supported rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveCategory {
    Death,
    Wands,
    Paralysis,
    Breath,
    Spells,
}

impl SaveCategory {
    pub const ALL: [SaveCategory; 5] = [
        SaveCategory::Death,
        SaveCategory::Wands,
        SaveCategory::Paralysis,
        SaveCategory::Breath,
        SaveCategory::Spells,
    ];

    /// Stable key used in host document data.
    pub fn key(&self) -> &'static str {
        match self {
            SaveCategory::Death => "death",
            SaveCategory::Wands => "wands",
            SaveCategory::Paralysis => "paralysis",
            SaveCategory::Breath => "breath",
            SaveCategory::Spells => "spells",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "death" => Some(SaveCategory::Death),
            "wands" => Some(SaveCategory::Wands),
            "paralysis" => Some(SaveCategory::Paralysis),
            "breath" => Some(SaveCategory::Breath),
            "spells" => Some(SaveCategory::Spells),
            _ => None,
        }
    }
}

/// Target numbers for the five saving throws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveTargets {
    pub death: i32,
    pub wands: i32,
    pub paralysis: i32,
    pub breath: i32,
    pub spells: i32,
}

impl SaveTargets {
    pub const fn new(death: i32, wands: i32, paralysis: i32, breath: i32, spells: i32) -> Self {
        Self {
            death,
            wands,
            paralysis,
            breath,
            spells,
        }
    }

    pub fn get(&self, category: SaveCategory) -> i32 {
        match category {
            SaveCategory::Death => self.death,
            SaveCategory::Wands => self.wands,
            SaveCategory::Paralysis => self.paralysis,
            SaveCategory::Breath => self.breath,
            SaveCategory::Spells => self.spells,
        }
    }

    /// Iterate categories in sheet order with their targets.
    pub fn entries(&self) -> impl Iterator<Item = (SaveCategory, i32)> + '_ {
        SaveCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// Which label set saving throws are printed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingThrowRuleSet {
    /// Full category names as printed in the rules.
    Standard,
    /// One-letter sheet abbreviations.
    Abbreviated,
}

impl SavingThrowRuleSet {
    pub fn label(&self, category: SaveCategory) -> &'static str {
        match self {
            SavingThrowRuleSet::Standard => match category {
                SaveCategory::Death => "Death / Poison",
                SaveCategory::Wands => "Wands",
                SaveCategory::Paralysis => "Paralysis / Petrify",
                SaveCategory::Breath => "Breath Attacks",
                SaveCategory::Spells => "Spells / Rods / Staves",
            },
            SavingThrowRuleSet::Abbreviated => match category {
                SaveCategory::Death => "D",
                SaveCategory::Wands => "W",
                SaveCategory::Paralysis => "P",
                SaveCategory::Breath => "B",
                SaveCategory::Spells => "S",
            },
        }
    }

    /// Label for a raw document key, falling back to the key itself when it
    /// does not name one of the five categories.
    pub fn label_for_key(&self, key: &str) -> String {
        match SaveCategory::from_key(key) {
            Some(category) => self.label(category).to_string(),
            None => key.to_string(),
        }
    }
}

impl Default for SavingThrowRuleSet {
    fn default() -> Self {
        Self::Standard
    }
}

/// The rule sets a host has chosen, injected into every service that
/// formats combat or save numbers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RulesetSelection {
    pub combat: CombatRuleSet,
    pub saves: SavingThrowRuleSet,
}

impl RulesetSelection {
    pub fn new(combat: CombatRuleSet, saves: SavingThrowRuleSet) -> Self {
        Self { combat, saves }
    }
}
