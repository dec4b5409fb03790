//! Roll parameters and dice formula building
//!
//! Formulas are always rendered in the canonical `NdS` shape with at most one
//! trailing modifier clause, so downstream evaluators never see `+0` noise or
//! ad-hoc whitespace. Check descriptions get the table-talk shorthand players
//! actually use: chances on a d6 read "4-in-6", percentile checks read "35%".

use serde::{Deserialize, Serialize};

use super::roll_mode::RollMode;

/// Modifier clause of a roll formula.
///
/// Raw text that does not parse as a number is kept verbatim as an attribute
/// reference (`@str`, `@level`) for the roll evaluator to resolve against the
/// acting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RollModifier {
    Fixed(i32),
    Attribute(String),
}

impl RollModifier {
    /// Parse raw dialog input into a modifier.
    ///
    /// Integers (with optional sign) become [`RollModifier::Fixed`]; other
    /// finite numbers are rounded; anything else is carried verbatim as an
    /// attribute reference. Empty input means no modifier.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return RollModifier::Fixed(0);
        }
        if let Ok(value) = trimmed.parse::<i32>() {
            return RollModifier::Fixed(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => RollModifier::Fixed(value.round() as i32),
            _ => RollModifier::Attribute(trimmed.to_string()),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, RollModifier::Fixed(0))
    }

    /// How the modifier reads in a parameter dialog input field.
    pub fn display_value(&self) -> String {
        match self {
            RollModifier::Fixed(0) => String::new(),
            RollModifier::Fixed(value) => value.to_string(),
            RollModifier::Attribute(token) => token.clone(),
        }
    }
}

impl Default for RollModifier {
    fn default() -> Self {
        RollModifier::Fixed(0)
    }
}

/// Everything needed to build and evaluate one roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollParameters {
    pub dice_count: u32,
    pub die_size: u32,
    pub modifier: RollModifier,
    /// When set, rolling at or under the target succeeds.
    pub reversed_success: bool,
    pub roll_mode: RollMode,
}

impl RollParameters {
    /// Build parameters, coercing degenerate counts and sizes up to 1.
    pub fn new(
        dice_count: u32,
        die_size: u32,
        modifier: RollModifier,
        reversed_success: bool,
        roll_mode: RollMode,
    ) -> Self {
        Self {
            dice_count: dice_count.max(1),
            die_size: die_size.max(1),
            modifier,
            reversed_success,
            roll_mode,
        }
    }

    /// Render the canonical formula string.
    ///
    /// Fixed modifiers append ` + n` / ` - n`; a zero modifier appends
    /// nothing; attribute modifiers append `+token` untouched.
    pub fn formula(&self) -> String {
        let base = format!("{}d{}", self.dice_count, self.die_size);
        match &self.modifier {
            RollModifier::Fixed(0) => base,
            RollModifier::Fixed(value) if *value > 0 => format!("{} + {}", base, value),
            RollModifier::Fixed(value) => format!("{} - {}", base, value.unsigned_abs()),
            RollModifier::Attribute(token) => format!("{}+{}", base, token),
        }
    }
}

impl Default for RollParameters {
    fn default() -> Self {
        Self {
            dice_count: 1,
            die_size: 20,
            modifier: RollModifier::default(),
            reversed_success: false,
            roll_mode: RollMode::default(),
        }
    }
}

/// Comparison operator of a check description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOperator {
    LessOrEqual,
    GreaterOrEqual,
    Less,
    Greater,
    Equal,
    NotEqual,
}

impl CheckOperator {
    /// Parse an operator token, accepting ASCII digraphs and the display
    /// glyphs interchangeably.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "<=" | "=<" | "≤" => Some(CheckOperator::LessOrEqual),
            ">=" | "=>" | "≥" => Some(CheckOperator::GreaterOrEqual),
            "<" => Some(CheckOperator::Less),
            ">" => Some(CheckOperator::Greater),
            "=" | "==" => Some(CheckOperator::Equal),
            "!=" | "<>" | "≠" => Some(CheckOperator::NotEqual),
            _ => None,
        }
    }

    /// Display glyph used in canonical check descriptions.
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckOperator::LessOrEqual => "≤",
            CheckOperator::GreaterOrEqual => "≥",
            CheckOperator::Less => "<",
            CheckOperator::Greater => ">",
            CheckOperator::Equal => "=",
            CheckOperator::NotEqual => "≠",
        }
    }
}

impl std::fmt::Display for CheckOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Canonical one-line description of a check.
///
/// Roll-under checks on a single d6 collapse to the "N-in-6" shorthand with
/// the chance clamped to the die, and roll-under percentile checks collapse
/// to "N%". Everything else reads `formula symbol target`. The target is
/// rounded to the nearest integer; non-finite targets count as 0.
pub fn canonical_check(formula: &str, operator: CheckOperator, target: f64) -> String {
    let target = if target.is_finite() {
        target.round() as i64
    } else {
        0
    };

    if operator == CheckOperator::LessOrEqual {
        if formula == "1d6" {
            return format!("{}-in-6", target.clamp(0, 6));
        }
        if formula == "1d100" {
            return format!("{}%", target.clamp(0, 100));
        }
    }

    format!("{} {} {}", formula, operator.symbol(), target)
}
