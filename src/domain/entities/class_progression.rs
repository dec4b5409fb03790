//! Class progression entity - levels, experience, and the audit log
//!
//! The log is append-only. Totals are updated alongside each entry so the
//! current state can be read directly, but the entries themselves are never
//! rewritten; they are the audit trail of how the class got here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DocumentRef, SaveTargets};

/// One immutable entry in a class's experience log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpLogEntry {
    pub timestamp: DateTime<Utc>,
    pub xp_change: i64,
    /// 0 for experience grants, 1 for level-ups.
    pub level_change: u32,
    pub note: String,
}

impl XpLogEntry {
    pub fn xp_grant(amount: i64, note: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            xp_change: amount,
            level_change: 0,
            note: note.into(),
        }
    }

    pub fn level_up(note: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            xp_change: 0,
            level_change: 1,
            note: note.into(),
        }
    }
}

/// One row of a class's advancement table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Cumulative hit dice at this level.
    pub hit_dice: u32,
    /// Descending to-hit number against armor class 0.
    pub to_hit: i32,
    pub saves: SaveTargets,
    /// Whether the constitution bonus still applies to the hit die rolled
    /// on reaching this level. High levels grant flat points instead.
    pub con_mod_applies: bool,
}

impl LevelRecord {
    pub fn new(hit_dice: u32, to_hit: i32, saves: SaveTargets, con_mod_applies: bool) -> Self {
        Self {
            hit_dice,
            to_hit,
            saves,
            con_mod_applies,
        }
    }
}

/// Link from a class to the actor document that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerLink {
    pub actor_ref: DocumentRef,
    pub name: String,
    /// Constitution hit-point bonus per eligible hit die.
    pub con_hp_bonus: i32,
}

impl OwnerLink {
    pub fn new(actor_ref: DocumentRef, name: impl Into<String>) -> Self {
        Self {
            actor_ref,
            name: name.into(),
            con_hp_bonus: 0,
        }
    }

    pub fn with_con_bonus(mut self, bonus: i32) -> Self {
        self.con_hp_bonus = bonus;
        self
    }
}

/// Progression state of one character class.
///
/// `level` is always a valid index into `levels` (1-indexed); `xp` only
/// grows through grants and `level` only grows through level-ups, each of
/// which appends its own log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassProgression {
    /// Host document holding this class.
    pub reference: DocumentRef,
    pub name: String,
    pub level: u32,
    pub xp: i64,
    /// Die size rolled for hit points on each level-up.
    pub hit_die: u32,
    pub levels: Vec<LevelRecord>,
    pub xp_log: Vec<XpLogEntry>,
    pub can_gain_xp: bool,
    pub can_level_up: bool,
    pub owner: Option<OwnerLink>,
}

impl ClassProgression {
    pub fn new(reference: DocumentRef, name: impl Into<String>, hit_die: u32) -> Self {
        Self {
            reference,
            name: name.into(),
            level: 1,
            xp: 0,
            hit_die: hit_die.max(1),
            levels: Vec::new(),
            xp_log: Vec::new(),
            can_gain_xp: true,
            can_level_up: true,
            owner: None,
        }
    }

    pub fn with_levels(mut self, levels: Vec<LevelRecord>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_xp(mut self, xp: i64) -> Self {
        self.xp = xp.max(0);
        self
    }

    pub fn with_owner(mut self, owner: OwnerLink) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_capabilities(mut self, can_gain_xp: bool, can_level_up: bool) -> Self {
        self.can_gain_xp = can_gain_xp;
        self.can_level_up = can_level_up;
        self
    }

    /// Advancement row for a level, 1-indexed. Level 0 and levels past the
    /// end of the table have no row.
    pub fn level_record(&self, level: u32) -> Option<&LevelRecord> {
        if level == 0 {
            return None;
        }
        self.levels.get(level as usize - 1)
    }

    pub fn current_record(&self) -> Option<&LevelRecord> {
        self.level_record(self.level)
    }

    pub fn next_record(&self) -> Option<&LevelRecord> {
        self.level_record(self.level + 1)
    }

    /// Constitution bonus of the owning actor, 0 when unowned.
    pub fn con_hp_bonus(&self) -> i32 {
        self.owner.as_ref().map(|o| o.con_hp_bonus).unwrap_or(0)
    }

    /// Add experience and append the matching log entry.
    pub fn grant_xp(&mut self, amount: i64, note: Option<String>) -> XpLogEntry {
        let note = note.unwrap_or_else(|| format!("Gained {} XP", amount));
        self.xp += amount;
        let entry = XpLogEntry::xp_grant(amount, note);
        self.xp_log.push(entry.clone());
        entry
    }

    /// Raise the level by one and append the matching log entry.
    pub fn advance_level(&mut self, note: Option<String>) -> XpLogEntry {
        let from = self.level;
        self.level += 1;
        let note = note.unwrap_or_else(|| format!("Leveled up from {} to {}", from, self.level));
        let entry = XpLogEntry::level_up(note);
        self.xp_log.push(entry.clone());
        entry
    }
}
