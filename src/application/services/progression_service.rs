//! Progression Service - Experience grants and level advancement
//!
//! Wraps the `ClassProgression` entity with the host-facing workflow, split
//! into two halves. The `request_*` operations only collect input: gate on
//! the class's capability flags, run the dialog, hand back a plan, touch no
//! state. The `apply_*` operations do the work: roll the new hit die, post
//! the summary, then persist. Persistence is always the last port touched
//! and always a single call, so an earlier failure leaves the stored
//! documents exactly as they were.
//!
//! Blocked capabilities and missing advancement rows are not errors. They
//! warn and resolve to `Ok(None)`; only a failing host port aborts.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::application::ports::outbound::{
    DiceRollerPort, DocumentPort, DocumentUpdate, InteractionPort, MessageDraft, MessagePort,
    NotificationPort, RollEvaluation, SpeakerDescriptor,
};
use crate::domain::entities::{ClassProgression, LevelRecord, XpLogEntry};
use crate::domain::value_objects::{RulesetSelection, SaveCategory, XpAward};

/// One changed statistic in a level-up summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub label: String,
    pub from: String,
    pub to: String,
}

/// Everything that changed when a class gained a level.
#[derive(Debug, Clone)]
pub struct LevelUpReport {
    pub name: String,
    pub from_level: u32,
    pub to_level: u32,
    pub hp_roll: RollEvaluation,
    /// Hit points gained, constitution included, never below 1.
    pub hp_gain: i32,
    /// New maximum of the owning actor, absent for unowned classes.
    pub new_max_hp: Option<i64>,
    pub lines: Vec<ReportLine>,
}

impl LevelUpReport {
    /// Render the report as table-message content.
    pub fn render(&self) -> String {
        let mut out = format!("{} advances to level {}!", self.name, self.to_level);
        out.push_str(&format!(
            "\nHit points: +{} ({} = {})",
            self.hp_gain, self.hp_roll.formula, self.hp_roll.total
        ));
        if let Some(new_max) = self.new_max_hp {
            out.push_str(&format!(", {} total", new_max));
        }
        for line in &self.lines {
            out.push_str(&format!("\n{}: {} → {}", line.label, line.from, line.to));
        }
        out
    }
}

/// An experience grant collected from the dialog, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct XpGrant {
    pub amount: i64,
    pub note: Option<String>,
}

/// A confirmed level-up, ready to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelUpPlan {
    pub note: Option<String>,
}

/// Service advancing class progressions
pub struct ProgressionService {
    documents: Arc<dyn DocumentPort>,
    interactions: Arc<dyn InteractionPort>,
    dice: Arc<dyn DiceRollerPort>,
    messages: Arc<dyn MessagePort>,
    notifications: Arc<dyn NotificationPort>,
    rules: RulesetSelection,
}

impl ProgressionService {
    pub fn new(
        documents: Arc<dyn DocumentPort>,
        interactions: Arc<dyn InteractionPort>,
        dice: Arc<dyn DiceRollerPort>,
        messages: Arc<dyn MessagePort>,
        notifications: Arc<dyn NotificationPort>,
        rules: RulesetSelection,
    ) -> Self {
        Self {
            documents,
            interactions,
            dice,
            messages,
            notifications,
            rules,
        }
    }

    /// Collect an experience grant from the dialog without applying it.
    ///
    /// A class that cannot gain experience warns and skips the dialog
    /// entirely. Cancelling, entering zero, or entering something that is
    /// not a number resolves to `Ok(None)`.
    pub async fn request_add_xp(
        &self,
        progression: &ClassProgression,
    ) -> Result<Option<XpGrant>> {
        if !progression.can_gain_xp {
            warn!("Class cannot gain experience");
            self.notifications
                .warn(&format!("{} cannot gain experience", progression.name));
            return Ok(None);
        }

        let raw = match self
            .interactions
            .prompt_xp_grant(&progression.name)
            .await
            .context("Experience dialog failed")?
        {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let amount = match parse_xp_amount(&raw.amount) {
            Some(amount) => amount,
            None => {
                warn!("Ignoring non-numeric experience amount {:?}", raw.amount);
                self.notifications.warn(&format!(
                    "{:?} is not a number, no experience was granted",
                    raw.amount
                ));
                return Ok(None);
            }
        };
        if amount == 0 {
            debug!("Empty experience amount, nothing to grant");
            return Ok(None);
        }

        let note = raw.note.trim();
        let note = (!note.is_empty()).then(|| note.to_string());
        Ok(Some(XpGrant { amount, note }))
    }

    /// Grant experience, append the log entry, and persist both in one
    /// document update.
    #[instrument(skip(self, progression), fields(class = %progression.name))]
    pub async fn apply_add_xp(
        &self,
        progression: &mut ClassProgression,
        amount: i64,
        note: Option<String>,
    ) -> Result<Option<XpLogEntry>> {
        if !progression.can_gain_xp {
            warn!("Class cannot gain experience");
            self.notifications
                .warn(&format!("{} cannot gain experience", progression.name));
            return Ok(None);
        }

        let entry = progression.grant_xp(amount, note);
        self.documents
            .update_document(
                &progression.reference,
                serde_json::json!({
                    "xp": progression.xp,
                    "xpLog": progression.xp_log,
                }),
            )
            .await
            .context("Failed to persist the experience grant")?;

        info!(amount, total = progression.xp, "Granted experience");
        self.notifications.info(&format!(
            "{} gained {} XP ({} total)",
            progression.name, amount, progression.xp
        ));
        Ok(Some(entry))
    }

    /// Divide an award evenly across several classes and persist every
    /// grant in one batched update.
    ///
    /// Shares line up with the input: a class that cannot gain experience
    /// keeps a `None` slot and its share is not redistributed.
    #[instrument(skip(self, progressions, note), fields(classes = progressions.len(), total = award.total()))]
    pub async fn apply_party_xp(
        &self,
        progressions: &mut [ClassProgression],
        award: XpAward,
        note: Option<String>,
    ) -> Result<Vec<Option<XpLogEntry>>> {
        let shares = award.split_evenly(progressions.len());
        let mut entries = Vec::with_capacity(progressions.len());
        let mut updates = Vec::new();
        for (progression, share) in progressions.iter_mut().zip(shares) {
            if !progression.can_gain_xp {
                warn!("{} cannot gain experience, withholding its share", progression.name);
                self.notifications
                    .warn(&format!("{} cannot gain experience", progression.name));
                entries.push(None);
                continue;
            }
            let entry = progression.grant_xp(share, note.clone());
            updates.push(DocumentUpdate::new(
                progression.reference.clone(),
                serde_json::json!({
                    "xp": progression.xp,
                    "xpLog": progression.xp_log,
                }),
            ));
            entries.push(Some(entry));
        }

        if !updates.is_empty() {
            self.documents
                .update_documents(&updates)
                .await
                .context("Failed to persist the party grant")?;
            info!(recipients = updates.len(), "Divided the award");
            self.notifications.info(&format!(
                "Divided {} XP among {} classes",
                award.total(),
                updates.len()
            ));
        }
        Ok(entries)
    }

    /// Collect a level-up note from the dialog without applying anything.
    ///
    /// A class that cannot level up warns and skips the dialog. Cancelling
    /// resolves to `Ok(None)`; submitting a blank note is still a yes.
    pub async fn request_level_up(
        &self,
        progression: &ClassProgression,
    ) -> Result<Option<LevelUpPlan>> {
        if !progression.can_level_up {
            warn!("Class cannot level up");
            self.notifications
                .warn(&format!("{} cannot level up", progression.name));
            return Ok(None);
        }

        let title = format!(
            "Advance {} from level {} to level {}",
            progression.name,
            progression.level,
            progression.level + 1
        );
        let note = match self
            .interactions
            .prompt_note(&title)
            .await
            .context("Level up dialog failed")?
        {
            Some(note) => note,
            None => {
                info!("Level up for {} cancelled", progression.name);
                return Ok(None);
            }
        };

        let note = note.trim();
        let note = (!note.is_empty()).then(|| note.to_string());
        Ok(Some(LevelUpPlan { note }))
    }

    /// Advance the class one level.
    ///
    /// Rolls the hit die, summarizes what changed against the advancement
    /// table, posts the summary under the owning actor when one is
    /// attached, then persists the class and that actor together in a
    /// single batched update. A missing note falls back to the entity's
    /// generated one.
    #[instrument(skip(self, progression, note), fields(class = %progression.name, level = progression.level))]
    pub async fn apply_level_up(
        &self,
        progression: &mut ClassProgression,
        note: Option<String>,
    ) -> Result<Option<LevelUpReport>> {
        if !progression.can_level_up {
            warn!("Class cannot level up");
            self.notifications
                .warn(&format!("{} cannot level up", progression.name));
            return Ok(None);
        }
        let current = match progression.current_record() {
            Some(record) => record.clone(),
            None => {
                warn!("No advancement row for the current level");
                self.notifications.warn(&format!(
                    "{} has no level {} in its advancement table",
                    progression.name, progression.level
                ));
                return Ok(None);
            }
        };
        let next = match progression.next_record() {
            Some(record) => record.clone(),
            None => {
                warn!("Advancement table ends at the current level");
                self.notifications.warn(&format!(
                    "{} has no level {} in its advancement table",
                    progression.name,
                    progression.level + 1
                ));
                return Ok(None);
            }
        };

        let actor_ref = progression.owner.as_ref().map(|o| o.actor_ref.clone());
        let formula = format!("1d{}", progression.hit_die);
        let hp_roll = self
            .dice
            .roll(actor_ref.as_ref(), &formula)
            .await
            .context("Hit point roll failed")?;
        let con_bonus = if next.con_mod_applies {
            progression.con_hp_bonus()
        } else {
            0
        };
        let hp_gain = (hp_roll.total + con_bonus).max(1);

        let new_max_hp = match &actor_ref {
            Some(actor_ref) => {
                let current_max = self
                    .documents
                    .read_property(actor_ref, "maxHp")
                    .await
                    .context("Failed to read the actor's hit point maximum")?
                    .and_then(|value| value.as_i64())
                    .unwrap_or(0);
                Some(current_max + i64::from(hp_gain))
            }
            None => None,
        };

        let from_level = progression.level;
        let lines = self.diff_records(&current, &next);
        progression.advance_level(note);

        let report = LevelUpReport {
            name: progression.name.clone(),
            from_level,
            to_level: progression.level,
            hp_roll: hp_roll.clone(),
            hp_gain,
            new_max_hp,
            lines,
        };

        if let Some(owner) = &progression.owner {
            let speaker =
                SpeakerDescriptor::for_actor(owner.actor_ref.clone(), owner.name.clone());
            let draft = MessageDraft::new(report.render(), speaker).with_roll(serde_json::json!({
                "formula": hp_roll.formula,
                "total": hp_roll.total,
                "dice": hp_roll.dice,
            }));
            self.messages
                .create_message(draft)
                .await
                .context("Failed to post the level up summary")?;
        }

        let mut updates = vec![DocumentUpdate::new(
            progression.reference.clone(),
            serde_json::json!({
                "level": progression.level,
                "xpLog": progression.xp_log,
            }),
        )];
        if let (Some(actor_ref), Some(new_max)) = (actor_ref, new_max_hp) {
            updates.push(DocumentUpdate::new(
                actor_ref,
                serde_json::json!({ "maxHp": new_max }),
            ));
        }
        self.documents
            .update_documents(&updates)
            .await
            .context("Failed to persist the level up")?;

        info!(to_level = progression.level, hp_gain, "Leveled up");
        self.notifications.info(&format!(
            "{} is now level {}",
            progression.name, progression.level
        ));
        Ok(Some(report))
    }

    /// Collect the statistics that change between two advancement rows,
    /// labeled and formatted for the active rule sets.
    fn diff_records(&self, current: &LevelRecord, next: &LevelRecord) -> Vec<ReportLine> {
        let mut lines = Vec::new();
        if current.hit_dice != next.hit_dice {
            lines.push(ReportLine {
                label: "Hit dice".to_string(),
                from: current.hit_dice.to_string(),
                to: next.hit_dice.to_string(),
            });
        }
        if current.to_hit != next.to_hit {
            let combat = self.rules.combat;
            lines.push(ReportLine {
                label: combat.attack_label().to_string(),
                from: combat.format_attack(current.to_hit),
                to: combat.format_attack(next.to_hit),
            });
        }
        for category in SaveCategory::ALL {
            let (from, to) = (current.saves.get(category), next.saves.get(category));
            if from != to {
                lines.push(ReportLine {
                    label: self.rules.saves.label(category).to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        lines
    }
}

fn parse_xp_amount(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(amount) = trimmed.parse::<i64>() {
        return Some(amount);
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(amount.round() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::{HostDocument, RawXpInput};
    use crate::domain::entities::OwnerLink;
    use crate::domain::value_objects::{
        CombatRuleSet, DocumentRef, SaveTargets, SavingThrowRuleSet,
    };
    use crate::infrastructure::dice::ScriptedDiceRoller;
    use crate::infrastructure::memory::{MemoryHost, NoticeLevel};

    fn fighter() -> ClassProgression {
        let saves_1 = SaveTargets::new(12, 13, 14, 15, 16);
        let saves_4 = SaveTargets::new(10, 11, 12, 13, 14);
        ClassProgression::new(DocumentRef::new("item.fighter"), "Fighter", 6)
            .with_levels(vec![
                LevelRecord::new(1, 19, saves_1, true),
                LevelRecord::new(2, 19, saves_1, true),
                LevelRecord::new(3, 19, saves_1, true),
                LevelRecord::new(4, 17, saves_4, true),
            ])
            .with_owner(OwnerLink::new(DocumentRef::new("actor.ilsa"), "Ilsa").with_con_bonus(1))
    }

    fn host_with_actor(max_hp: i64) -> MemoryHost {
        MemoryHost::new().with_document(HostDocument::new(
            DocumentRef::new("actor.ilsa"),
            "Ilsa",
            serde_json::json!({ "maxHp": max_hp }),
        ))
    }

    fn service(host: &Arc<MemoryHost>, dice: Arc<ScriptedDiceRoller>) -> ProgressionService {
        ProgressionService::new(
            host.clone(),
            host.clone(),
            dice,
            host.clone(),
            host.clone(),
            RulesetSelection::default(),
        )
    }

    #[tokio::test]
    async fn test_level_up_rolls_hit_die_and_batches_one_update() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter();

        let report = svc
            .apply_level_up(&mut class, None)
            .await
            .unwrap()
            .expect("level up should complete");

        assert_eq!(report.from_level, 1);
        assert_eq!(report.to_level, 2);
        assert_eq!(report.hp_roll.formula, "1d6");
        assert_eq!(report.hp_gain, 5);
        assert_eq!(report.new_max_hp, Some(12));

        assert_eq!(class.level, 2);
        assert_eq!(class.xp_log.len(), 1);
        assert_eq!(class.xp_log[0].xp_change, 0);
        assert_eq!(class.xp_log[0].level_change, 1);

        assert_eq!(host.persistence_calls(), 1);
        let actor = host.document("actor.ilsa").await.unwrap();
        assert_eq!(actor.data["maxHp"], 12);
        let item = host.document("item.fighter").await.unwrap();
        assert_eq!(item.data["level"], 2);
        assert_eq!(item.data["xpLog"].as_array().unwrap().len(), 1);
        assert_eq!(host.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_level_up_posts_summary_before_persisting() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter();

        svc.apply_level_up(&mut class, None).await.unwrap();

        let messages = host.messages().await;
        assert_eq!(messages[0].draft.speaker.alias, "Ilsa");
        assert!(messages[0].draft.content.contains("advances to level 2"));
        assert!(messages[0].draft.content.contains("+5 (1d6 = 4), 12 total"));
        assert!(messages[0].draft.roll.is_some());
    }

    #[tokio::test]
    async fn test_hit_point_gain_never_drops_below_one() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([1])));
        let mut class = fighter();
        if let Some(owner) = class.owner.as_mut() {
            owner.con_hp_bonus = -2;
        }

        let report = svc.apply_level_up(&mut class, None).await.unwrap().unwrap();
        assert_eq!(report.hp_gain, 1);
        assert_eq!(report.new_max_hp, Some(8));
    }

    #[tokio::test]
    async fn test_constitution_ignored_when_row_says_so() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter().with_level(3);
        for record in &mut class.levels {
            record.con_mod_applies = false;
        }

        let report = svc.apply_level_up(&mut class, None).await.unwrap().unwrap();
        assert_eq!(report.hp_gain, 4);
    }

    #[tokio::test]
    async fn test_level_up_stops_when_table_ends() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter().with_level(4);

        let report = svc.apply_level_up(&mut class, None).await.unwrap();

        assert!(report.is_none());
        assert_eq!(class.level, 4);
        assert_eq!(host.persistence_calls(), 0);
        assert!(host.messages().await.is_empty());
        assert_eq!(host.notices()[0].level, NoticeLevel::Warn);
    }

    #[tokio::test]
    async fn test_level_up_blocked_by_capability() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter().with_capabilities(true, false);

        assert!(svc.apply_level_up(&mut class, None).await.unwrap().is_none());
        assert_eq!(host.persistence_calls(), 0);
    }

    #[tokio::test]
    async fn test_level_up_diff_follows_the_combat_rule_set() {
        let host = Arc::new(host_with_actor(7));
        let mut class = fighter().with_level(3);

        let descending = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let report = descending.apply_level_up(&mut class, None).await.unwrap().unwrap();
        let attack = report
            .lines
            .iter()
            .find(|line| line.label == "THAC0")
            .expect("attack line");
        assert_eq!(attack.from, "19");
        assert_eq!(attack.to, "17");
        assert!(report
            .lines
            .iter()
            .any(|line| line.label == "Death / Poison" && line.to == "10"));

        let mut class = fighter().with_level(3);
        let ascending = ProgressionService::new(
            host.clone(),
            host.clone(),
            Arc::new(ScriptedDiceRoller::new([4])),
            host.clone(),
            host.clone(),
            RulesetSelection::new(CombatRuleSet::Ascending, SavingThrowRuleSet::Abbreviated),
        );
        let report = ascending.apply_level_up(&mut class, None).await.unwrap().unwrap();
        let attack = report
            .lines
            .iter()
            .find(|line| line.label == "Attack bonus")
            .expect("attack line");
        assert_eq!(attack.from, "+0");
        assert_eq!(attack.to, "+2");
        assert!(report.lines.iter().any(|line| line.label == "D"));
    }

    #[tokio::test]
    async fn test_unowned_class_skips_announcement_and_actor_patch() {
        let host = Arc::new(MemoryHost::new());
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter();
        class.owner = None;

        let report = svc.apply_level_up(&mut class, None).await.unwrap().unwrap();

        assert_eq!(report.hp_gain, 4);
        assert_eq!(report.new_max_hp, None);
        assert!(host.messages().await.is_empty());
        assert_eq!(host.persistence_calls(), 1);
        assert!(host.document("actor.ilsa").await.is_none());
        assert_eq!(host.notices()[0].level, NoticeLevel::Info);
        assert!(host.notices()[0].text.contains("level 2"));
    }

    #[tokio::test]
    async fn test_missing_max_hp_starts_from_zero() {
        let host = Arc::new(MemoryHost::new().with_document(HostDocument::new(
            DocumentRef::new("actor.ilsa"),
            "Ilsa",
            serde_json::json!({}),
        )));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter();

        let report = svc.apply_level_up(&mut class, None).await.unwrap().unwrap();
        assert_eq!(report.new_max_hp, Some(5));
    }

    #[tokio::test]
    async fn test_add_xp_appends_log_and_patches_once() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));
        let mut class = fighter();

        let entry = svc
            .apply_add_xp(&mut class, 150, Some("Cleared the crypt".to_string()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(entry.xp_change, 150);
        assert_eq!(entry.note, "Cleared the crypt");
        assert_eq!(class.xp, 150);
        assert_eq!(host.persistence_calls(), 1);
        let item = host.document("item.fighter").await.unwrap();
        assert_eq!(item.data["xp"], 150);
        assert!(host
            .notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.text.contains("150")));
    }

    #[tokio::test]
    async fn test_add_xp_blocked_by_capability() {
        let host = Arc::new(host_with_actor(7));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));
        let mut class = fighter().with_capabilities(false, true);

        assert!(svc.apply_add_xp(&mut class, 150, None).await.unwrap().is_none());
        assert_eq!(class.xp, 0);
        assert!(class.xp_log.is_empty());
        assert_eq!(host.persistence_calls(), 0);
    }

    fn party() -> Vec<ClassProgression> {
        ["item.fighter", "item.cleric", "item.thief"]
            .into_iter()
            .map(|reference| {
                ClassProgression::new(DocumentRef::new(reference), reference, 6)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_party_award_splits_remainder_to_earliest_shares() {
        let host = Arc::new(MemoryHost::new());
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));
        let mut party = party();

        let entries = svc
            .apply_party_xp(&mut party, XpAward::new(100), Some("Goblin camp".to_string()))
            .await
            .unwrap();

        let changes: Vec<_> = entries
            .iter()
            .map(|e| e.as_ref().unwrap().xp_change)
            .collect();
        assert_eq!(changes, vec![34, 33, 33]);
        assert_eq!(party[0].xp, 34);
        assert_eq!(host.persistence_calls(), 1);
        assert_eq!(host.document("item.cleric").await.unwrap().data["xp"], 33);
    }

    #[tokio::test]
    async fn test_party_award_withholds_blocked_shares() {
        let host = Arc::new(MemoryHost::new());
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));
        let mut party = party();
        party[1].can_gain_xp = false;

        let entries = svc
            .apply_party_xp(&mut party, XpAward::new(300), None)
            .await
            .unwrap();

        assert!(entries[0].is_some());
        assert!(entries[1].is_none());
        assert!(entries[2].is_some());
        assert_eq!(party[1].xp, 0);
        assert_eq!(party[2].xp, 100);
        assert_eq!(host.persistence_calls(), 1);
        assert!(host.document("item.cleric").await.is_none());
    }

    #[tokio::test]
    async fn test_party_award_to_nobody_touches_nothing() {
        let host = Arc::new(MemoryHost::new());
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));

        let entries = svc
            .apply_party_xp(&mut [], XpAward::new(500), None)
            .await
            .unwrap();

        assert!(entries.is_empty());
        assert_eq!(host.persistence_calls(), 0);
    }

    #[tokio::test]
    async fn test_request_add_xp_collects_without_applying() {
        let host = Arc::new(host_with_actor(7).script_xp_grant(Some(RawXpInput {
            amount: " 250 ".to_string(),
            note: "Dragon hoard".to_string(),
        })));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));
        let mut class = fighter();

        let grant = svc.request_add_xp(&class).await.unwrap().unwrap();
        assert_eq!(grant.amount, 250);
        assert_eq!(grant.note.as_deref(), Some("Dragon hoard"));
        assert_eq!(class.xp, 0);
        assert_eq!(host.persistence_calls(), 0);

        let entry = svc
            .apply_add_xp(&mut class, grant.amount, grant.note)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.xp_change, 250);
        assert_eq!(entry.note, "Dragon hoard");
        assert_eq!(class.xp, 250);
    }

    #[tokio::test]
    async fn test_request_add_xp_rejects_non_numeric_amounts() {
        let host = Arc::new(host_with_actor(7).script_xp_grant(Some(RawXpInput {
            amount: "lots".to_string(),
            note: String::new(),
        })));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));

        assert!(svc.request_add_xp(&fighter()).await.unwrap().is_none());
        assert_eq!(host.persistence_calls(), 0);
        assert_eq!(host.notices()[0].level, NoticeLevel::Warn);
    }

    #[tokio::test]
    async fn test_request_add_xp_treats_zero_as_cancel() {
        let host = Arc::new(host_with_actor(7).script_xp_grant(Some(RawXpInput {
            amount: "0".to_string(),
            note: "ignored".to_string(),
        })));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));

        assert!(svc.request_add_xp(&fighter()).await.unwrap().is_none());
        assert!(host.notices().is_empty());
    }

    #[tokio::test]
    async fn test_request_add_xp_cancel_grants_nothing() {
        let host = Arc::new(host_with_actor(7).script_xp_grant(None));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));

        assert!(svc.request_add_xp(&fighter()).await.unwrap().is_none());
        assert!(host.notices().is_empty());
    }

    #[tokio::test]
    async fn test_request_add_xp_blocked_class_never_sees_the_dialog() {
        let host = Arc::new(host_with_actor(7).script_xp_grant(Some(RawXpInput {
            amount: "50".to_string(),
            note: String::new(),
        })));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([])));

        let blocked = fighter().with_capabilities(false, true);
        assert!(svc.request_add_xp(&blocked).await.unwrap().is_none());
        assert_eq!(host.notices()[0].level, NoticeLevel::Warn);

        // The scripted dialog answer is still queued for the next caller.
        let grant = svc.request_add_xp(&fighter()).await.unwrap().unwrap();
        assert_eq!(grant.amount, 50);
    }

    #[tokio::test]
    async fn test_request_level_up_collects_the_note() {
        let host = Arc::new(host_with_actor(7).script_note(Some("Felled the wyrm".to_string())));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let mut class = fighter();

        let plan = svc.request_level_up(&class).await.unwrap().unwrap();
        assert_eq!(plan.note.as_deref(), Some("Felled the wyrm"));
        assert_eq!(class.level, 1);
        assert_eq!(host.persistence_calls(), 0);

        svc.apply_level_up(&mut class, plan.note).await.unwrap();
        assert_eq!(class.level, 2);
        assert_eq!(class.xp_log[0].note, "Felled the wyrm");
    }

    #[tokio::test]
    async fn test_request_level_up_blank_note_still_proceeds() {
        let host = Arc::new(host_with_actor(7).script_note(Some("  ".to_string())));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));

        let plan = svc.request_level_up(&fighter()).await.unwrap().unwrap();
        assert_eq!(plan.note, None);
    }

    #[tokio::test]
    async fn test_request_level_up_cancel_touches_nothing() {
        let host = Arc::new(host_with_actor(7).script_note(None));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let class = fighter();

        assert!(svc.request_level_up(&class).await.unwrap().is_none());
        assert_eq!(class.level, 1);
        assert_eq!(host.persistence_calls(), 0);
        assert!(host.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_level_up_blocked_by_capability() {
        let host = Arc::new(host_with_actor(7).script_note(Some("unused".to_string())));
        let svc = service(&host, Arc::new(ScriptedDiceRoller::new([4])));
        let class = fighter().with_capabilities(true, false);

        assert!(svc.request_level_up(&class).await.unwrap().is_none());
        assert_eq!(host.notices()[0].level, NoticeLevel::Warn);
    }

    #[test]
    fn test_xp_amount_parsing() {
        assert_eq!(parse_xp_amount("150"), Some(150));
        assert_eq!(parse_xp_amount(" -25 "), Some(-25));
        assert_eq!(parse_xp_amount("150.5"), Some(151));
        assert_eq!(parse_xp_amount("lots"), None);
        assert_eq!(parse_xp_amount(""), None);
    }
}
