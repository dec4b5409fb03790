//! In-memory host adapter
//!
//! `MemoryHost` implements every outbound port against plain in-process
//! state. It backs the crate's own tests and gives embedders a complete
//! host to develop against before wiring a real table up: documents are a
//! map, messages and notices are recorded, and dialog answers come from
//! scripts queued up front.
//!
//! Unscripted dialogs take the agreeable path: roll prompts echo their
//! seed back and confirmations answer yes. Unscripted roll queries report
//! no response.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::application::dto::{RollReplyPayload, RollRequestPayload};
use crate::application::ports::outbound::{
    ConfirmPrompt, ContentPort, DocumentPort, DocumentUpdate, HostDocument, InteractionPort,
    MessageDraft, MessagePort, NotificationPort, Participant, ParticipantPort, RawRollInput,
    RawXpInput, RollPromptSeed, RollQueryPort,
};
use crate::domain::value_objects::{DocumentRef, MessageId, ParticipantId};

/// Severity of a recorded notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A notice surfaced to the local user.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// A message created on the host, with the id it was given.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    pub id: MessageId,
    pub draft: MessageDraft,
}

/// In-memory implementation of all outbound ports.
pub struct MemoryHost {
    local: Option<Participant>,
    participants: RwLock<Vec<Participant>>,
    assignments: RwLock<HashMap<ParticipantId, DocumentRef>>,
    documents: RwLock<HashMap<String, HostDocument>>,

    messages: Mutex<Vec<RecordedMessage>>,
    notices: std::sync::Mutex<Vec<Notice>>,
    effects: Mutex<Vec<(DocumentRef, Value)>>,
    macros: Mutex<Vec<String>>,
    queried: Mutex<Vec<RollRequestPayload>>,
    persistence_calls: AtomicUsize,

    roll_inputs: Mutex<VecDeque<Option<RawRollInput>>>,
    confirms: Mutex<VecDeque<bool>>,
    xp_inputs: Mutex<VecDeque<Option<RawXpInput>>>,
    notes: Mutex<VecDeque<Option<String>>>,
    roll_replies: Mutex<HashMap<ParticipantId, VecDeque<Option<RollReplyPayload>>>>,
    table_draws: Mutex<VecDeque<String>>,

    failing_macros: HashSet<String>,
    failing_effects: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            local: None,
            participants: RwLock::new(Vec::new()),
            assignments: RwLock::new(HashMap::new()),
            documents: RwLock::new(HashMap::new()),
            messages: Mutex::new(Vec::new()),
            notices: std::sync::Mutex::new(Vec::new()),
            effects: Mutex::new(Vec::new()),
            macros: Mutex::new(Vec::new()),
            queried: Mutex::new(Vec::new()),
            persistence_calls: AtomicUsize::new(0),
            roll_inputs: Mutex::new(VecDeque::new()),
            confirms: Mutex::new(VecDeque::new()),
            xp_inputs: Mutex::new(VecDeque::new()),
            notes: Mutex::new(VecDeque::new()),
            roll_replies: Mutex::new(HashMap::new()),
            table_draws: Mutex::new(VecDeque::new()),
            failing_macros: HashSet::new(),
            failing_effects: false,
        }
    }

    /// Set the participant this host runs as. Also joins them to the table.
    pub fn with_local(mut self, participant: Participant) -> Self {
        self.participants.get_mut().push(participant.clone());
        self.local = Some(participant);
        self
    }

    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.participants.get_mut().push(participant);
        self
    }

    pub fn with_document(mut self, document: HostDocument) -> Self {
        self.documents
            .get_mut()
            .insert(document.reference.as_str().to_string(), document);
        self
    }

    pub fn with_assignment(mut self, participant: ParticipantId, reference: DocumentRef) -> Self {
        self.assignments.get_mut().insert(participant, reference);
        self
    }

    /// Queue an answer for the next roll parameter dialog.
    pub fn script_roll_input(mut self, input: Option<RawRollInput>) -> Self {
        self.roll_inputs.get_mut().push_back(input);
        self
    }

    /// Queue an answer for the next confirmation dialog.
    pub fn script_confirm(mut self, answer: bool) -> Self {
        self.confirms.get_mut().push_back(answer);
        self
    }

    /// Queue an answer for the next experience grant dialog.
    pub fn script_xp_grant(mut self, input: Option<RawXpInput>) -> Self {
        self.xp_inputs.get_mut().push_back(input);
        self
    }

    /// Queue an answer for the next note dialog.
    pub fn script_note(mut self, note: Option<String>) -> Self {
        self.notes.get_mut().push_back(note);
        self
    }

    /// Queue the reply a recipient gives to their next roll query.
    pub fn script_roll_reply(
        mut self,
        recipient: ParticipantId,
        reply: Option<RollReplyPayload>,
    ) -> Self {
        self.roll_replies
            .get_mut()
            .entry(recipient)
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue the text of the next table draw.
    pub fn script_table_draw(mut self, text: impl Into<String>) -> Self {
        self.table_draws.get_mut().push_back(text.into());
        self
    }

    /// Make a named macro fail when executed.
    pub fn fail_macro(mut self, name: impl Into<String>) -> Self {
        self.failing_macros.insert(name.into());
        self
    }

    /// Make every effect application fail.
    pub fn fail_effects(mut self) -> Self {
        self.failing_effects = true;
        self
    }

    pub async fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.lock().await.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub async fn effects(&self) -> Vec<(DocumentRef, Value)> {
        self.effects.lock().await.clone()
    }

    /// Names of the macros that ran, in execution order.
    pub async fn executed_macros(&self) -> Vec<String> {
        self.macros.lock().await.clone()
    }

    /// Requests sent out through the query transport.
    pub async fn queried_requests(&self) -> Vec<RollRequestPayload> {
        self.queried.lock().await.clone()
    }

    /// How many persistence round trips the host has served. A batched
    /// update counts once.
    pub fn persistence_calls(&self) -> usize {
        self.persistence_calls.load(Ordering::SeqCst)
    }

    pub async fn document(&self, reference: &str) -> Option<HostDocument> {
        self.documents.read().await.get(reference).cloned()
    }

    fn push_notice(&self, level: NoticeLevel, text: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(Notice {
                level,
                text: text.to_string(),
            });
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge a partial patch into a document's data. Object keys overwrite
/// shallowly; a non-object patch replaces the data wholesale.
fn apply_patch(documents: &mut HashMap<String, HostDocument>, update: &DocumentUpdate) {
    let document = documents
        .entry(update.reference.as_str().to_string())
        .or_insert_with(|| {
            HostDocument::new(
                update.reference.clone(),
                update.reference.as_str(),
                Value::Object(serde_json::Map::new()),
            )
        });
    match (&mut document.data, &update.patch) {
        (Value::Object(data), Value::Object(patch)) => {
            for (key, value) in patch {
                data.insert(key.clone(), value.clone());
            }
        }
        (data, patch) => *data = patch.clone(),
    }
}

fn walk_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[async_trait]
impl ParticipantPort for MemoryHost {
    async fn local_participant(&self) -> Result<Participant> {
        self.local
            .clone()
            .ok_or_else(|| anyhow!("No local participant configured"))
    }

    async fn resolve_participant(&self, id: &ParticipantId) -> Result<Option<Participant>> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .find(|p| p.id == *id)
            .cloned())
    }

    async fn assigned_character(&self, id: &ParticipantId) -> Result<Option<HostDocument>> {
        let reference = match self.assignments.read().await.get(id).cloned() {
            Some(reference) => reference,
            None => return Ok(None),
        };
        Ok(self.documents.read().await.get(reference.as_str()).cloned())
    }
}

#[async_trait]
impl DocumentPort for MemoryHost {
    async fn update_document(&self, reference: &DocumentRef, patch: Value) -> Result<()> {
        let mut documents = self.documents.write().await;
        apply_patch(
            &mut documents,
            &DocumentUpdate::new(reference.clone(), patch),
        );
        self.persistence_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_documents(&self, updates: &[DocumentUpdate]) -> Result<()> {
        let mut documents = self.documents.write().await;
        for update in updates {
            apply_patch(&mut documents, update);
        }
        self.persistence_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn resolve_reference(&self, reference: &str) -> Result<Option<HostDocument>> {
        Ok(self.documents.read().await.get(reference).cloned())
    }

    async fn read_property(&self, reference: &DocumentRef, path: &str) -> Result<Option<Value>> {
        let documents = self.documents.read().await;
        let document = match documents.get(reference.as_str()) {
            Some(document) => document,
            None => return Ok(None),
        };
        Ok(walk_path(&document.data, path).cloned())
    }
}

#[async_trait]
impl MessagePort for MemoryHost {
    async fn create_message(&self, draft: MessageDraft) -> Result<MessageId> {
        let id = MessageId::new();
        self.messages
            .lock()
            .await
            .push(RecordedMessage { id, draft });
        Ok(id)
    }

    async fn moderator_recipients(&self) -> Result<Vec<ParticipantId>> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .filter(|p| p.is_moderator())
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl InteractionPort for MemoryHost {
    async fn prompt_roll_parameters(&self, seed: &RollPromptSeed) -> Result<Option<RawRollInput>> {
        match self.roll_inputs.lock().await.pop_front() {
            Some(input) => Ok(input),
            None => Ok(Some(RawRollInput::from_seed(seed))),
        }
    }

    async fn confirm(&self, _prompt: &ConfirmPrompt) -> Result<bool> {
        Ok(self.confirms.lock().await.pop_front().unwrap_or(true))
    }

    async fn prompt_xp_grant(&self, _title: &str) -> Result<Option<RawXpInput>> {
        Ok(self.xp_inputs.lock().await.pop_front().flatten())
    }

    async fn prompt_note(&self, _title: &str) -> Result<Option<String>> {
        Ok(self.notes.lock().await.pop_front().flatten())
    }
}

#[async_trait]
impl RollQueryPort for MemoryHost {
    async fn query_roll(
        &self,
        recipient: &ParticipantId,
        payload: RollRequestPayload,
    ) -> Result<Option<RollReplyPayload>> {
        self.queried.lock().await.push(payload);
        let mut replies = self.roll_replies.lock().await;
        Ok(replies
            .get_mut(recipient)
            .and_then(|queue| queue.pop_front())
            .flatten())
    }
}

impl NotificationPort for MemoryHost {
    fn info(&self, message: &str) {
        self.push_notice(NoticeLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push_notice(NoticeLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push_notice(NoticeLevel::Error, message);
    }
}

#[async_trait]
impl ContentPort for MemoryHost {
    async fn create_effect(&self, target: &DocumentRef, effect: &Value) -> Result<()> {
        if self.failing_effects {
            bail!("Effect creation is disabled on this host");
        }
        self.effects
            .lock()
            .await
            .push((target.clone(), effect.clone()));
        Ok(())
    }

    async fn roll_table(&self, table: &str) -> Result<String> {
        match self.table_draws.lock().await.pop_front() {
            Some(text) => Ok(text),
            None => Ok(format!("{} draw", table)),
        }
    }

    async fn execute_macro(&self, name: &str, _context: &Value) -> Result<()> {
        if self.failing_macros.contains(name) {
            bail!("Macro {} is broken on this host", name);
        }
        self.macros.lock().await.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::outbound::ParticipantRole;

    #[tokio::test]
    async fn test_patches_merge_shallowly() {
        let host = MemoryHost::new().with_document(HostDocument::new(
            DocumentRef::new("actor.1"),
            "Ilsa",
            serde_json::json!({ "maxHp": 7, "name": "Ilsa" }),
        ));

        let reference = DocumentRef::new("actor.1");
        host.update_document(&reference, serde_json::json!({ "maxHp": 12 }))
            .await
            .unwrap();

        let document = host.document("actor.1").await.unwrap();
        assert_eq!(document.data["maxHp"], 12);
        assert_eq!(document.data["name"], "Ilsa");
        assert_eq!(host.persistence_calls(), 1);
    }

    #[tokio::test]
    async fn test_batched_updates_count_as_one_round_trip() {
        let host = MemoryHost::new();
        host.update_documents(&[
            DocumentUpdate::new(DocumentRef::new("a"), serde_json::json!({ "x": 1 })),
            DocumentUpdate::new(DocumentRef::new("b"), serde_json::json!({ "y": 2 })),
        ])
        .await
        .unwrap();

        assert_eq!(host.persistence_calls(), 1);
        assert_eq!(host.document("a").await.unwrap().data["x"], 1);
        assert_eq!(host.document("b").await.unwrap().data["y"], 2);
    }

    #[tokio::test]
    async fn test_read_property_walks_dotted_paths() {
        let host = MemoryHost::new().with_document(HostDocument::new(
            DocumentRef::new("actor.1"),
            "Ilsa",
            serde_json::json!({ "abilities": { "str": { "mod": 2 } } }),
        ));

        let reference = DocumentRef::new("actor.1");
        let value = host
            .read_property(&reference, "abilities.str.mod")
            .await
            .unwrap();
        assert_eq!(value, Some(serde_json::json!(2)));

        let missing = host.read_property(&reference, "abilities.dex").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_assignment_resolves_to_the_document() {
        let participant = Participant::new(ParticipantId::new(), "Otto", ParticipantRole::Player);
        let host = MemoryHost::new()
            .with_participant(participant.clone())
            .with_document(HostDocument::new(
                DocumentRef::new("actor.1"),
                "Ilsa",
                serde_json::json!({}),
            ))
            .with_assignment(participant.id, DocumentRef::new("actor.1"));

        let character = host.assigned_character(&participant.id).await.unwrap();
        assert_eq!(character.unwrap().name, "Ilsa");

        let unassigned = host.assigned_character(&ParticipantId::new()).await.unwrap();
        assert!(unassigned.is_none());
    }

    #[tokio::test]
    async fn test_moderators_are_collected_from_the_table() {
        let gm = Participant::new(ParticipantId::new(), "Otto", ParticipantRole::Moderator);
        let player = Participant::new(ParticipantId::new(), "Ilsa", ParticipantRole::Player);
        let host = MemoryHost::new()
            .with_local(gm.clone())
            .with_participant(player);

        assert_eq!(host.moderator_recipients().await.unwrap(), vec![gm.id]);
    }

    #[tokio::test]
    async fn test_unscripted_dialogs_take_the_agreeable_path() {
        let host = MemoryHost::new();
        let seed = RollPromptSeed::new("Roll");

        let echoed = host.prompt_roll_parameters(&seed).await.unwrap().unwrap();
        assert_eq!(echoed.dice_count, "1");
        assert_eq!(echoed.die_size, "20");

        assert!(host
            .confirm(&ConfirmPrompt::new("Sure?", "Quite sure?"))
            .await
            .unwrap());
        assert!(host.prompt_xp_grant("XP").await.unwrap().is_none());
    }
}
