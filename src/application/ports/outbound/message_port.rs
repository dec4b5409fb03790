//! Message port - Interface for posting results to the shared table
//!
//! Messages are the one broadcast surface this crate writes to. Visibility
//! is decided here, before the draft crosses the boundary, so every host
//! renders the same audience for the same roll mode.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::value_objects::{DocumentRef, MessageId, ParticipantId, RollMode};

use super::document_port::HostDocument;

/// Who a message speaks as.
#[derive(Debug, Clone)]
pub struct SpeakerDescriptor {
    pub actor_ref: Option<DocumentRef>,
    pub alias: String,
}

impl SpeakerDescriptor {
    /// Speak as a resolved host document.
    pub fn for_document(document: &HostDocument) -> Self {
        Self {
            actor_ref: Some(document.reference.clone()),
            alias: document.name.clone(),
        }
    }

    /// Speak as a known actor without resolving the full document.
    pub fn for_actor(actor_ref: DocumentRef, alias: impl Into<String>) -> Self {
        Self {
            actor_ref: Some(actor_ref),
            alias: alias.into(),
        }
    }

    /// Speak under a plain display name with no actor behind it.
    pub fn aliased(alias: impl Into<String>) -> Self {
        Self {
            actor_ref: None,
            alias: alias.into(),
        }
    }
}

/// A message ready to be created on the host.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub content: String,
    pub flavor: Option<String>,
    pub speaker: SpeakerDescriptor,
    /// Structured roll payload for hosts that render dice natively.
    pub roll: Option<Value>,
    /// `None` means unrestricted delivery.
    pub recipients: Option<Vec<ParticipantId>>,
    /// Set for blind rolls: the roller must not see their own result.
    pub hidden_from_author: bool,
}

impl MessageDraft {
    pub fn new(content: impl Into<String>, speaker: SpeakerDescriptor) -> Self {
        Self {
            content: content.into(),
            flavor: None,
            speaker,
            roll: None,
            recipients: None,
            hidden_from_author: false,
        }
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    pub fn with_roll(mut self, roll: Value) -> Self {
        self.roll = Some(roll);
        self
    }

    /// Restrict the draft's audience for a roll mode.
    ///
    /// Public drafts stay unrestricted. Private and self rolls whisper to
    /// the author alone. Blind rolls go to the moderators and are flagged
    /// hidden from the author.
    pub fn apply_roll_mode(
        mut self,
        mode: RollMode,
        author: ParticipantId,
        moderators: &[ParticipantId],
    ) -> Self {
        match mode {
            RollMode::Public => {}
            RollMode::Private | RollMode::SelfOnly => {
                self.recipients = Some(vec![author]);
            }
            RollMode::Blind => {
                self.recipients = Some(moderators.to_vec());
                self.hidden_from_author = true;
            }
        }
        self
    }
}

/// Port for creating table messages
#[async_trait]
pub trait MessagePort: Send + Sync {
    /// Create a message and return the host's id for it.
    async fn create_message(&self, draft: MessageDraft) -> Result<MessageId>;

    /// Participants currently acting as moderators, for blind delivery.
    async fn moderator_recipients(&self) -> Result<Vec<ParticipantId>>;
}
