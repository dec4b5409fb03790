//! Participant port - Who is at the table right now

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ParticipantId;

use super::document_port::HostDocument;

/// Role a participant holds in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Moderator,
    Player,
    Spectator,
}

/// A connected participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub role: ParticipantRole,
}

impl Participant {
    pub fn new(id: ParticipantId, name: impl Into<String>, role: ParticipantRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    pub fn is_moderator(&self) -> bool {
        self.role == ParticipantRole::Moderator
    }
}

/// A participant argument as callers hand it in: either an id still to be
/// resolved, or a participant already in hand. Resolution happens once, at
/// the service boundary.
#[derive(Debug, Clone)]
pub enum ParticipantRef {
    ById(ParticipantId),
    Resolved(Participant),
}

impl From<ParticipantId> for ParticipantRef {
    fn from(id: ParticipantId) -> Self {
        ParticipantRef::ById(id)
    }
}

impl From<Participant> for ParticipantRef {
    fn from(participant: Participant) -> Self {
        ParticipantRef::Resolved(participant)
    }
}

/// Port for participant lookup and character assignment
#[async_trait]
pub trait ParticipantPort: Send + Sync {
    /// The participant this process is running as.
    async fn local_participant(&self) -> Result<Participant>;

    /// Look up a participant by id.
    async fn resolve_participant(&self, id: &ParticipantId) -> Result<Option<Participant>>;

    /// The character document assigned to a participant, if any.
    async fn assigned_character(&self, id: &ParticipantId) -> Result<Option<HostDocument>>;
}
