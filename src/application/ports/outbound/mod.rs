//! Outbound ports - Interfaces that the application requires from the host

mod content_port;
mod dice_port;
mod document_port;
mod interaction_port;
mod message_port;
mod notification_port;
mod participant_port;
mod roll_query_port;

pub use content_port::ContentPort;
pub use dice_port::{DiceRollerPort, RollEvaluation};
pub use document_port::{DocumentPort, DocumentUpdate, HostDocument};
pub use interaction_port::{
    ConfirmPrompt, InteractionPort, RawRollInput, RawXpInput, RollPromptSeed,
};
pub use message_port::{MessageDraft, MessagePort, SpeakerDescriptor};
pub use notification_port::NotificationPort;
pub use participant_port::{Participant, ParticipantPort, ParticipantRef, ParticipantRole};
pub use roll_query_port::RollQueryPort;
