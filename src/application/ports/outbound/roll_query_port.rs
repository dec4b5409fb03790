//! Roll query port - Cross-participant request transport
//!
//! The transport owns delivery, timeout, and retry policy. This layer only
//! distinguishes "a reply came back" from "the channel gave up".

use anyhow::Result;
use async_trait::async_trait;

use crate::application::dto::{RollReplyPayload, RollRequestPayload};
use crate::domain::value_objects::ParticipantId;

/// Port for delivering a roll request to another participant and awaiting
/// their reply
#[async_trait]
pub trait RollQueryPort: Send + Sync {
    /// Deliver a request and suspend until the channel resolves.
    ///
    /// `Ok(None)` means the transport reported no response; a reply with an
    /// empty outcome means the recipient declined.
    async fn query_roll(
        &self,
        recipient: &ParticipantId,
        payload: RollRequestPayload,
    ) -> Result<Option<RollReplyPayload>>;
}
