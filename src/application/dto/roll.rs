//! Roll request wire payloads
//!
//! These cross the transport between participants. They carry no persisted
//! identity: a request lives for exactly one query round trip and is never
//! retried by this layer.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ParticipantId, RollParameters, RollRequestId};

fn default_true() -> bool {
    true
}

/// A roll request as delivered to the receiving participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollRequestPayload {
    pub request_id: RollRequestId,
    pub requester: ParticipantId,
    /// Display name, so the receiver's confirm dialog can name who asks.
    pub requester_name: String,
    pub parameters: RollParameters,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub flavor: Option<String>,
    /// When false the receiver evaluates without posting a message.
    #[serde(default = "default_true")]
    pub show_result: bool,
}

/// The evaluated result travelling back to the requester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollOutcomePayload {
    pub formula: String,
    pub total: i32,
    pub dice: Vec<i32>,
    /// Parameters as finally confirmed by the roller.
    pub parameters: RollParameters,
    pub roller: ParticipantId,
}

/// Reply to a roll request. An absent outcome means the receiver declined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollReplyPayload {
    pub request_id: RollRequestId,
    #[serde(default)]
    pub outcome: Option<RollOutcomePayload>,
}

impl RollReplyPayload {
    pub fn accepted(request_id: RollRequestId, outcome: RollOutcomePayload) -> Self {
        Self {
            request_id,
            outcome: Some(outcome),
        }
    }

    pub fn declined(request_id: RollRequestId) -> Self {
        Self {
            request_id,
            outcome: None,
        }
    }

    pub fn is_declined(&self) -> bool {
        self.outcome.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{RollMode, RollModifier};

    #[test]
    fn test_payload_round_trips_through_json() {
        let payload = RollRequestPayload {
            request_id: RollRequestId::new(),
            requester: ParticipantId::new(),
            requester_name: "Otto".to_string(),
            parameters: RollParameters::new(
                1,
                6,
                RollModifier::Fixed(0),
                true,
                RollMode::Private,
            ),
            title: Some("Listen at the door".to_string()),
            flavor: None,
            show_result: true,
        };

        let wire = serde_json::to_string(&payload).unwrap();
        let back: RollRequestPayload = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.request_id, payload.request_id);
        assert_eq!(back.parameters, payload.parameters);
        assert!(back.show_result);
    }

    #[test]
    fn test_show_result_defaults_on_when_absent() {
        let wire = format!(
            r#"{{"request_id":"{}","requester":"{}","requester_name":"Otto","parameters":{{"dice_count":1,"die_size":20,"modifier":{{"type":"fixed","value":0}},"reversed_success":false,"roll_mode":"public"}}}}"#,
            RollRequestId::new(),
            ParticipantId::new(),
        );
        let payload: RollRequestPayload = serde_json::from_str(&wire).unwrap();
        assert!(payload.show_result);
        assert!(payload.title.is_none());
    }

    #[test]
    fn test_reply_without_outcome_is_a_decline() {
        let reply = RollReplyPayload::declined(RollRequestId::new());
        assert!(reply.is_declined());
    }
}
