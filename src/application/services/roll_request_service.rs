//! Roll Request Service - Brokers rolls between participants
//!
//! One participant asks another to make a roll. The request crosses the
//! transport, the receiver confirms and adjusts the parameters, the dice
//! are evaluated on the receiver's side, and the result travels back. A
//! request aimed at the local participant skips the transport and runs the
//! same pipeline directly, minus the confirmation step.
//!
//! Declines and cancelled dialogs are normal outcomes, not errors: they
//! resolve to `Ok(None)` and leave messages and documents untouched.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info, instrument, warn};

use crate::application::dto::{RollOutcomePayload, RollRequestPayload};
use crate::application::ports::outbound::{
    ConfirmPrompt, DiceRollerPort, HostDocument, InteractionPort, MessageDraft, MessagePort,
    NotificationPort, Participant, ParticipantPort, ParticipantRef, RollEvaluation,
    RollPromptSeed, RollQueryPort, SpeakerDescriptor,
};
use crate::domain::value_objects::{ParticipantId, RollParameters, RollRequestId};

/// Errors that can abort a roll request
#[derive(Debug, thiserror::Error)]
pub enum RollRequestError {
    /// The requested participant id resolved to nobody
    #[error("Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// A host port failed
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Options accompanying a roll request.
#[derive(Debug, Clone)]
pub struct RollRequestOptions {
    /// Parameters offered to the roller; they may adjust them.
    pub parameters: RollParameters,
    pub title: Option<String>,
    pub flavor: Option<String>,
    /// When false the roll is evaluated without posting a message.
    pub show_result: bool,
    /// Surface a local notice when the other side declines or goes silent.
    pub notify_decline: bool,
}

impl Default for RollRequestOptions {
    fn default() -> Self {
        Self {
            parameters: RollParameters::default(),
            title: None,
            flavor: None,
            show_result: true,
            notify_decline: true,
        }
    }
}

/// A completed roll request, whichever side of the table it ran on.
#[derive(Debug, Clone)]
pub struct RollRequestOutcome {
    pub evaluation: RollEvaluation,
    pub roller: Participant,
    /// Parameters as finally confirmed by the roller.
    pub parameters: RollParameters,
}

impl RollRequestOutcome {
    pub fn formula(&self) -> &str {
        &self.evaluation.formula
    }
}

/// Service brokering roll requests between participants
pub struct RollRequestService {
    participants: Arc<dyn ParticipantPort>,
    interactions: Arc<dyn InteractionPort>,
    dice: Arc<dyn DiceRollerPort>,
    messages: Arc<dyn MessagePort>,
    queries: Arc<dyn RollQueryPort>,
    notifications: Arc<dyn NotificationPort>,
}

impl RollRequestService {
    pub fn new(
        participants: Arc<dyn ParticipantPort>,
        interactions: Arc<dyn InteractionPort>,
        dice: Arc<dyn DiceRollerPort>,
        messages: Arc<dyn MessagePort>,
        queries: Arc<dyn RollQueryPort>,
        notifications: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            participants,
            interactions,
            dice,
            messages,
            queries,
            notifications,
        }
    }

    /// Negotiate roll parameters with the local user.
    ///
    /// Pure negotiation: nothing is rolled or posted. Cancelling the dialog
    /// resolves to `Ok(None)`.
    pub async fn configure_roll(
        &self,
        seed: &RollPromptSeed,
    ) -> Result<Option<RollParameters>, RollRequestError> {
        let input = self
            .interactions
            .prompt_roll_parameters(seed)
            .await
            .context("Roll parameter dialog failed")?;
        Ok(input.map(|raw| raw.into_parameters(seed.reversed_success)))
    }

    /// Ask a participant to make a roll.
    ///
    /// A request aimed at the local participant runs locally without a
    /// confirmation step. Anything else is delivered through the query
    /// transport; no response and declines both resolve to `Ok(None)`.
    #[instrument(skip(self, participant, options), fields(show_result = options.show_result))]
    pub async fn request_roll(
        &self,
        participant: ParticipantRef,
        options: RollRequestOptions,
    ) -> Result<Option<RollRequestOutcome>, RollRequestError> {
        let target = self.resolve(participant).await?;
        let local = self
            .participants
            .local_participant()
            .await
            .context("Local participant lookup failed")?;

        if target.id == local.id {
            debug!("Roll request targets the local participant, running locally");
            return self.perform_local(local, &options).await;
        }

        let payload = RollRequestPayload {
            request_id: RollRequestId::new(),
            requester: local.id,
            requester_name: local.name.clone(),
            parameters: options.parameters.clone(),
            title: options.title.clone(),
            flavor: options.flavor.clone(),
            show_result: options.show_result,
        };

        info!(recipient = %target.id, "Requesting a roll from {}", target.name);
        let reply = self
            .queries
            .query_roll(&target.id, payload)
            .await
            .context("Roll query transport failed")?;

        let outcome = match reply {
            None => {
                info!("Roll request to {} got no response", target.name);
                if options.notify_decline {
                    self.notifications
                        .warn(&format!("{} did not respond to the roll request", target.name));
                }
                return Ok(None);
            }
            Some(reply) => match reply.outcome {
                None => {
                    info!("{} declined the roll request", target.name);
                    if options.notify_decline {
                        self.notifications
                            .warn(&format!("{} declined the roll request", target.name));
                    }
                    return Ok(None);
                }
                Some(outcome) => outcome,
            },
        };

        Ok(Some(RollRequestOutcome {
            evaluation: RollEvaluation {
                formula: outcome.formula,
                total: outcome.total,
                dice: outcome.dice,
            },
            roller: target,
            parameters: outcome.parameters,
        }))
    }

    /// Fan the same request out to several participants.
    ///
    /// Every reference is resolved before anything is dispatched, so an
    /// unknown id fails the whole call. Outcomes come back in input order
    /// with `None` slots for declines and silence.
    pub async fn request_roll_from_all(
        &self,
        participants: Vec<ParticipantRef>,
        options: RollRequestOptions,
    ) -> Result<Vec<Option<RollRequestOutcome>>, RollRequestError> {
        let mut resolved = Vec::with_capacity(participants.len());
        for participant in participants {
            resolved.push(self.resolve(participant).await?);
        }

        let requests = resolved
            .into_iter()
            .map(|target| self.request_roll(ParticipantRef::Resolved(target), options.clone()));
        let outcomes = futures_util::future::join_all(requests).await;
        outcomes.into_iter().collect()
    }

    /// Handle a roll request delivered to this participant.
    ///
    /// Returns the outcome to send back on the query channel; `Ok(None)`
    /// means the request was declined or abandoned and nothing was posted.
    #[instrument(skip(self, payload), fields(requester = %payload.requester_name))]
    pub async fn handle_incoming(
        &self,
        payload: RollRequestPayload,
    ) -> Result<Option<RollOutcomePayload>, RollRequestError> {
        let local = self
            .participants
            .local_participant()
            .await
            .context("Local participant lookup failed")?;

        let character = match self
            .participants
            .assigned_character(&local.id)
            .await
            .context("Character assignment lookup failed")?
        {
            Some(character) => character,
            None => {
                warn!("Roll request received with no character assigned");
                self.notifications
                    .warn("You have no assigned character, so you cannot take this roll");
                return Ok(None);
            }
        };

        let title = payload
            .title
            .clone()
            .unwrap_or_else(|| "Roll request".to_string());
        let mut body = format!(
            "{} asks you to roll {}",
            payload.requester_name,
            payload.parameters.formula()
        );
        if payload.parameters.reversed_success {
            body.push_str(" (rolling low succeeds)");
        }
        if let Some(flavor) = &payload.flavor {
            body.push('\n');
            body.push_str(flavor);
        }

        let confirmed = self
            .interactions
            .confirm(&ConfirmPrompt::new(title.clone(), body))
            .await
            .context("Confirmation dialog failed")?;
        if !confirmed {
            info!("Declined roll request from {}", payload.requester_name);
            return Ok(None);
        }

        let seed = RollPromptSeed::from_parameters(title, &payload.parameters);
        let raw = match self
            .interactions
            .prompt_roll_parameters(&seed)
            .await
            .context("Roll parameter dialog failed")?
        {
            Some(raw) => raw,
            None => {
                info!("Parameter dialog cancelled after accepting the request");
                return Ok(None);
            }
        };
        let parameters = raw.into_parameters(payload.parameters.reversed_success);

        let evaluation = self
            .evaluate_and_post(
                &local,
                Some(&character),
                &parameters,
                payload.flavor.as_deref(),
                payload.show_result,
            )
            .await?;

        Ok(Some(RollOutcomePayload {
            formula: evaluation.formula.clone(),
            total: evaluation.total,
            dice: evaluation.dice,
            parameters,
            roller: local.id,
        }))
    }

    async fn resolve(
        &self,
        participant: ParticipantRef,
    ) -> Result<Participant, RollRequestError> {
        match participant {
            ParticipantRef::Resolved(participant) => Ok(participant),
            ParticipantRef::ById(id) => self
                .participants
                .resolve_participant(&id)
                .await
                .context("Participant lookup failed")?
                .ok_or(RollRequestError::UnknownParticipant(id)),
        }
    }

    /// The local short-circuit: negotiate, evaluate, post. No confirmation,
    /// the requester is the roller.
    async fn perform_local(
        &self,
        local: Participant,
        options: &RollRequestOptions,
    ) -> Result<Option<RollRequestOutcome>, RollRequestError> {
        let character = self
            .participants
            .assigned_character(&local.id)
            .await
            .context("Character assignment lookup failed")?;

        let title = options.title.clone().unwrap_or_else(|| "Roll".to_string());
        let seed = RollPromptSeed::from_parameters(title, &options.parameters);
        let raw = match self
            .interactions
            .prompt_roll_parameters(&seed)
            .await
            .context("Roll parameter dialog failed")?
        {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let parameters = raw.into_parameters(options.parameters.reversed_success);

        let evaluation = self
            .evaluate_and_post(
                &local,
                character.as_ref(),
                &parameters,
                options.flavor.as_deref(),
                options.show_result,
            )
            .await?;

        Ok(Some(RollRequestOutcome {
            evaluation,
            roller: local,
            parameters,
        }))
    }

    /// Evaluate the final formula and, unless suppressed, post the result
    /// with the roll mode's audience.
    async fn evaluate_and_post(
        &self,
        roller: &Participant,
        character: Option<&HostDocument>,
        parameters: &RollParameters,
        flavor: Option<&str>,
        show_result: bool,
    ) -> Result<RollEvaluation, RollRequestError> {
        let formula = parameters.formula();
        let evaluation = self
            .dice
            .roll(character.map(|c| &c.reference), &formula)
            .await
            .context("Dice evaluation failed")?;
        info!(total = evaluation.total, "Evaluated {}", evaluation.formula);

        if show_result {
            let moderators = self
                .messages
                .moderator_recipients()
                .await
                .context("Moderator lookup failed")?;
            let speaker = match character {
                Some(document) => SpeakerDescriptor::for_document(document),
                None => SpeakerDescriptor::aliased(roller.name.clone()),
            };
            let mut draft = MessageDraft::new(
                format!("{} = {}", evaluation.formula, evaluation.total),
                speaker,
            )
            .with_roll(serde_json::json!({
                "formula": evaluation.formula,
                "total": evaluation.total,
                "dice": evaluation.dice,
            }));
            if let Some(flavor) = flavor {
                draft = draft.with_flavor(flavor);
            }
            let draft = draft.apply_roll_mode(parameters.roll_mode, roller.id, &moderators);
            self.messages
                .create_message(draft)
                .await
                .context("Failed to post the roll result")?;
        }

        Ok(evaluation)
    }
}
