//! Conversation controller
//!
//! Owns the message log and the single in-flight chat request. A request is
//! started by [`ConversationController::submit`] and recorded by
//! [`ConversationController::settle`]; between the two the controller is
//! [`RequestState::Awaiting`] and every further submit is ignored.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::conversation::{Conversation, LogObserver};
use crate::service::{ChatError, ChatReply, ChatService};
use crate::state::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Awaiting,
}

/// The outstanding call lives inside the `Awaiting` variant, so there is
/// never an `Awaiting` state without exactly one request behind it.
enum Flight {
    Idle,
    Awaiting(JoinHandle<Result<ChatReply, ChatError>>),
}

pub struct ConversationController {
    log: Conversation,
    flight: Flight,
    service: Arc<dyn ChatService>,
}

impl ConversationController {
    /// Starts idle with the greeting already in the log.
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self {
            log: Conversation::seeded(),
            flight: Flight::Idle,
            service,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn LogObserver>) {
        self.log.subscribe(observer);
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn request_state(&self) -> RequestState {
        match self.flight {
            Flight::Idle => RequestState::Idle,
            Flight::Awaiting(_) => RequestState::Awaiting,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.request_state() == RequestState::Awaiting
    }

    /// Send `raw` to the chat service. Returns whether the submission was
    /// accepted; blank input and input arriving while a request is in flight
    /// are dropped without touching the log.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, raw: &str) -> bool {
        let text = raw.trim();
        if text.is_empty() {
            tracing::trace!("ignoring blank submission");
            return false;
        }
        if let Flight::Awaiting(_) = self.flight {
            tracing::trace!("ignoring submission while a request is in flight");
            return false;
        }

        self.log.append(Message::user(text));

        let service = Arc::clone(&self.service);
        let message = text.to_string();
        self.flight = Flight::Awaiting(tokio::spawn(async move { service.send(&message).await }));
        tracing::debug!(chars = text.chars().count(), "chat request issued");
        true
    }

    /// Wait for the in-flight request and append its outcome. Returns at once
    /// when idle.
    ///
    /// Cancel safe: dropping the future before it completes leaves the
    /// request in flight, to be settled by a later call.
    pub async fn settle(&mut self) {
        let Flight::Awaiting(handle) = &mut self.flight else {
            return;
        };

        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(ChatError::Interrupted(join_error.to_string())),
        };
        self.flight = Flight::Idle;

        let message = match outcome {
            Ok(reply) => {
                tracing::info!(
                    repos = reply.repos.as_ref().map_or(0, Vec::len),
                    "chat reply received"
                );
                Message::assistant(reply.text, reply.repos)
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                Message::error()
            }
        };
        self.log.append(message);
    }
}

impl Drop for ConversationController {
    /// Aborts the in-flight request; its reply would have nowhere to go.
    fn drop(&mut self) {
        if let Flight::Awaiting(handle) = &self.flight {
            handle.abort();
        }
    }
}
