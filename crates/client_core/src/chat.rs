//! Assistant chat widget state: a transcript plus one pending reply at most.

use shared::domain::ChatMessage;
use tracing::{debug, warn};

use crate::{error::ApiError, StorefrontApi};

pub const GREETING: &str = "Hello, I'm your personal AI!";
pub const CHAT_FAILURE: &str = "Failed to get response from the assistant";

/// Ticket for a question whose reply has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub message: String,
}

/// What a call to [`ChatSession::send`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    Failed,
    /// Blank input, or a reply was still pending; nothing was sent.
    Ignored,
}

#[derive(Debug)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    typing: bool,
    error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            transcript: vec![ChatMessage::from_assistant(GREETING)],
            typing: false,
            error: None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Last failure; stays until the next send starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Appends the user's message and raises the typing indicator. Blank
    /// input, or a send while a reply is pending, does nothing.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() {
            return None;
        }
        if self.typing {
            warn!("assistant reply still pending; ignoring new message");
            return None;
        }
        self.transcript.push(ChatMessage::from_user(text));
        self.typing = true;
        self.error = None;
        Some(PendingReply {
            message: text.to_string(),
        })
    }

    pub fn complete_send(&mut self, pending: PendingReply, result: Result<String, ApiError>) {
        self.typing = false;
        match result {
            Ok(reply) => {
                debug!(chars = reply.len(), "assistant replied");
                self.transcript.push(ChatMessage::from_assistant(reply));
            }
            Err(err) => {
                warn!(error = %err, message = %pending.message, "assistant request failed");
                self.error = Some(failure_message(&err));
            }
        }
    }

    pub async fn send<A>(&mut self, api: &A, text: &str) -> SendOutcome
    where
        A: StorefrontApi + ?Sized,
    {
        let Some(pending) = self.begin_send(text) else {
            return SendOutcome::Ignored;
        };
        let result = api.ask(&pending.message).await;
        let outcome = if result.is_ok() {
            SendOutcome::Replied
        } else {
            SendOutcome::Failed
        };
        self.complete_send(pending, result);
        outcome
    }
}

fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Transport(message) => message.clone(),
        ApiError::Status { .. } => err
            .chat_error_message()
            .unwrap_or_else(|| CHAT_FAILURE.to_string()),
        ApiError::Encode(_) | ApiError::Decode(_) => CHAT_FAILURE.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/chat_tests.rs"]
mod tests;
