// src/services/dispatcher.rs
use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    config::ReplyOrder,
    error::Result,
    message::{ChatRequest, ChatResponse, Sender},
    services::{backend::ChatBackend, renderer::Renderer},
};

/// Shown in place of a reply whenever a request fails for any reason.
pub const BACKEND_UNREACHABLE: &str = "⚠️ Failed to reach backend server";

/// The text the user is currently composing.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InputField {
    value: String,
}

impl InputField {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }
}

/// The result of one request, reported back to the UI loop.
#[derive(Debug)]
pub struct Completion {
    pub seq: u64,
    pub outcome: Result<ChatResponse>,
}

pub struct Dispatcher<B> {
    backend: Arc<B>,
    session_id: String,
    order: ReplyOrder,
    completions: mpsc::UnboundedSender<Completion>,
    last_seq: u64,
    in_flight: usize,
    // send-order bookkeeping
    next_to_render: u64,
    held: BTreeMap<u64, String>,
}

impl<B: ChatBackend> Dispatcher<B> {
    /// Returns the dispatcher together with the receiving end its request
    /// tasks report to.
    pub fn new(
        backend: Arc<B>,
        session_id: impl Into<String>,
        order: ReplyOrder,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            backend,
            session_id: session_id.into(),
            order,
            completions: tx,
            last_seq: 0,
            in_flight: 0,
            next_to_render: 1,
            held: BTreeMap::new(),
        };
        (dispatcher, rx)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Requests issued but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Echoes the trimmed input, clears it and fires one request in the
    /// background. Blank input is ignored and leaves the field untouched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit<R: Renderer + ?Sized>(
        &mut self,
        input: &mut InputField,
        renderer: &mut R,
    ) -> Option<u64> {
        let text = input
            .value()
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
            .to_string();
        if text.is_empty() {
            return None;
        }

        renderer.append(&text, Sender::User);
        input.clear();

        self.last_seq += 1;
        self.in_flight += 1;
        let seq = self.last_seq;
        debug!(seq, session_id = %self.session_id, "dispatching message");

        let request = ChatRequest {
            session_id: self.session_id.clone(),
            message: text,
        };
        let backend = Arc::clone(&self.backend);
        let tx = self.completions.clone();
        tokio::spawn(async move {
            let outcome = backend.send(&request).await;
            // nobody left to render it
            let _ = tx.send(Completion { seq, outcome });
        });

        Some(seq)
    }

    /// Renders the bot side of a finished request according to the reply
    /// order policy.
    pub fn complete<R: Renderer + ?Sized>(&mut self, completion: Completion, renderer: &mut R) {
        let Completion { seq, outcome } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);

        let text = match outcome {
            Ok(response) => {
                debug!(seq, "reply received");
                response.reply
            }
            Err(e) => {
                warn!(seq, error = %e, "chat request failed");
                BACKEND_UNREACHABLE.to_string()
            }
        };

        match self.order {
            ReplyOrder::Arrival => renderer.append(&text, Sender::Bot),
            ReplyOrder::Send => {
                self.held.insert(seq, text);
                while let Some(text) = self.held.remove(&self.next_to_render) {
                    renderer.append(&text, Sender::Bot);
                    self.next_to_render += 1;
                }
                if !self.held.is_empty() {
                    debug!(
                        waiting_for = self.next_to_render,
                        held = self.held.len(),
                        "holding replies until earlier requests finish"
                    );
                }
            }
        }
    }
}
