//! Conversational assistant over the current movement view
//!
//! Each question is sent with the conversation so far and a system prompt
//! that summarizes what the user is looking at. Failures never reach the
//! caller: they are logged and answered with [`APOLOGY`].

use std::fmt::Write;

use tracing::error;

use crate::models::MovementType;
use crate::services::FilteredMovements;

use super::client::{ChatMessage, GenerativeClient};

/// Reply used whenever the model cannot be reached or answers badly
pub const APOLOGY: &str =
    "Sorry, I couldn't get an answer right now. Please try again in a moment.";

/// Rows of the view included in the prompt
const PROMPT_ROW_LIMIT: usize = 20;

const BASE_PROMPT: &str = "You are a bookkeeping assistant for a small food business. \
Answer briefly and only from the movements described below. \
Sales are money in; purchases, expenses and adjustments are money out. \
If the data does not answer the question, say so.";

/// Summarize a filtered view for the system prompt
pub fn summarize_view(view: &FilteredMovements<'_>, currency_symbol: &str) -> String {
    let mut summary = String::new();

    let counts: Vec<String> = MovementType::all()
        .iter()
        .map(|t| {
            let n = view.visible.iter().filter(|m| m.movement_type == *t).count();
            format!("{} {}", n, t.as_str())
        })
        .collect();

    let _ = writeln!(
        summary,
        "Visible movements: {} ({})",
        view.len(),
        counts.join(", ")
    );
    let _ = writeln!(
        summary,
        "Inflow: {}  Outflow: {}  Net: {}",
        view.inflow_total.format_with_symbol(currency_symbol),
        view.outflow_total.format_with_symbol(currency_symbol),
        view.net().format_with_symbol(currency_symbol)
    );

    if !view.is_empty() {
        let _ = writeln!(summary, "Most recent movements:");
        for movement in view.visible.iter().take(PROMPT_ROW_LIMIT) {
            let _ = writeln!(
                summary,
                "- {} | {} | {} | {} | {} | {}",
                movement.date,
                movement.document_label(),
                movement.movement_type.as_str(),
                movement.status.as_str(),
                movement.counterpart,
                movement.signed_total().format_with_symbol(currency_symbol)
            );
        }
        if view.len() > PROMPT_ROW_LIMIT {
            let _ = writeln!(summary, "({} more not shown)", view.len() - PROMPT_ROW_LIMIT);
        }
    }

    summary
}

/// Multi-turn assistant bound to one view summary
pub struct ChatAssistant {
    client: GenerativeClient,
    context: String,
    history: Vec<ChatMessage>,
}

impl ChatAssistant {
    pub fn new(client: GenerativeClient) -> Self {
        Self {
            client,
            context: String::new(),
            history: Vec::new(),
        }
    }

    /// Replace the view summary sent with each question
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = context.into();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    fn system_prompt(&self) -> String {
        if self.context.is_empty() {
            BASE_PROMPT.to_string()
        } else {
            format!("{}\n\n{}", BASE_PROMPT, self.context)
        }
    }

    /// Ask a question. Returns the model's reply, or [`APOLOGY`] when the
    /// request fails; a failed exchange is not kept in the history.
    pub async fn ask(&mut self, question: &str) -> String {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(question));

        match self.client.complete(&messages, false).await {
            Ok(reply) => {
                self.history.push(ChatMessage::user(question));
                self.history.push(ChatMessage::assistant(reply.clone()));
                reply
            }
            Err(e) => {
                error!(error = %e, "assistant request failed");
                APOLOGY.to_string()
            }
        }
    }
}
