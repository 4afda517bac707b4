//! Hosted-model assistant features
//!
//! A chat assistant that answers questions about the visible movements, and
//! a scanner that reads ingredient lists from photos. Both degrade to a
//! harmless default when the model is unavailable.

pub mod chat;
pub mod client;
pub mod scanner;

pub use chat::{summarize_view, ChatAssistant, APOLOGY};
pub use client::{ChatMessage, GenerativeClient};
pub use scanner::{IngredientScanner, ScannedIngredient};
