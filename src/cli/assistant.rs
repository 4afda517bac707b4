//! Assistant CLI commands
//!
//! Ask questions about the filtered movement list, or read ingredients from
//! a photo.

use clap::Subcommand;
use std::path::PathBuf;

use crate::assistant::{summarize_view, ChatAssistant, GenerativeClient, IngredientScanner};
use crate::config::Settings;
use crate::error::CostbookResult;
use crate::services::MovementSession;
use crate::storage::Storage;

use super::filter::FilterArgs;

#[derive(Subcommand, Debug)]
pub enum AssistantCommands {
    /// Ask a question about the (filtered) movements
    Chat {
        /// The question
        message: String,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List the ingredients in a receipt or delivery-note photo
    Scan {
        /// Image file
        image: PathBuf,
    },
}

pub async fn handle_assistant_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AssistantCommands,
) -> CostbookResult<()> {
    let client = GenerativeClient::from_settings(&settings.assistant);
    if !client.has_api_key() {
        eprintln!(
            "No API key found. Set {} to use the assistant.",
            settings.assistant.api_key_env
        );
    }

    match cmd {
        AssistantCommands::Chat { message, filter } => {
            let mut session = MovementSession::with_filter(filter.to_spec()?);
            session.refresh(storage);
            if let Some(notice) = session.notice() {
                eprintln!("{}", notice);
            }

            let mut assistant = ChatAssistant::new(client);
            assistant.set_context(summarize_view(&session.view(), &settings.currency_symbol));

            println!("{}", assistant.ask(&message).await);
        }

        AssistantCommands::Scan { image } => {
            let scanner = IngredientScanner::new(client);
            let ingredients = scanner.scan_file(&image).await;

            if ingredients.is_empty() {
                println!("No ingredients found.");
                return Ok(());
            }

            for item in ingredients {
                match (item.quantity, item.unit.as_deref()) {
                    (Some(q), Some(unit)) => println!("- {} ({} {})", item.name, q, unit),
                    (Some(q), None) => println!("- {} ({})", item.name, q),
                    _ => println!("- {}", item.name),
                }
            }
        }
    }

    Ok(())
}
