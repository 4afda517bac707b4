use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use costbook_cli::cli::{
    handle_assistant_command, handle_export_command, handle_movement_command, AssistantCommands,
    ExportArgs, MovementCommands,
};
use costbook_cli::config::{CostbookPaths, Settings};
use costbook_cli::storage::init::{initialize_storage, needs_initialization};
use costbook_cli::storage::Storage;

/// Environment variable holding the log filter
const LOG_ENV: &str = "COSTBOOK_LOG";

#[derive(Parser)]
#[command(
    name = "costbook",
    version,
    about = "Cost and inventory bookkeeping for small food businesses",
    long_about = "Costbook records sales, purchases, expenses and stock adjustments, \
                  and shows them filtered by type, date and counterpart with running \
                  inflow and outflow totals."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Movement commands
    #[command(subcommand, alias = "mv")]
    Movement(MovementCommands),

    /// Export the filtered movement list
    Export(ExportArgs),

    /// Hosted-model assistant
    #[command(subcommand)]
    Assistant(AssistantCommands),

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(format!("costbook_cli={}", default_level))
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let paths = CostbookPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Movement(cmd)) => {
            handle_movement_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&storage, args)?;
        }
        Some(Commands::Assistant(cmd)) => {
            handle_assistant_command(&storage, &settings, cmd).await?;
        }
        Some(Commands::Init) => {
            if !needs_initialization(&paths) {
                println!("Costbook is already set up at: {}", paths.base_dir().display());
                return Ok(());
            }
            println!("Initializing Costbook at: {}", paths.base_dir().display());
            initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Record your first movement with:");
            println!("  costbook movement add sale --customer \"Walk-in\" --total 12.50");
        }
        Some(Commands::Config) => {
            println!("Costbook Configuration");
            println!("======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!("  List limit:      {}", settings.list_limit);
            println!("  Assistant model: {}", settings.assistant.model);
            println!("  API key env:     {}", settings.assistant.api_key_env);
        }
        None => {
            println!("Costbook - cost and inventory bookkeeping");
            println!();
            println!("Run 'costbook --help' for usage information.");
            println!("Run 'costbook movement list' to see recorded movements.");
        }
    }

    Ok(())
}
