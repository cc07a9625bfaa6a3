//! flashdeck CLI
//!
//! Command-line and terminal interface for flashdeck - spaced-repetition
//! flashcards backed by the flashdeck server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use flashdeck_core::{AppContext, CardId, Config};

mod commands;
mod editor;
mod output;
mod tui;

use commands::cards::CardEdits;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "flashdeck")]
#[command(about = "flashdeck - Spaced-repetition flashcards")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Log in and store the session
    Login {
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register { email: String },
    /// Activate an account with the token from the activation email
    Activate { token: String },
    /// Forget the stored session
    Logout,
    /// Show session and server status
    Status,
    /// Manage cards
    Cards {
        #[command(subcommand)]
        command: Option<CardCommands>,
    },
    /// Review due cards, or one card by ID
    Review {
        id: Option<CardId>,
        /// Rate every card with this value (1-4) without prompting
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
        rating: Option<u8>,
    },
    /// Show learning statistics
    #[command(alias = "statistics")]
    Stats,
    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Show or change notification settings
    Notifications {
        #[command(subcommand)]
        command: Option<NotificationCommands>,
    },
    /// Subscription and account management
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// List cards
    #[command(alias = "ls")]
    List {
        /// Only cards due for review
        #[arg(short, long)]
        due: bool,
    },
    /// Show card details
    Show { id: CardId },
    /// Create a new card
    #[command(alias = "create")]
    Add {
        word: String,
        definition: String,
        #[arg(short, long)]
        example: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Edit a card (opens $EDITOR when no field is given)
    Edit {
        id: CardId,
        #[arg(long)]
        word: Option<String>,
        #[arg(long)]
        definition: Option<String>,
        #[arg(long)]
        example: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Import cards from a CSV or XLSX file
    Import { path: PathBuf },
}

#[derive(Subcommand)]
enum ProfileCommands {
    Show,
    Set {
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    Show,
    /// Set a flag (on/off) or study_reminder_time (HH:MM)
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Cancel the premium subscription
    CancelSubscription {
        #[arg(short, long)]
        force: bool,
    },
    /// Delete the account and all cards
    Delete {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (api_url, theme_mode, color_theme, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the server
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // Handle TUI (default when no command given)
    let Some(command) = cli.command else {
        return tui::run(config).await;
    };
    if matches!(command, Commands::Tui) {
        return tui::run(config).await;
    }

    init_cli_logging();
    let ctx = AppContext::open_with_config(config)?;

    let result = match command {
        Commands::Tui | Commands::Config { .. } => Ok(()), // Handled above
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, email, password, &output).await
        }
        Commands::Register { email } => commands::auth::register(&ctx, email, &output).await,
        Commands::Activate { token } => commands::auth::activate(&ctx, token, &output).await,
        Commands::Logout => commands::auth::logout(&ctx, &output),
        Commands::Status => commands::status::show(&ctx, &output).await,
        Commands::Cards { command } => handle_card_command(command, &ctx, &output).await,
        Commands::Review { id, rating } => {
            commands::review::run(&ctx, id, rating, &output).await
        }
        Commands::Stats => commands::stats::show(&ctx, &output).await,
        Commands::Profile { command } => match command {
            Some(ProfileCommands::Show) | None => commands::profile::show(&ctx, &output).await,
            Some(ProfileCommands::Set { nickname, gender }) => {
                commands::profile::set(&ctx, nickname, gender, &output).await
            }
        },
        Commands::Notifications { command } => match command {
            Some(NotificationCommands::Show) | None => {
                commands::notifications::show(&ctx, &output).await
            }
            Some(NotificationCommands::Set { key, value }) => {
                commands::notifications::set(&ctx, key, value, &output).await
            }
        },
        Commands::Account { command } => match command {
            AccountCommands::CancelSubscription { force } => {
                commands::account::cancel_subscription(&ctx, force, &output).await
            }
            AccountCommands::Delete { force } => {
                commands::account::delete(&ctx, force, &output).await
            }
        },
    };

    ctx.teardown();
    result
}

async fn handle_card_command(
    command: Option<CardCommands>,
    ctx: &AppContext,
    output: &Output,
) -> Result<()> {
    match command {
        Some(CardCommands::List { due }) => commands::cards::list(ctx, due, output).await,
        None => commands::cards::list(ctx, false, output).await,
        Some(CardCommands::Show { id }) => commands::cards::show(ctx, id, output).await,
        Some(CardCommands::Add {
            word,
            definition,
            example,
            notes,
        }) => commands::cards::add(ctx, word, definition, example, notes, output).await,
        Some(CardCommands::Edit {
            id,
            word,
            definition,
            example,
            notes,
        }) => {
            let edits = CardEdits {
                word,
                definition,
                example,
                notes,
            };
            commands::cards::edit(ctx, id, edits, output).await
        }
        Some(CardCommands::Import { path }) => commands::cards::import(ctx, path, output).await,
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr when FLASHDECK_LOG is set, e.g. `FLASHDECK_LOG=debug`
fn init_cli_logging() {
    let Ok(level) = std::env::var("FLASHDECK_LOG") else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::new(format!(
        "flashdeck_core={level},flashdeck_cli={level}"
    ));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_starts_tui() {
        let cli = Cli::try_parse_from(["flashdeck"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_review_rating_range() {
        let cli = Cli::try_parse_from(["flashdeck", "review", "--rating", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Review {
                id: None,
                rating: Some(3)
            })
        ));
        assert!(Cli::try_parse_from(["flashdeck", "review", "--rating", "5"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["flashdeck", "cards", "list", "--due", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Some(Commands::Cards {
                command: Some(CardCommands::List { due: true })
            })
        ));
    }
}
