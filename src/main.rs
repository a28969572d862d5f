use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pocketbook::cli::{
    handle_account_command, handle_budget_command, handle_category_command,
    handle_config_command, handle_history_command, handle_init_command, handle_record_command,
    handle_sync_command, handle_widget_command,
};
use pocketbook::config::{PocketbookPaths, Settings};
use pocketbook::storage::LocalStore;
use pocketbook::sync::Repositories;

#[derive(Parser)]
#[command(
    name = "pocketbook",
    version,
    about = "Personal finance ledger with budgets and remote sync",
    long_about = "pocketbook keeps accounts, categorized records, and repeating budgets \
                  in local JSON tables, and reconciles them with a remote store so \
                  several devices share one ledger."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize storage, pulling existing data from the remote first
    Init,

    /// Show or change configuration
    Config(pocketbook::cli::ConfigArgs),

    /// Reconcile every table with the remote store
    Sync,

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(pocketbook::cli::AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(pocketbook::cli::CategoryCommands),

    /// Expense, income, and transfer records
    #[command(subcommand, alias = "rec")]
    Record(pocketbook::cli::RecordCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(pocketbook::cli::BudgetCommands),

    /// Home-screen widgets and navigation
    #[command(subcommand)]
    Widget(pocketbook::cli::WidgetCommands),
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("POCKETBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = PocketbookPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let store = LocalStore::new(paths)?;
    store.load_all()?;
    let repos = Repositories::from_settings(&store, &settings);

    let needs_setup = !matches!(
        cli.command,
        None | Some(Commands::Init) | Some(Commands::Config(_))
    );
    if needs_setup && !(store.is_initialized() && settings.setup_completed) {
        bail!("pocketbook is not initialized. Run 'pocketbook init' first.");
    }

    match cli.command {
        Some(Commands::Init) => handle_init_command(&store, &repos, &mut settings)?,
        Some(Commands::Config(args)) => handle_config_command(&store, &mut settings, args)?,
        Some(Commands::Sync) => handle_sync_command(&repos)?,
        Some(Commands::History { count }) => handle_history_command(&store, count)?,
        Some(Commands::Account(cmd)) => handle_account_command(&repos, &settings, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&repos, cmd)?,
        Some(Commands::Record(cmd)) => handle_record_command(&repos, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&repos, cmd)?,
        Some(Commands::Widget(cmd)) => handle_widget_command(&repos, cmd)?,
        None => {
            println!("pocketbook - personal finance ledger");
            println!();
            println!("Run 'pocketbook --help' for usage information.");
            println!("Run 'pocketbook init' to get started.");
        }
    }

    Ok(())
}
