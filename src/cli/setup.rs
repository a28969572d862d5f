//! Setup CLI commands: init, config, sync, and change history

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::{AppTheme, Settings};
use crate::display::sync::format_sync_report;
use crate::error::{PocketbookError, PocketbookResult};
use crate::services::SyncService;
use crate::storage::{initialize_storage, LocalStore};
use crate::sync::Repositories;

/// Settings changes accepted by `config`
#[derive(Args, Default)]
pub struct ConfigArgs {
    /// Default currency for new accounts
    #[arg(long)]
    pub currency: Option<String>,
    /// Theme ("light", "dark", "device")
    #[arg(long)]
    pub theme: Option<String>,
    /// Interface language code
    #[arg(long)]
    pub language: Option<String>,
    /// Signed-in user for remote sync
    #[arg(long)]
    pub user_id: Option<String>,
    /// Root directory of the remote store
    #[arg(long)]
    pub remote_dir: Option<PathBuf>,
    /// Sign out and stop syncing
    #[arg(long, conflicts_with_all = ["user_id", "remote_dir"])]
    pub sign_out: bool,
}

impl ConfigArgs {
    fn is_empty(&self) -> bool {
        self.currency.is_none()
            && self.theme.is_none()
            && self.language.is_none()
            && self.user_id.is_none()
            && self.remote_dir.is_none()
            && !self.sign_out
    }

    fn apply(self, settings: &mut Settings) -> PocketbookResult<()> {
        if let Some(currency) = self.currency {
            let currency = currency.trim().to_uppercase();
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(PocketbookError::Validation(format!(
                    "Invalid currency code: '{}'",
                    currency
                )));
            }
            settings.currency = currency;
        }
        if let Some(theme) = self.theme {
            settings.theme = AppTheme::parse(&theme).ok_or_else(|| {
                PocketbookError::Validation(format!(
                    "Invalid theme: '{}'. Valid themes: light, dark, device",
                    theme
                ))
            })?;
        }
        if let Some(language) = self.language {
            settings.language_code = language;
        }
        if let Some(user_id) = self.user_id {
            settings.user_id = Some(user_id);
        }
        if let Some(remote_dir) = self.remote_dir {
            settings.remote_dir = Some(remote_dir);
        }
        if self.sign_out {
            settings.user_id = None;
            settings.remote_dir = None;
        }
        Ok(())
    }
}

/// Set up a fresh installation
///
/// With a remote configured, every table is reconciled before defaults are
/// written, so a new device picks up the user's existing data. A second pass
/// pushes the defaults of tables the remote did not have yet.
pub fn handle_init_command(
    store: &LocalStore,
    repos: &Repositories,
    settings: &mut Settings,
) -> PocketbookResult<()> {
    let paths = store.paths();
    println!("Initializing pocketbook at: {}", paths.base_dir().display());

    if repos.has_remote() {
        let report = SyncService::new(repos).synchronize_all()?;
        print!("{}", format_sync_report(&report));
    }

    initialize_storage(store)?;

    if repos.has_remote() {
        let report = SyncService::new(repos).synchronize_all()?;
        for (table, outcome) in report.changed() {
            println!("  {:<40} {}", table.to_string(), outcome);
        }
    }

    settings.setup_completed = true;
    settings.save(paths)?;
    info!("setup completed");

    println!("Initialization complete!");
    println!();
    println!("Run 'pocketbook category list' to see your categories.");
    println!("Run 'pocketbook account add <name>' to create your first account.");
    Ok(())
}

/// Show the configuration, applying any requested changes first
pub fn handle_config_command(
    store: &LocalStore,
    settings: &mut Settings,
    args: ConfigArgs,
) -> PocketbookResult<()> {
    let paths = store.paths();

    if !args.is_empty() {
        args.apply(settings)?;
        settings.save(paths)?;
        println!("Settings saved.");
        println!();
    }

    println!("pocketbook configuration");
    println!("========================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Data directory:   {}", paths.data_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  Currency:  {}", settings.currency);
    println!("  Language:  {}", settings.language_code);
    println!("  Theme:     {:?}", settings.theme);
    println!("  Set up:    {}", if settings.setup_completed { "yes" } else { "no" });
    match (&settings.user_id, &settings.remote_dir) {
        (Some(user_id), Some(remote_dir)) => {
            println!("  Remote:    {} at {}", user_id, remote_dir.display())
        }
        _ => println!("  Remote:    not configured"),
    }
    Ok(())
}

/// Reconcile every table with the remote store
pub fn handle_sync_command(repos: &Repositories) -> PocketbookResult<()> {
    if !repos.has_remote() {
        return Err(PocketbookError::Sync(
            "Remote sync is not configured. \
             Run 'pocketbook config --user-id <id> --remote-dir <dir>' first."
                .into(),
        ));
    }

    let report = SyncService::new(repos).synchronize_all()?;
    print!("{}", format_sync_report(&report));
    if report.changed().next().is_none() {
        println!("Everything is up to date.");
    }
    Ok(())
}

/// Print the most recent change history entries
pub fn handle_history_command(store: &LocalStore, count: usize) -> PocketbookResult<()> {
    let entries = store.audit().read_recent(count)?;
    if entries.is_empty() {
        println!("No changes recorded yet.");
    }
    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_args_apply() {
        let mut settings = Settings::default();
        ConfigArgs {
            currency: Some("eur".into()),
            theme: Some("dark".into()),
            user_id: Some("alice".into()),
            remote_dir: Some(PathBuf::from("/tmp/remote")),
            ..Default::default()
        }
        .apply(&mut settings)
        .unwrap();

        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.theme, AppTheme::Dark);
        assert!(settings.remote_enabled());

        ConfigArgs {
            sign_out: true,
            ..Default::default()
        }
        .apply(&mut settings)
        .unwrap();
        assert!(!settings.remote_enabled());
    }

    #[test]
    fn test_invalid_config_values() {
        let mut settings = Settings::default();
        let err = ConfigArgs {
            currency: Some("euro".into()),
            ..Default::default()
        }
        .apply(&mut settings)
        .unwrap_err();
        assert!(err.is_validation());

        assert!(ConfigArgs {
            theme: Some("neon".into()),
            ..Default::default()
        }
        .apply(&mut settings)
        .is_err());
    }
}
