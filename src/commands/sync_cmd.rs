//! Reconciliation of entities created or edited while offline.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::session::{Session, SessionError};

/// Reconcile pending categories and warehouses
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show pending entities and sync settings
    Status,
}

impl SyncCommand {
    pub fn run(&self, session: &mut Session, config: &Config) -> Result<(), SyncCommandError> {
        match &self.command {
            None => self.sync(session, config),
            Some(SyncSubcommand::Status) => {
                self.status(session, config);
                Ok(())
            }
        }
    }

    fn sync(&self, session: &mut Session, config: &Config) -> Result<(), SyncCommandError> {
        let pending = session.state().pending_count();
        if pending > 0 {
            println!(
                "Reconciling {} pending entit{} (delay {} ms)...",
                pending,
                if pending == 1 { "y" } else { "ies" },
                config.sync.delay_ms
            );
        }

        if session.reconcile()? {
            println!("Sync complete.");
        } else {
            println!("Already up to date.");
        }
        Ok(())
    }

    fn status(&self, session: &Session, config: &Config) {
        let state = session.state();

        println!("Sync Status");
        println!("===========");
        println!();

        let network = if session.is_forced_offline() {
            "offline (forced by configuration)"
        } else if session.is_online() {
            "online"
        } else {
            "offline"
        };
        println!("Network:   {}", network);
        println!(
            "Auto-sync: {}",
            if config.sync.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        println!("Delay:     {} ms", config.sync.delay_ms);
        println!();

        let categories: Vec<_> = state.categories.iter().filter(|c| c.is_pending()).collect();
        let warehouses: Vec<_> = state.warehouses.iter().filter(|w| w.is_pending()).collect();
        if categories.is_empty() && warehouses.is_empty() {
            println!("Nothing pending.");
            return;
        }

        println!("Pending:");
        for category in categories {
            println!("  category   {}", category.name);
        }
        for warehouse in warehouses {
            println!("  warehouse  {}", warehouse.name);
        }
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    Session(SessionError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::Session(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Session(e) => Some(e),
        }
    }
}

impl From<SessionError> for SyncCommandError {
    fn from(e: SessionError) -> Self {
        SyncCommandError::Session(e)
    }
}
