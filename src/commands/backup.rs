use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Subcommand};

use bakul_tani_core::backup;

use super::confirm;
use crate::session::Session;

#[derive(Args)]
pub struct BackupCommand {
    #[command(subcommand)]
    pub command: BackupSubcommand,
}

#[derive(Subcommand)]
pub enum BackupSubcommand {
    /// Write all inventory data to a JSON file
    Export {
        /// Output file (defaults to a dated name in the working directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all inventory data with a backup file
    Restore {
        /// Backup file to restore
        file: PathBuf,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl BackupCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            BackupSubcommand::Export { output } => {
                let text = backup::export_backup(&session.state())?;
                let path = output.clone().unwrap_or_else(|| {
                    PathBuf::from(backup::backup_file_name(Local::now().date_naive()))
                });
                std::fs::write(&path, text)?;
                println!("Backup written to {}", path.display());
                Ok(())
            }

            BackupSubcommand::Restore { file, force } => {
                let text = std::fs::read_to_string(file)
                    .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
                // Validate before asking so a bad file never prompts.
                let action = backup::restore_action(&text, session.is_online())?;

                if !force && !confirm("Replace all current data with this backup?")? {
                    println!("Cancelled");
                    return Ok(());
                }

                session.dispatch(action)?;
                let state = session.state();
                println!(
                    "Restored {} item(s), {} transaction(s) from {}",
                    state.items.len(),
                    state.transactions.len(),
                    file.display()
                );
                Ok(())
            }
        }
    }
}
