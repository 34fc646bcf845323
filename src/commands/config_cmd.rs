use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;

const DEFAULT_CONFIG: &str = "\
# Bakul Tani configuration
#
# Every value can also be set through the environment:
#   BAKUL_DATA_DIR, BAKUL_OFFLINE, BAKUL_SYNC_DELAY_MS, BAKUL_AUTO_SYNC

# Where the inventory snapshot and accounts are stored.
# Relative paths are resolved against this file's directory.
# data_dir: /path/to/data

# Keep the app offline regardless of `bakul network online`.
offline: false

sync:
  # Milliseconds between reconnecting and reconciling pending entities.
  delay_ms: 1000
  # Reconcile pending entities before each command when online.
  auto_sync: false
";

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("offline: {}", config.offline.value);
                        println!("  source: {}", config.offline.source);
                        println!();

                        println!("sync.delay_ms: {}", config.sync.delay_ms);
                        println!("sync.auto_sync: {}", config.sync.auto_sync);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init { force } => {
                let path = config
                    .config_file
                    .clone()
                    .unwrap_or_else(Config::default_config_path);
                if path.exists() && !force {
                    return Err(format!(
                        "Config file already exists: {} (use --force to overwrite)",
                        path.display()
                    )
                    .into());
                }
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, DEFAULT_CONFIG)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        }
    }
}
