use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod session;

use commands::{
    AccountCommand, BackupCommand, CategoryCommand, ConfigCommand, DispatchCommand, ItemCommand,
    NetworkCommand, ProfileCommand, ReportCommand, ResetCommand, StockCommand, SyncCommand,
    WarehouseCommand,
};
use config::Config;
use session::{try_auto_sync, Session};

#[derive(Parser)]
#[command(name = "bakul")]
#[command(version)]
#[command(about = "Offline-first inventory ledger for farm supply stores", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage items
    Item(ItemCommand),

    /// Record stock in, stock out and corrections
    Stock(StockCommand),

    /// Manage categories
    Category(CategoryCommand),

    /// Manage warehouses
    Warehouse(WarehouseCommand),

    /// Dashboard, statistics and history
    Report(ReportCommand),

    /// View and edit your profile
    Profile(ProfileCommand),

    /// Register or sign in
    Account(AccountCommand),

    /// Export or restore a backup file
    Backup(BackupCommand),

    /// Erase all inventory data
    Reset(ResetCommand),

    /// Simulate going online or offline
    Network(NetworkCommand),

    /// Reconcile data created while offline
    Sync(SyncCommand),

    /// Dispatch a raw action
    Dispatch(DispatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bakul=warn,bakul_tani_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let mut session = Session::open(&config)?;
    if !matches!(command, Commands::Sync(_) | Commands::Network(_)) {
        try_auto_sync(&mut session, &config);
    }

    let result = match command {
        Commands::Item(cmd) => cmd.run(&mut session),
        Commands::Stock(cmd) => cmd.run(&mut session),
        Commands::Category(cmd) => cmd.run(&mut session),
        Commands::Warehouse(cmd) => cmd.run(&mut session),
        Commands::Report(cmd) => cmd.run(&mut session),
        Commands::Profile(cmd) => cmd.run(&mut session),
        Commands::Account(cmd) => cmd.run(&mut session),
        Commands::Backup(cmd) => cmd.run(&mut session),
        Commands::Reset(cmd) => cmd.run(&mut session),
        Commands::Network(cmd) => cmd.run(&mut session),
        Commands::Sync(cmd) => cmd.run(&mut session, &config).map_err(Into::into),
        Commands::Dispatch(cmd) => cmd.run(&mut session),
        Commands::Config(cmd) => cmd.run(&config),
    };

    // Show whatever the command raised, even if it then failed.
    session.print_notifications();
    result
}
