use clap::{Args, Subcommand};

use crate::session::Session;

/// Simulate the device going online or offline
#[derive(Args)]
pub struct NetworkCommand {
    #[command(subcommand)]
    pub command: NetworkSubcommand,
}

#[derive(Subcommand)]
pub enum NetworkSubcommand {
    /// Show the simulated connection state
    Status,

    /// Reconnect; pending entities reconcile after the sync delay
    Online,

    /// Disconnect; new categories and warehouses are marked pending
    Offline,
}

impl NetworkCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            NetworkSubcommand::Status => {
                let state = session.state();
                let label = if session.is_online() { "online" } else { "offline" };
                if session.is_forced_offline() {
                    println!("{} (forced by configuration)", label);
                } else {
                    println!("{}", label);
                }
                println!("Pending: {}", state.pending_count());
                Ok(())
            }
            NetworkSubcommand::Online => {
                if !session.set_online(true)? {
                    println!("Already online");
                }
                Ok(())
            }
            NetworkSubcommand::Offline => {
                if !session.set_online(false)? {
                    println!("Already offline");
                }
                Ok(())
            }
        }
    }
}
