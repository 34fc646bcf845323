use clap::Args;

use bakul_tani_core::{Action, Notification};

use super::confirm;
use crate::session::Session;

/// Erase items, transactions, categories and warehouses
#[derive(Args)]
pub struct ResetCommand {
    /// Skip confirmation prompt
    #[arg(long, short)]
    pub force: bool,
}

impl ResetCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        if !self.force
            && !confirm("Erase all inventory data? Your profile and theme are kept.")?
        {
            println!("Cancelled");
            return Ok(());
        }

        session.dispatch_all([
            Action::ResetData,
            Action::AddNotification(Notification::success("All data has been reset.")),
        ])?;
        Ok(())
    }
}
