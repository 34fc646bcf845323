use clap::{Args, Subcommand};

use bakul_tani_core::entry;

use super::find_item;
use crate::session::Session;

#[derive(Args)]
pub struct StockCommand {
    #[command(subcommand)]
    pub command: StockSubcommand,
}

#[derive(Subcommand)]
pub enum StockSubcommand {
    /// Book incoming stock
    In {
        /// Item ID or name
        item: String,

        /// Quantity received
        quantity: i64,

        /// Notes (supplier, delivery note, ...)
        #[arg(long, short, default_value = "")]
        notes: String,
    },

    /// Book outgoing stock
    Out {
        /// Item ID or name
        item: String,

        /// Quantity issued
        quantity: i64,

        /// Notes (customer, purpose, ...)
        #[arg(long, short, default_value = "")]
        notes: String,
    },

    /// Correct stock to a counted amount
    Adjust {
        /// Item ID or name
        item: String,

        /// Counted stock on hand
        count: i64,

        /// Reason for the correction
        #[arg(long, short)]
        notes: Option<String>,
    },
}

impl StockSubcommand {
    fn item(&self) -> &str {
        match self {
            StockSubcommand::In { item, .. }
            | StockSubcommand::Out { item, .. }
            | StockSubcommand::Adjust { item, .. } => item,
        }
    }
}

impl StockCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();
        let item = find_item(&state, self.command.item())?;

        let actions = match &self.command {
            StockSubcommand::In {
                quantity, notes, ..
            } => entry::receive(&state, &item.id, *quantity, notes)?,
            StockSubcommand::Out {
                quantity, notes, ..
            } => entry::issue(&state, &item.id, *quantity, notes)?,
            StockSubcommand::Adjust { count, notes, .. } => {
                entry::adjust(&state, &item.id, *count, notes.as_deref())?
            }
        };
        if actions.is_empty() {
            println!("Stock for {} is already {} {}", item.name, item.quantity, item.unit);
            return Ok(());
        }
        session.dispatch_all(actions)?;

        if let Some(updated) = session.state().item(&item.id) {
            println!("{}", updated);
        }
        Ok(())
    }
}
