use clap::{Args, Subcommand};

use bakul_tani_core::entry;

use super::{confirm, find_category, truncate, OutputFormat};
use crate::session::Session;

#[derive(Args)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand)]
pub enum CategorySubcommand {
    /// List categories with their item counts
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a category
    Add {
        /// Name of the category
        name: String,
    },

    /// Rename a category
    Rename {
        /// Category ID or name
        identifier: String,

        /// New name
        name: String,
    },

    /// Delete a category (its items become uncategorized)
    Delete {
        /// Category ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl CategoryCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        match &self.command {
            CategorySubcommand::List { format } => {
                if state.categories.is_empty() {
                    println!("No categories found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&state.categories)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<34}  {:<28}  {:>6}  {:<8}", "ID", "NAME", "ITEMS", "SYNC");
                        println!("{}", "-".repeat(82));
                        for category in &state.categories {
                            let count = state
                                .items
                                .iter()
                                .filter(|i| i.category_id.as_deref() == Some(&category.id))
                                .count();
                            println!(
                                "{:<34}  {:<28}  {:>6}  {:<8}",
                                category.id,
                                truncate(&category.name, 28),
                                count,
                                category.sync_status
                            );
                        }
                        println!("\nTotal: {} category(ies)", state.categories.len());
                    }
                }
                Ok(())
            }

            CategorySubcommand::Add { name } => {
                session.dispatch_all(entry::add_category(name)?)?;
                if let Some(category) = session.state().categories.last() {
                    println!("Added category: {}", category);
                    println!("  id: {}", category.id);
                }
                Ok(())
            }

            CategorySubcommand::Rename { identifier, name } => {
                let category = find_category(&state, identifier)?;
                session.dispatch_all(entry::rename_category(&state, &category.id, name)?)?;
                Ok(())
            }

            CategorySubcommand::Delete { identifier, force } => {
                let category = find_category(&state, identifier)?;

                if !force {
                    let prompt = format!("Delete category '{}'?", category.name);
                    if !confirm(&prompt)? {
                        println!("Cancelled");
                        return Ok(());
                    }
                }

                session.dispatch_all(entry::delete_category(&state, &category.id)?)?;
                Ok(())
            }
        }
    }
}
