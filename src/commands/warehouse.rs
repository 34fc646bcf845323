use clap::{Args, Subcommand};

use bakul_tani_core::entry;

use super::{confirm, find_warehouse, truncate, OutputFormat};
use crate::session::Session;

#[derive(Args)]
pub struct WarehouseCommand {
    #[command(subcommand)]
    pub command: WarehouseSubcommand,
}

#[derive(Subcommand)]
pub enum WarehouseSubcommand {
    /// List warehouses
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a warehouse
    Add {
        /// Name of the warehouse
        name: String,

        /// Storage capacity
        #[arg(long)]
        capacity: Option<u32>,
    },

    /// Rename a warehouse or change its capacity
    Update {
        /// Warehouse ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New capacity
        #[arg(long, conflicts_with = "no_capacity")]
        capacity: Option<u32>,

        /// Clear the capacity
        #[arg(long)]
        no_capacity: bool,
    },

    /// Delete a warehouse
    Delete {
        /// Warehouse ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Make a warehouse the current one
    Select {
        /// Warehouse ID or name
        identifier: String,
    },
}

impl WarehouseCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        match &self.command {
            WarehouseSubcommand::List { format } => {
                if state.warehouses.is_empty() {
                    println!("No warehouses found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&state.warehouses)?);
                    }
                    OutputFormat::Text => {
                        let current = state.current_warehouse().map(|w| w.id.as_str());
                        println!(
                            "  {:<34}  {:<28}  {:>8}  {:>6}  {:<8}",
                            "ID", "NAME", "CAPACITY", "ITEMS", "SYNC"
                        );
                        println!("{}", "-".repeat(96));
                        for warehouse in &state.warehouses {
                            let marker = if Some(warehouse.id.as_str()) == current {
                                "*"
                            } else {
                                " "
                            };
                            let capacity = warehouse
                                .capacity
                                .map_or_else(|| "-".to_string(), |c| c.to_string());
                            let count = state
                                .items
                                .iter()
                                .filter(|i| i.warehouse_id.as_deref() == Some(&warehouse.id))
                                .count();
                            println!(
                                "{} {:<34}  {:<28}  {:>8}  {:>6}  {:<8}",
                                marker,
                                warehouse.id,
                                truncate(&warehouse.name, 28),
                                capacity,
                                count,
                                warehouse.sync_status
                            );
                        }
                        println!("\nTotal: {} warehouse(s)", state.warehouses.len());
                    }
                }
                Ok(())
            }

            WarehouseSubcommand::Add { name, capacity } => {
                session.dispatch_all(entry::add_warehouse(name, *capacity)?)?;
                if let Some(warehouse) = session.state().warehouses.last() {
                    println!("Added warehouse: {}", warehouse);
                    println!("  id: {}", warehouse.id);
                }
                Ok(())
            }

            WarehouseSubcommand::Update {
                identifier,
                name,
                capacity,
                no_capacity,
            } => {
                if name.is_none() && capacity.is_none() && !no_capacity {
                    return Err("Nothing to update. Provide at least one option.".into());
                }
                let warehouse = find_warehouse(&state, identifier)?;
                let name = name.as_deref().unwrap_or(&warehouse.name);
                let capacity = if *no_capacity {
                    None
                } else {
                    capacity.or(warehouse.capacity)
                };
                session.dispatch_all(entry::update_warehouse(
                    &state,
                    &warehouse.id,
                    name,
                    capacity,
                )?)?;
                Ok(())
            }

            WarehouseSubcommand::Delete { identifier, force } => {
                let warehouse = find_warehouse(&state, identifier)?;
                let stocked = state
                    .items
                    .iter()
                    .filter(|i| i.warehouse_id.as_deref() == Some(&warehouse.id))
                    .count();

                if !force {
                    let prompt = if stocked > 0 {
                        format!(
                            "Delete warehouse '{}'? {} item(s) will keep a dangling reference.",
                            warehouse.name, stocked
                        )
                    } else {
                        format!("Delete warehouse '{}'?", warehouse.name)
                    };
                    if !confirm(&prompt)? {
                        println!("Cancelled");
                        return Ok(());
                    }
                }

                session.dispatch_all(entry::delete_warehouse(&state, &warehouse.id)?)?;
                Ok(())
            }

            WarehouseSubcommand::Select { identifier } => {
                let warehouse = find_warehouse(&state, identifier)?;
                session.dispatch_all(entry::select_warehouse(&state, &warehouse.id)?)?;
                println!("Current warehouse: {}", warehouse.name);
                Ok(())
            }
        }
    }
}
