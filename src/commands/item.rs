use clap::{Args, Subcommand, ValueEnum};

use bakul_tani_core::entry::{self, ItemDetails, NewItem};
use bakul_tani_core::reports;
use bakul_tani_core::Item;

use super::{find_category, find_item, truncate, OutputFormat};
use crate::session::Session;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum SortOrder {
    #[default]
    NameAsc,
    NameDesc,
    QtyAsc,
    QtyDesc,
}

impl SortOrder {
    fn sort(self, items: &mut [&Item]) {
        match self {
            SortOrder::NameAsc => items.sort_by_key(|i| i.name.to_lowercase()),
            SortOrder::NameDesc => {
                items.sort_by_key(|i| std::cmp::Reverse(i.name.to_lowercase()))
            }
            SortOrder::QtyAsc => items.sort_by_key(|i| i.quantity),
            SortOrder::QtyDesc => items.sort_by_key(|i| std::cmp::Reverse(i.quantity)),
        }
    }
}

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Register a new item in the current warehouse
    Add {
        /// Name of the item
        name: String,

        /// Unit of measurement (kg, sak, pcs, ...)
        #[arg(long, default_value = "")]
        unit: String,

        /// Stock keeping unit code
        #[arg(long, default_value = "")]
        sku: String,

        /// Category ID or name
        #[arg(long)]
        category: Option<String>,

        /// Warn when stock falls to or below this level (0 disables)
        #[arg(long, default_value_t = 0)]
        threshold: i64,

        /// Opening stock
        #[arg(long, short, default_value_t = 1)]
        quantity: i64,

        /// Notes for the opening transaction
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List items
    List {
        /// Only items whose name or SKU contains this text
        #[arg(long, short)]
        search: Option<String>,

        /// Only items at or below their low-stock threshold
        #[arg(long)]
        low: bool,

        /// Sort order
        #[arg(long, value_enum, default_value = "name-asc")]
        sort: SortOrder,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show an item's details and history
    Show {
        /// Item ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Edit an item's details (stock is changed with `bakul stock`)
    Edit {
        /// Item ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New unit
        #[arg(long)]
        unit: Option<String>,

        /// New SKU
        #[arg(long)]
        sku: Option<String>,

        /// Category ID or name
        #[arg(long, conflicts_with = "no_category")]
        category: Option<String>,

        /// Remove the item from its category
        #[arg(long)]
        no_category: bool,

        /// New low-stock threshold
        #[arg(long)]
        threshold: Option<i64>,
    },
}

impl ItemCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        match &self.command {
            ItemSubcommand::Add {
                name,
                unit,
                sku,
                category,
                threshold,
                quantity,
                notes,
            } => {
                let category_id = match category {
                    Some(c) => Some(find_category(&state, c)?.id.clone()),
                    None => None,
                };
                let actions = entry::new_item(
                    &state,
                    NewItem {
                        name: name.clone(),
                        unit: unit.clone(),
                        sku: sku.clone(),
                        category_id,
                        low_stock_threshold: *threshold,
                        quantity: *quantity,
                        notes: notes.clone(),
                    },
                )?;
                session.dispatch_all(actions)?;

                if let Some(item) = session.state().items.last() {
                    println!("Added item:");
                    println!("  {}", item);
                    println!("  id: {}", item.id);
                }
                Ok(())
            }

            ItemSubcommand::List {
                search,
                low,
                sort,
                format,
            } => {
                let mut items: Vec<&Item> = match search {
                    Some(term) => state.search_items(term).collect(),
                    None => state.items.iter().collect(),
                };
                if *low {
                    items.retain(|i| i.is_low_stock());
                }
                sort.sort(&mut items);

                if items.is_empty() {
                    println!("No items found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&items)?);
                    }
                    OutputFormat::Text => {
                        println!(
                            "{:<34}  {:<28}  {:>8}  {:<6}  {:<12}",
                            "ID", "NAME", "QTY", "UNIT", "SKU"
                        );
                        println!("{}", "-".repeat(96));
                        for item in &items {
                            let marker = if item.is_low_stock() { " !" } else { "" };
                            println!(
                                "{:<34}  {:<28}  {:>8}  {:<6}  {:<12}{}",
                                item.id,
                                truncate(&item.name, 28),
                                item.quantity,
                                item.unit,
                                item.sku,
                                marker
                            );
                        }
                        println!("\nTotal: {} item(s)", items.len());
                    }
                }
                Ok(())
            }

            ItemSubcommand::Show { identifier, format } => {
                let item = find_item(&state, identifier)?;
                let history = reports::item_history(&state, &item.id);

                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({
                            "item": item,
                            "transactions": history,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", item);
                        println!("  id:        {}", item.id);
                        if !item.sku.is_empty() {
                            println!("  sku:       {}", item.sku);
                        }
                        let category = item
                            .category_id
                            .as_deref()
                            .and_then(|id| state.category(id))
                            .map_or("Uncategorized", |c| c.name.as_str());
                        println!("  category:  {}", category);
                        let warehouse = item
                            .warehouse_id
                            .as_deref()
                            .and_then(|id| state.warehouse(id))
                            .map_or("N/A", |w| w.name.as_str());
                        println!("  warehouse: {}", warehouse);
                        println!("  created:   {}", item.created_at.format("%Y-%m-%d"));
                        println!();

                        if history.is_empty() {
                            println!("No transactions");
                        } else {
                            println!("History:");
                            for transaction in history {
                                println!("  {}", transaction);
                            }
                        }
                    }
                }
                Ok(())
            }

            ItemSubcommand::Edit {
                identifier,
                name,
                unit,
                sku,
                category,
                no_category,
                threshold,
            } => {
                let has_updates = name.is_some()
                    || unit.is_some()
                    || sku.is_some()
                    || category.is_some()
                    || *no_category
                    || threshold.is_some();
                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let item = find_item(&state, identifier)?;
                let category_id = if *no_category {
                    Some(String::new())
                } else {
                    match category {
                        Some(c) => Some(find_category(&state, c)?.id.clone()),
                        None => None,
                    }
                };
                let actions = entry::edit_item(
                    &state,
                    &item.id,
                    ItemDetails {
                        name: name.clone(),
                        unit: unit.clone(),
                        sku: sku.clone(),
                        category_id,
                        low_stock_threshold: *threshold,
                    },
                )?;
                session.dispatch_all(actions)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_orders() {
        let pupuk = Item::new("pupuk", "kg").with_quantity(8);
        let benih = Item::new("Benih", "pack").with_quantity(2);
        let cangkul = Item::new("Cangkul", "pcs").with_quantity(5);
        let names = |order: SortOrder| {
            let mut items = vec![&pupuk, &benih, &cangkul];
            order.sort(&mut items);
            items.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
        };

        assert_eq!(names(SortOrder::NameAsc), ["Benih", "Cangkul", "pupuk"]);
        assert_eq!(names(SortOrder::NameDesc), ["pupuk", "Cangkul", "Benih"]);
        assert_eq!(names(SortOrder::QtyAsc), ["Benih", "Cangkul", "pupuk"]);
        assert_eq!(names(SortOrder::QtyDesc), ["pupuk", "Cangkul", "Benih"]);
    }
}
