use clap::ValueEnum;
use std::io::{self, Write};

use bakul_tani_core::{AppState, Category, Item, Warehouse};

mod account;
mod backup;
mod category;
mod config_cmd;
mod dispatch;
mod item;
mod network;
mod profile;
mod report;
mod reset;
mod stock;
mod sync_cmd;
mod warehouse;

pub use account::AccountCommand;
pub use backup::BackupCommand;
pub use category::CategoryCommand;
pub use config_cmd::ConfigCommand;
pub use dispatch::DispatchCommand;
pub use item::ItemCommand;
pub use network::NetworkCommand;
pub use profile::ProfileCommand;
pub use report::ReportCommand;
pub use reset::ResetCommand;
pub use stock::StockCommand;
pub use sync_cmd::SyncCommand;
pub use warehouse::WarehouseCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Asks a yes/no question on stdin. Anything but `y` is a no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Finds an item by id, then by case-insensitive name.
pub fn find_item<'a>(state: &'a AppState, identifier: &str) -> Result<&'a Item, String> {
    state
        .item(identifier)
        .or_else(|| {
            state
                .items
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(identifier.trim()))
        })
        .ok_or_else(|| format!("Item not found: {}", identifier))
}

/// Finds a category by id, then by case-insensitive name.
pub fn find_category<'a>(state: &'a AppState, identifier: &str) -> Result<&'a Category, String> {
    state
        .category(identifier)
        .or_else(|| {
            state
                .categories
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(identifier.trim()))
        })
        .ok_or_else(|| format!("Category not found: {}", identifier))
}

/// Finds a warehouse by id, then by case-insensitive name.
pub fn find_warehouse<'a>(
    state: &'a AppState,
    identifier: &str,
) -> Result<&'a Warehouse, String> {
    state
        .warehouse(identifier)
        .or_else(|| {
            state
                .warehouses
                .iter()
                .find(|w| w.name.eq_ignore_ascii_case(identifier.trim()))
        })
        .ok_or_else(|| format!("Warehouse not found: {}", identifier))
}

/// Truncates `text` to `width` characters, marking the cut with "...".
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
