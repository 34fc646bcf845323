//! Input validation for stock and catalogue changes.
//!
//! The reducer trusts its input. Everything a user types goes through these
//! functions first; each one either rejects the input or returns the actions
//! to dispatch, in order.

use thiserror::Error;

use crate::action::Action;
use crate::models::{Category, Item, Notification, Transaction, TransactionType, Warehouse};
use crate::state::AppState;

/// Note recorded on adjustments when the user gives none.
pub const DEFAULT_ADJUSTMENT_NOTE: &str = "Stock correction";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryError {
    #[error("{0} name cannot be empty")]
    EmptyName(&'static str),
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("Invalid quantity or exceeds stock: requested {requested}, available {available}")]
    ExceedsStock { requested: i64, available: i64 },
    #[error("Stock count cannot be negative, got {0}")]
    NegativeCount(i64),
    #[error("Cannot correct stock from {current} to {count}: difference is out of range")]
    CountOutOfRange { count: i64, current: i64 },
    #[error("Item not found: {0}")]
    ItemNotFound(String),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(String),
}

/// Form data for a brand new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub name: String,
    pub unit: String,
    pub sku: String,
    pub category_id: Option<String>,
    pub low_stock_threshold: i64,
    pub quantity: i64,
    pub notes: String,
}

/// Editable item fields. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ItemDetails {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub sku: Option<String>,
    /// `Some("")` clears the category.
    pub category_id: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

fn required_name(kind: &'static str, name: &str) -> Result<String, EntryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EntryError::EmptyName(kind));
    }
    Ok(name.to_string())
}

fn positive(quantity: i64) -> Result<i64, EntryError> {
    if quantity < 1 {
        return Err(EntryError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

fn find_item<'a>(state: &'a AppState, item_id: &str) -> Result<&'a Item, EntryError> {
    state
        .item(item_id)
        .ok_or_else(|| EntryError::ItemNotFound(item_id.to_string()))
}

fn check_category(state: &AppState, category_id: Option<&str>) -> Result<(), EntryError> {
    match category_id {
        Some(id) if state.category(id).is_none() => {
            Err(EntryError::CategoryNotFound(id.to_string()))
        }
        _ => Ok(()),
    }
}

/// Registers a new item in the current warehouse with its opening stock.
pub fn new_item(state: &AppState, input: NewItem) -> Result<Vec<Action>, EntryError> {
    let name = required_name("Item", &input.name)?;
    let quantity = positive(input.quantity)?;
    let category_id = input.category_id.filter(|id| !id.is_empty());
    check_category(state, category_id.as_deref())?;

    let mut item = Item::new(name, input.unit.trim())
        .with_sku(input.sku.trim())
        .with_low_stock_threshold(input.low_stock_threshold.max(0))
        .with_quantity(quantity);
    item.category_id = category_id;
    item.warehouse_id = state.current_warehouse_id.clone();

    let transaction =
        Transaction::new(item.id.clone(), TransactionType::In, quantity).with_notes(input.notes);
    Ok(vec![Action::AddItem { item, transaction }])
}

/// Books incoming stock for an existing item.
pub fn receive(
    state: &AppState,
    item_id: &str,
    quantity: i64,
    notes: &str,
) -> Result<Vec<Action>, EntryError> {
    let item = find_item(state, item_id)?;
    let quantity = positive(quantity)?;
    let transaction =
        Transaction::new(item.id.clone(), TransactionType::In, quantity).with_notes(notes);
    Ok(vec![Action::UpdateStock {
        item_id: item.id.clone(),
        quantity_change: quantity,
        transaction,
    }])
}

/// Books outgoing stock. Cannot take more than is on hand.
pub fn issue(
    state: &AppState,
    item_id: &str,
    quantity: i64,
    notes: &str,
) -> Result<Vec<Action>, EntryError> {
    let item = find_item(state, item_id)?;
    if quantity < 1 || quantity > item.quantity {
        return Err(EntryError::ExceedsStock {
            requested: quantity,
            available: item.quantity,
        });
    }
    let transaction =
        Transaction::new(item.id.clone(), TransactionType::Out, quantity).with_notes(notes);
    Ok(vec![Action::UpdateStock {
        item_id: item.id.clone(),
        quantity_change: -quantity,
        transaction,
    }])
}

/// Corrects the stock of an item to an absolute count.
///
/// Returns no actions when the count already matches.
pub fn adjust(
    state: &AppState,
    item_id: &str,
    new_count: i64,
    notes: Option<&str>,
) -> Result<Vec<Action>, EntryError> {
    let item = find_item(state, item_id)?;
    if new_count < 0 {
        return Err(EntryError::NegativeCount(new_count));
    }

    let delta = new_count
        .checked_sub(item.quantity)
        .ok_or(EntryError::CountOutOfRange {
            count: new_count,
            current: item.quantity,
        })?;
    if delta == 0 {
        return Ok(Vec::new());
    }

    let notes = notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_ADJUSTMENT_NOTE);
    let transaction = Transaction::adjustment(item.id.clone(), delta).with_notes(notes);
    Ok(vec![
        Action::UpdateStock {
            item_id: item.id.clone(),
            quantity_change: delta,
            transaction,
        },
        Action::AddNotification(Notification::success(format!(
            "Stock for \"{}\" has been corrected.",
            item.name
        ))),
    ])
}

/// Edits descriptive fields. Id, quantity, creation time and warehouse are kept.
pub fn edit_item(
    state: &AppState,
    item_id: &str,
    details: ItemDetails,
) -> Result<Vec<Action>, EntryError> {
    let mut item = find_item(state, item_id)?.clone();

    if let Some(name) = details.name {
        item.name = required_name("Item", &name)?;
    }
    if let Some(unit) = details.unit {
        item.unit = unit.trim().to_string();
    }
    if let Some(sku) = details.sku {
        item.sku = sku.trim().to_string();
    }
    if let Some(category_id) = details.category_id {
        let category_id = Some(category_id).filter(|id| !id.is_empty());
        check_category(state, category_id.as_deref())?;
        item.category_id = category_id;
    }
    if let Some(threshold) = details.low_stock_threshold {
        item.low_stock_threshold = threshold.max(0);
    }

    let message = format!("\"{}\" has been updated.", item.name);
    Ok(vec![
        Action::UpdateItemDetails(item),
        Action::AddNotification(Notification::success(message)),
    ])
}

pub fn add_category(name: &str) -> Result<Vec<Action>, EntryError> {
    let name = required_name("Category", name)?;
    Ok(vec![
        Action::AddCategory(Category::new(name)),
        Action::AddNotification(Notification::success("New category added.")),
    ])
}

pub fn rename_category(state: &AppState, id: &str, name: &str) -> Result<Vec<Action>, EntryError> {
    let name = required_name("Category", name)?;
    let mut category = state
        .category(id)
        .cloned()
        .ok_or_else(|| EntryError::CategoryNotFound(id.to_string()))?;
    category.name = name;
    Ok(vec![
        Action::UpdateCategory(category),
        Action::AddNotification(Notification::success("Category updated.")),
    ])
}

/// Removes a category. Its items become uncategorised.
pub fn delete_category(state: &AppState, id: &str) -> Result<Vec<Action>, EntryError> {
    let category = state
        .category(id)
        .ok_or_else(|| EntryError::CategoryNotFound(id.to_string()))?;
    Ok(vec![
        Action::DeleteCategory { id: id.to_string() },
        Action::AddNotification(Notification::success(format!(
            "Category \"{}\" has been deleted.",
            category.name
        ))),
    ])
}

pub fn add_warehouse(name: &str, capacity: Option<u32>) -> Result<Vec<Action>, EntryError> {
    let name = required_name("Warehouse", name)?;
    let mut warehouse = Warehouse::new(name);
    warehouse.capacity = capacity;
    Ok(vec![
        Action::AddWarehouse(warehouse),
        Action::AddNotification(Notification::success("New warehouse added.")),
    ])
}

/// Renames a warehouse and replaces its capacity.
pub fn update_warehouse(
    state: &AppState,
    id: &str,
    name: &str,
    capacity: Option<u32>,
) -> Result<Vec<Action>, EntryError> {
    let name = required_name("Warehouse", name)?;
    let mut warehouse = state
        .warehouse(id)
        .cloned()
        .ok_or_else(|| EntryError::WarehouseNotFound(id.to_string()))?;
    warehouse.name = name;
    warehouse.capacity = capacity;
    Ok(vec![
        Action::UpdateWarehouse(warehouse),
        Action::AddNotification(Notification::success("Warehouse updated.")),
    ])
}

pub fn delete_warehouse(state: &AppState, id: &str) -> Result<Vec<Action>, EntryError> {
    let warehouse = state
        .warehouse(id)
        .ok_or_else(|| EntryError::WarehouseNotFound(id.to_string()))?;
    Ok(vec![
        Action::DeleteWarehouse { id: id.to_string() },
        Action::AddNotification(Notification::success(format!(
            "Warehouse \"{}\" has been deleted.",
            warehouse.name
        ))),
    ])
}

pub fn select_warehouse(state: &AppState, id: &str) -> Result<Vec<Action>, EntryError> {
    if state.warehouse(id).is_none() {
        return Err(EntryError::WarehouseNotFound(id.to_string()));
    }
    Ok(vec![Action::SelectWarehouse(id.to_string())])
}
