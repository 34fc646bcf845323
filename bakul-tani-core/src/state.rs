//! Application state aggregate.
//!
//! `AppState` is the single value the reducer transforms. Only `notifications`
//! and `is_online` are ephemeral: they are skipped when the state is
//! serialized and reset whenever a snapshot is loaded.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Item, Notification, SyncStatus, Theme, Transaction, User, Warehouse};

/// Warehouse id assigned to items when a snapshot has no warehouses at all.
pub const FALLBACK_WAREHOUSE_ID: &str = "w1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub items: Vec<Item>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub warehouses: Vec<Warehouse>,
    pub current_warehouse_id: Option<String>,
    pub user: User,
    #[serde(skip)]
    pub notifications: Vec<Notification>,
    pub is_logged_in: bool,
    #[serde(skip)]
    pub is_online: bool,
    pub theme: Theme,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            transactions: Vec::new(),
            categories: vec![
                Category::new("Benih").with_id("c1"),
                Category::new("Alat").with_id("c2"),
            ],
            warehouses: vec![Warehouse::new("Gudang Utama")
                .with_id(FALLBACK_WAREHOUSE_ID)
                .with_capacity(1000)],
            current_warehouse_id: Some(FALLBACK_WAREHOUSE_ID.to_string()),
            user: User::default(),
            notifications: Vec::new(),
            is_logged_in: false,
            is_online: true,
            theme: Theme::default(),
        }
    }
}

impl AppState {
    /// Default state with the given connectivity.
    pub fn initial(is_online: bool) -> Self {
        Self {
            is_online,
            ..Self::default()
        }
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn warehouse(&self, id: &str) -> Option<&Warehouse> {
        self.warehouses.iter().find(|warehouse| warehouse.id == id)
    }

    /// The active warehouse, falling back to the first one.
    pub fn current_warehouse(&self) -> Option<&Warehouse> {
        self.current_warehouse_id
            .as_deref()
            .and_then(|id| self.warehouse(id))
            .or_else(|| self.warehouses.first())
    }

    /// Items whose name or SKU contains `term` (case-insensitive).
    pub fn search_items<'a>(&'a self, term: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |item| item.matches(term))
    }

    /// Number of categories and warehouses still awaiting reconciliation.
    pub fn pending_count(&self) -> usize {
        let categories = self
            .categories
            .iter()
            .filter(|c| c.sync_status == SyncStatus::Pending)
            .count();
        let warehouses = self
            .warehouses
            .iter()
            .filter(|w| w.sync_status == SyncStatus::Pending)
            .count();
        categories + warehouses
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Copy of the state without ephemeral notifications.
    pub fn without_notifications(&self) -> Self {
        Self {
            notifications: Vec::new(),
            ..self.clone()
        }
    }
}
