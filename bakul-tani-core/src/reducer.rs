//! The reducer: `(state, action) -> state`.
//!
//! `reduce` borrows the current state and never mutates it. It returns
//! `Cow::Borrowed` when the action leaves the state untouched and
//! `Cow::Owned` with a fresh value otherwise, so callers can tell a real
//! transition apart from a no-op without comparing whole states.
//!
//! The reducer performs no I/O and reads no clock. Ids and timestamps come in
//! through the action payloads.

use std::borrow::Cow;

use crate::action::Action;
use crate::models::{
    Item, Notification, NotificationSubject, SyncStatus, Transaction, TransactionType,
};
use crate::state::{AppState, FALLBACK_WAREHOUSE_ID};

pub fn reduce(state: &AppState, action: Action) -> Cow<'_, AppState> {
    match action {
        Action::AddItem {
            mut item,
            transaction,
        } => {
            if item.warehouse_id.is_none() {
                item.warehouse_id = Some(default_warehouse_id(state));
            }
            let mut next = state.clone();
            next.items.push(item);
            next.transactions.push(transaction);
            Cow::Owned(next)
        }
        Action::UpdateStock {
            item_id,
            quantity_change,
            transaction,
        } => Cow::Owned(update_stock(state, &item_id, quantity_change, transaction)),
        Action::UpdateItemDetails(mut item) => {
            if item.warehouse_id.is_none() {
                item.warehouse_id = state.item(&item.id).and_then(|i| i.warehouse_id.clone());
            }
            let mut next = state.clone();
            replace_by_id(&mut next.items, item, |i| &i.id);
            Cow::Owned(next)
        }
        Action::AddCategory(mut category) => {
            category.sync_status = SyncStatus::for_connectivity(state.is_online);
            let mut next = state.clone();
            next.categories.push(category);
            Cow::Owned(next)
        }
        Action::UpdateCategory(mut category) => {
            category.sync_status = SyncStatus::for_connectivity(state.is_online);
            let mut next = state.clone();
            replace_by_id(&mut next.categories, category, |c| &c.id);
            Cow::Owned(next)
        }
        Action::DeleteCategory { id } => {
            let mut next = state.clone();
            next.categories.retain(|c| c.id != id);
            for item in next.items.iter_mut() {
                if item.category_id.as_deref() == Some(id.as_str()) {
                    item.category_id = None;
                }
            }
            Cow::Owned(next)
        }
        Action::AddWarehouse(mut warehouse) => {
            warehouse.sync_status = SyncStatus::for_connectivity(state.is_online);
            let mut next = state.clone();
            if next.current_warehouse_id.is_none() {
                next.current_warehouse_id = Some(warehouse.id.clone());
            }
            next.warehouses.push(warehouse);
            Cow::Owned(next)
        }
        Action::UpdateWarehouse(mut warehouse) => {
            warehouse.sync_status = SyncStatus::for_connectivity(state.is_online);
            let mut next = state.clone();
            replace_by_id(&mut next.warehouses, warehouse, |w| &w.id);
            Cow::Owned(next)
        }
        Action::DeleteWarehouse { id } => {
            let mut next = state.clone();
            next.warehouses.retain(|w| w.id != id);
            if next.current_warehouse_id.as_deref() == Some(id.as_str()) {
                next.current_warehouse_id = next.warehouses.first().map(|w| w.id.clone());
            }
            Cow::Owned(next)
        }
        Action::SelectWarehouse(id) => Cow::Owned(AppState {
            current_warehouse_id: Some(id),
            ..state.clone()
        }),
        Action::UpdateUser(user) => Cow::Owned(AppState {
            user,
            ..state.clone()
        }),
        Action::ResetData => Cow::Owned(AppState {
            user: state.user.clone(),
            is_logged_in: state.is_logged_in,
            is_online: state.is_online,
            theme: state.theme,
            ..AppState::default()
        }),
        Action::RestoreData(snapshot) => Cow::Owned(AppState {
            notifications: Vec::new(),
            is_online: state.is_online,
            ..*snapshot
        }),
        Action::AddNotification(notification) => {
            let mut next = state.clone();
            next.notifications.push(notification);
            Cow::Owned(next)
        }
        Action::RemoveNotification { id } => {
            let mut next = state.clone();
            next.notifications.retain(|n| n.id != id);
            Cow::Owned(next)
        }
        Action::Login(patch) => Cow::Owned(AppState {
            is_logged_in: true,
            user: patch.apply(&state.user),
            ..state.clone()
        }),
        Action::Logout => Cow::Owned(AppState {
            is_logged_in: false,
            ..state.clone()
        }),
        Action::SetOnlineStatus(is_online) => Cow::Owned(AppState {
            is_online,
            ..state.clone()
        }),
        Action::SyncData => {
            if !state.has_pending() {
                return Cow::Borrowed(state);
            }
            let mut next = state.clone();
            for category in next.categories.iter_mut() {
                category.sync_status = SyncStatus::Synced;
            }
            for warehouse in next.warehouses.iter_mut() {
                warehouse.sync_status = SyncStatus::Synced;
            }
            Cow::Owned(next)
        }
        Action::SetTheme(theme) => Cow::Owned(AppState {
            theme,
            ..state.clone()
        }),
        Action::Unknown => Cow::Borrowed(state),
    }
}

fn update_stock(
    state: &AppState,
    item_id: &str,
    quantity_change: i64,
    transaction: Transaction,
) -> AppState {
    let mut next = state.clone();

    let mut alert = None;
    let targets = next.items.iter_mut().filter(|i| i.id == item_id);
    for (n, item) in targets.enumerate() {
        let old_quantity = item.quantity;
        item.quantity = item.quantity.saturating_add(quantity_change);
        if n == 0 && transaction.kind == TransactionType::Out {
            alert = low_stock_alert(item, old_quantity, &transaction, &state.notifications);
        }
    }

    if let Some(notification) = alert {
        next.notifications.push(notification);
    }
    // Orphaned transactions are still recorded.
    next.transactions.push(transaction);
    next
}

/// Alert when an outbound movement crosses the item's threshold, unless an
/// alert for the same item is already showing.
fn low_stock_alert(
    item: &Item,
    old_quantity: i64,
    transaction: &Transaction,
    existing: &[Notification],
) -> Option<Notification> {
    let threshold = item.low_stock_threshold;
    if threshold <= 0 || old_quantity <= threshold || item.quantity > threshold {
        return None;
    }
    if existing.iter().any(|n| n.is_low_stock_for(&item.id)) {
        return None;
    }

    Some(
        Notification::warning(format!(
            "Low stock for \"{}\": {} {} left.",
            item.name, item.quantity, item.unit
        ))
        .with_id(format!("notif_low_{}", transaction.id))
        .with_subject(NotificationSubject::LowStock {
            item_id: item.id.clone(),
        }),
    )
}

/// Warehouse for an item that names none: the active one, then the first one.
fn default_warehouse_id(state: &AppState) -> String {
    state
        .current_warehouse_id
        .clone()
        .or_else(|| state.warehouses.first().map(|w| w.id.clone()))
        .unwrap_or_else(|| FALLBACK_WAREHOUSE_ID.to_string())
}

fn replace_by_id<T: Clone>(entries: &mut [T], replacement: T, id: impl Fn(&T) -> &String) {
    let key = id(&replacement).clone();
    for slot in entries.iter_mut() {
        if *id(&*slot) == key {
            *slot = replacement.clone();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::action::UserPatch;
    use crate::models::{Category, Theme, User, Warehouse};
    use proptest::prelude::*;

    pub(crate) fn apply(state: &AppState, action: Action) -> AppState {
        reduce(state, action).into_owned()
    }

    fn add_item(state: &AppState, id: &str, name: &str, quantity: i64, threshold: i64) -> AppState {
        let item = Item::new(name, "pack")
            .with_id(id)
            .with_quantity(quantity)
            .with_low_stock_threshold(threshold);
        let transaction = Transaction::new(id, TransactionType::In, quantity);
        apply(state, Action::AddItem { item, transaction })
    }

    fn issue(state: &AppState, id: &str, quantity: i64) -> AppState {
        apply(
            state,
            Action::UpdateStock {
                item_id: id.to_string(),
                quantity_change: -quantity,
                transaction: Transaction::new(id, TransactionType::Out, quantity),
            },
        )
    }

    fn low_stock_count(state: &AppState) -> usize {
        state
            .notifications
            .iter()
            .filter(|n| n.subject.is_some())
            .count()
    }

    #[test]
    fn test_add_item_appends_item_and_transaction() {
        let state = add_item(&AppState::default(), "i1", "Benih Padi", 5, 3);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].item_id, "i1");
    }

    #[test]
    fn test_low_stock_scenario() {
        let state = add_item(&AppState::default(), "i1", "Benih Padi", 5, 3);
        let state = issue(&state, "i1", 3);

        assert_eq!(state.item("i1").unwrap().quantity, 2);
        assert_eq!(state.notifications.len(), 1);
        assert!(state.notifications[0].is_low_stock_for("i1"));
        assert!(state.notifications[0].message.contains("Benih Padi"));
    }

    #[test]
    fn test_low_stock_deduplicated_per_item() {
        let state = add_item(&AppState::default(), "i1", "Benih Padi", 10, 5);
        let state = issue(&state, "i1", 6);
        assert_eq!(low_stock_count(&state), 1);

        // Back above the threshold, then down again while the alert still shows
        let state = apply(
            &state,
            Action::UpdateStock {
                item_id: "i1".to_string(),
                quantity_change: 6,
                transaction: Transaction::new("i1", TransactionType::In, 6),
            },
        );
        let state = issue(&state, "i1", 6);
        assert_eq!(low_stock_count(&state), 1);
    }

    #[test]
    fn test_low_stock_dedup_does_not_match_overlapping_names() {
        let state = add_item(&AppState::default(), "i1", "Benih", 10, 5);
        let state = add_item(&state, "i2", "Benih Padi", 10, 5);
        let state = issue(&state, "i2", 6);
        let state = issue(&state, "i1", 6);
        assert_eq!(low_stock_count(&state), 2);
    }

    #[test]
    fn test_low_stock_requires_crossing() {
        // Already at the threshold: no new alert
        let state = add_item(&AppState::default(), "i1", "Cangkul", 3, 3);
        let state = issue(&state, "i1", 1);
        assert_eq!(low_stock_count(&state), 0);

        // Zero threshold disables alerts
        let state = add_item(&AppState::default(), "i2", "Karung", 5, 0);
        let state = issue(&state, "i2", 5);
        assert_eq!(low_stock_count(&state), 0);
    }

    #[test]
    fn test_adjustment_never_alerts() {
        let state = add_item(&AppState::default(), "i1", "Benih", 10, 5);
        let state = apply(
            &state,
            Action::UpdateStock {
                item_id: "i1".to_string(),
                quantity_change: -8,
                transaction: Transaction::adjustment("i1", -8),
            },
        );
        assert_eq!(state.item("i1").unwrap().quantity, 2);
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_update_stock_missing_item_records_orphan() {
        let state = issue(&AppState::default(), "ghost", 1);
        assert!(state.items.is_empty());
        assert_eq!(state.transactions.len(), 1);
        assert_eq!(state.transactions[0].item_id, "ghost");
    }

    #[test]
    fn test_update_item_details_replaces_by_id() {
        let state = add_item(&AppState::default(), "i1", "Benih", 4, 0);
        let mut edited = state.item("i1").unwrap().clone();
        edited.name = "Benih Jagung".to_string();
        let state = apply(&state, Action::UpdateItemDetails(edited));
        assert_eq!(state.item("i1").unwrap().name, "Benih Jagung");
        assert_eq!(state.item("i1").unwrap().quantity, 4);
    }

    #[test]
    fn test_offline_category_is_pending_until_sync() {
        let state = apply(&AppState::default(), Action::SetOnlineStatus(false));
        let state = apply(&state, Action::AddCategory(Category::new("Pupuk").with_id("c3")));
        assert_eq!(state.category("c3").unwrap().sync_status, SyncStatus::Pending);

        let state = apply(&state, Action::SetOnlineStatus(true));
        let state = apply(&state, Action::SyncData);
        assert_eq!(state.category("c3").unwrap().sync_status, SyncStatus::Synced);
    }

    #[test]
    fn test_online_writes_are_synced() {
        let state = AppState::initial(true);
        let mut pending = Warehouse::new("Gudang Barat").with_id("w2");
        pending.sync_status = SyncStatus::Pending;
        let state = apply(&state, Action::AddWarehouse(pending));
        assert_eq!(state.warehouse("w2").unwrap().sync_status, SyncStatus::Synced);
    }

    #[test]
    fn test_update_while_offline_marks_pending() {
        let state = AppState::initial(false);
        let renamed = Category::new("Benih Unggul").with_id("c1");
        let state = apply(&state, Action::UpdateCategory(renamed));
        let category = state.category("c1").unwrap();
        assert_eq!(category.name, "Benih Unggul");
        assert!(category.is_pending());
        assert_eq!(state.pending_count(), 1);
    }

    #[test]
    fn test_delete_category_unlinks_items() {
        let item = Item::new("Benih", "pack").with_id("i1").with_category("c1");
        let state = apply(
            &AppState::default(),
            Action::AddItem {
                transaction: Transaction::new("i1", TransactionType::In, 1),
                item,
            },
        );
        let state = apply(&state, Action::DeleteCategory { id: "c1".to_string() });
        assert!(state.category("c1").is_none());
        assert!(state.item("i1").unwrap().category_id.is_none());
    }

    #[test]
    fn test_delete_active_warehouse_falls_back() {
        let state = apply(
            &AppState::default(),
            Action::AddWarehouse(Warehouse::new("Gudang Dua").with_id("w2")),
        );
        let state = apply(&state, Action::DeleteWarehouse { id: "w1".to_string() });
        assert_eq!(state.current_warehouse_id.as_deref(), Some("w2"));

        let state = apply(&state, Action::DeleteWarehouse { id: "w2".to_string() });
        assert!(state.warehouses.is_empty());
        assert!(state.current_warehouse_id.is_none());
    }

    #[test]
    fn test_first_warehouse_after_none_is_selected() {
        let state = apply(&AppState::default(), Action::DeleteWarehouse { id: "w1".to_string() });
        let state = add_item(&state, "i1", "Benih", 1, 0);
        assert_eq!(state.item("i1").unwrap().warehouse_id.as_deref(), Some("w1"));

        let state = apply(
            &state,
            Action::AddWarehouse(Warehouse::new("Gudang Dua").with_id("w2")),
        );
        assert_eq!(state.current_warehouse_id.as_deref(), Some("w2"));
    }

    #[test]
    fn test_item_without_warehouse_is_placed() {
        let state = apply(
            &AppState::default(),
            Action::AddWarehouse(Warehouse::new("Gudang Dua").with_id("w2")),
        );
        let state = apply(&state, Action::SelectWarehouse("w2".to_string()));
        let state = add_item(&state, "i1", "Benih", 1, 0);
        assert_eq!(state.item("i1").unwrap().warehouse_id.as_deref(), Some("w2"));

        // Details without a warehouse keep the stored one
        let state = apply(&state, Action::SelectWarehouse("w1".to_string()));
        let state = apply(
            &state,
            Action::UpdateItemDetails(Item::new("Benih Jagung", "pack").with_id("i1")),
        );
        let item = state.item("i1").unwrap();
        assert_eq!(item.name, "Benih Jagung");
        assert_eq!(item.warehouse_id.as_deref(), Some("w2"));
    }

    #[test]
    fn test_delete_inactive_warehouse_keeps_selection() {
        let state = apply(
            &AppState::default(),
            Action::AddWarehouse(Warehouse::new("Gudang Dua").with_id("w2")),
        );
        let state = apply(&state, Action::DeleteWarehouse { id: "w2".to_string() });
        assert_eq!(state.current_warehouse_id.as_deref(), Some("w1"));
    }

    #[test]
    fn test_reset_preserves_identity_and_preferences() {
        let state = add_item(&AppState::initial(false), "i1", "Benih", 4, 0);
        let state = apply(
            &state,
            Action::Login(UserPatch::from(User::new("Sari", "sari@tani.id", "Staff"))),
        );
        let state = apply(&state, Action::SetTheme(Theme::Light));
        let state = apply(&state, Action::ResetData);

        assert!(state.items.is_empty());
        assert!(state.transactions.is_empty());
        assert_eq!(state.user.name, "Sari");
        assert!(state.is_logged_in);
        assert!(!state.is_online);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn test_restore_clears_notifications_and_keeps_connectivity() {
        let current = AppState::initial(false);
        let mut snapshot = add_item(&AppState::initial(true), "i1", "Benih", 4, 0);
        snapshot.notifications.push(Notification::info("stale"));

        let state = apply(&current, Action::RestoreData(Box::new(snapshot)));
        assert_eq!(state.items.len(), 1);
        assert!(state.notifications.is_empty());
        assert!(!state.is_online);
    }

    #[test]
    fn test_notifications_add_and_remove() {
        let state = apply(
            &AppState::default(),
            Action::AddNotification(Notification::success("ok").with_id("n1")),
        );
        assert_eq!(state.notifications.len(), 1);
        let state = apply(&state, Action::RemoveNotification { id: "n1".to_string() });
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_login_merges_and_logout_keeps_profile() {
        let patch = UserPatch {
            email: Some("sari@tani.id".to_string()),
            ..UserPatch::default()
        };
        let state = apply(&AppState::default(), Action::Login(patch));
        assert!(state.is_logged_in);
        assert_eq!(state.user.email, "sari@tani.id");
        assert_eq!(state.user.name, User::default().name);

        let state = apply(&state, Action::Logout);
        assert!(!state.is_logged_in);
        assert_eq!(state.user.email, "sari@tani.id");
    }

    #[test]
    fn test_select_warehouse() {
        let state = apply(&AppState::default(), Action::SelectWarehouse("w9".to_string()));
        assert_eq!(state.current_warehouse_id.as_deref(), Some("w9"));
    }

    #[test]
    fn test_unknown_action_returns_input() {
        let state = AppState::default();
        assert!(matches!(reduce(&state, Action::Unknown), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sync_without_pending_is_noop() {
        let state = AppState::default();
        assert!(matches!(reduce(&state, Action::SyncData), Cow::Borrowed(_)));
    }

    // ==================== Properties ====================

    const ITEM_IDS: [&str; 3] = ["i1", "i2", "i3"];

    pub(crate) fn action_strategy() -> impl Strategy<Value = Action> {
        let item_id = prop::sample::select(ITEM_IDS.to_vec());
        let category_id = prop::sample::select(vec!["c1", "c2", "c3"]);
        let warehouse_id = prop::sample::select(vec!["w1", "w2"]);
        prop_oneof![
            (item_id.clone(), 0i64..20, 0i64..6, prop::option::of(category_id.clone())).prop_map(
                |(id, quantity, threshold, category)| {
                    let mut item = Item::new(format!("Barang {}", id), "pcs")
                        .with_id(id)
                        .with_quantity(quantity)
                        .with_low_stock_threshold(threshold);
                    item.category_id = category.map(str::to_string);
                    Action::AddItem {
                        transaction: Transaction::new(id, TransactionType::In, quantity),
                        item,
                    }
                }
            ),
            (item_id.clone(), prop::option::of(category_id.clone())).prop_map(|(id, category)| {
                let mut item = Item::new(format!("Barang {} baru", id), "kg").with_id(id);
                item.category_id = category.map(str::to_string);
                Action::UpdateItemDetails(item)
            }),
            (item_id, -10i64..10).prop_map(|(id, change)| {
                let kind = if change < 0 {
                    TransactionType::Out
                } else {
                    TransactionType::In
                };
                Action::UpdateStock {
                    item_id: id.to_string(),
                    quantity_change: change,
                    transaction: Transaction::new(id, kind, change),
                }
            }),
            category_id.clone().prop_map(|id| Action::AddCategory(Category::new("Kategori").with_id(id))),
            category_id.prop_map(|id| Action::DeleteCategory { id: id.to_string() }),
            Just(Action::AddWarehouse(Warehouse::new("Gudang Dua").with_id("w2"))),
            warehouse_id.clone().prop_map(|id| Action::DeleteWarehouse { id: id.to_string() }),
            warehouse_id.prop_map(|id| Action::SelectWarehouse(id.to_string())),
            any::<bool>().prop_map(Action::SetOnlineStatus),
            prop::sample::select(vec![Action::SyncData, Action::Unknown]),
        ]
    }

    pub(crate) fn state_strategy() -> impl Strategy<Value = AppState> {
        prop::collection::vec(action_strategy(), 0..25).prop_map(|actions| {
            actions
                .into_iter()
                .fold(AppState::default(), |state, action| apply(&state, action))
        })
    }

    proptest! {
        #[test]
        fn prop_input_state_is_never_mutated(state in state_strategy(), action in action_strategy()) {
            let before = state.clone();
            let _ = reduce(&state, action);
            prop_assert_eq!(state, before);
        }

        #[test]
        fn prop_update_stock_touches_only_target(
            state in state_strategy(),
            index in 0usize..3,
            change in -10i64..10,
        ) {
            let id = ITEM_IDS[index];
            let next = apply(&state, Action::UpdateStock {
                item_id: id.to_string(),
                quantity_change: change,
                transaction: Transaction::new(id, TransactionType::In, change),
            });
            prop_assert_eq!(next.items.len(), state.items.len());
            for (before, after) in state.items.iter().zip(next.items.iter()) {
                if before.id == id {
                    prop_assert_eq!(after.quantity, before.quantity + change);
                } else {
                    prop_assert_eq!(after.quantity, before.quantity);
                }
            }
            prop_assert_eq!(next.transactions.len(), state.transactions.len() + 1);
        }

        #[test]
        fn prop_sync_data_is_idempotent(state in state_strategy()) {
            let once = apply(&state, Action::SyncData);
            let twice = apply(&once, Action::SyncData);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!once.has_pending());
        }

        #[test]
        fn prop_delete_category_leaves_no_references(state in state_strategy(), index in 0usize..3) {
            let id = ["c1", "c2", "c3"][index];
            let next = apply(&state, Action::DeleteCategory { id: id.to_string() });
            prop_assert!(next.items.iter().all(|i| i.category_id.as_deref() != Some(id)));
            prop_assert!(next.category(id).is_none());
        }
    }
}
