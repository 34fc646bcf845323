//! Read-only views over the ledger: dashboard figures, period statistics
//! and history exports.
//!
//! Period filters work on calendar days in a caller-supplied time zone, with
//! both ends inclusive.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, TimeZone};
use thiserror::Error;

use crate::models::{Item, Transaction, TransactionType};
use crate::state::AppState;

/// Label used for transactions whose item no longer exists.
pub const DELETED_ITEM_LABEL: &str = "item deleted";

const CRUCIAL_LIMIT: usize = 4;
const RECENT_LIMIT: usize = 5;
const TOP_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No history to export for {0}")]
    NothingToExport(String),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to finish CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl Period {
    /// First and last day of the period, given today's date.
    pub fn bounds(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Last7Days => (today - Days::new(6), today),
            Period::Last30Days => (today - Days::new(29), today),
            Period::ThisMonth => (today.with_day(1).unwrap_or(today), today),
            Period::LastMonth => {
                let first_this_month = today.with_day(1).unwrap_or(today);
                let end = first_this_month - Days::new(1);
                (end.with_day(1).unwrap_or(end), end)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Last7Days => "Last 7 days",
            Period::Last30Days => "Last 30 days",
            Period::ThisMonth => "This month",
            Period::LastMonth => "Last month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Last7Days => write!(f, "7d"),
            Period::Last30Days => write!(f, "30d"),
            Period::ThisMonth => write!(f, "this-month"),
            Period::LastMonth => write!(f, "last-month"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "7d" => Ok(Period::Last7Days),
            "30d" => Ok(Period::Last30Days),
            "this-month" => Ok(Period::ThisMonth),
            "last-month" => Ok(Period::LastMonth),
            _ => Err(format!(
                "Invalid period '{}'. Valid options: 7d, 30d, this-month, last-month",
                s
            )),
        }
    }
}

/// Home screen figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<'a> {
    pub total_stock: i64,
    pub low_stock_count: usize,
    /// Low-stock items, most severe first.
    pub crucial_items: Vec<&'a Item>,
    pub recent_transactions: Vec<&'a Transaction>,
}

pub fn summary(state: &AppState) -> Summary<'_> {
    let mut low: Vec<&Item> = state.items.iter().filter(|i| i.is_low_stock()).collect();
    let low_stock_count = low.len();
    low.sort_by(|a, b| severity(a).partial_cmp(&severity(b)).unwrap_or(Ordering::Equal));
    low.truncate(CRUCIAL_LIMIT);

    let mut recent = newest_first(state.transactions.iter());
    recent.truncate(RECENT_LIMIT);

    Summary {
        total_stock: state.items.iter().map(|i| i.quantity).sum(),
        low_stock_count,
        crucial_items: low,
        recent_transactions: recent,
    }
}

fn severity(item: &Item) -> f64 {
    item.quantity as f64 / item.low_stock_threshold as f64
}

fn newest_first<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Vec<&'a Transaction> {
    let mut sorted: Vec<_> = transactions.collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Transactions dated within the period, in ledger order.
pub fn in_period<'a, Tz: TimeZone>(
    state: &'a AppState,
    period: Period,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    let (start, end) = period.bounds(today);
    state
        .transactions
        .iter()
        .filter(|t| {
            let day = t.date.with_timezone(tz).date_naive();
            day >= start && day <= end
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodStats {
    pub stock_in: i64,
    pub stock_out: i64,
}

impl PeriodStats {
    pub fn net_change(&self) -> i64 {
        self.stock_in - self.stock_out
    }
}

pub fn period_stats(transactions: &[&Transaction]) -> PeriodStats {
    transactions
        .iter()
        .fold(PeriodStats::default(), |mut stats, t| {
            stats.stock_in += t.inbound();
            stats.stock_out += t.outbound();
            stats
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemActivity {
    pub item_id: String,
    pub name: String,
    pub stock_in: i64,
    pub stock_out: i64,
}

impl ItemActivity {
    pub fn total(&self) -> i64 {
        self.stock_in + self.stock_out
    }
}

/// The most active items among `transactions`, busiest first.
pub fn top_activity(state: &AppState, transactions: &[&Transaction]) -> Vec<ItemActivity> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();
    for t in transactions {
        let entry = totals.entry(t.item_id.as_str()).or_insert_with(|| {
            order.push(t.item_id.as_str());
            (0, 0)
        });
        entry.0 += t.inbound();
        entry.1 += t.outbound();
    }

    let mut activity: Vec<ItemActivity> = order
        .into_iter()
        .map(|id| {
            let (stock_in, stock_out) = totals.get(id).copied().unwrap_or_default();
            ItemActivity {
                item_id: id.to_string(),
                name: item_label(state, id).to_string(),
                stock_in,
                stock_out,
            }
        })
        .collect();
    // Stable sort keeps first-seen order among ties.
    activity.sort_by(|a, b| b.total().cmp(&a.total()));
    activity.truncate(TOP_ACTIVITY_LIMIT);
    activity
}

fn item_label<'a>(state: &'a AppState, item_id: &str) -> &'a str {
    state
        .item(item_id)
        .map(|i| i.name.as_str())
        .unwrap_or(DELETED_ITEM_LABEL)
}

/// Items with stock on hand, as (name, quantity) pairs.
pub fn stock_distribution(state: &AppState) -> Vec<(&str, i64)> {
    state
        .items
        .iter()
        .filter(|i| i.quantity > 0)
        .map(|i| (i.name.as_str(), i.quantity))
        .collect()
}

/// Ledger entries for one item, newest first.
pub fn item_history<'a>(state: &'a AppState, item_id: &str) -> Vec<&'a Transaction> {
    newest_first(state.transactions.iter().filter(|t| t.item_id == item_id))
}

/// Which transactions a history export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    AllWarehouses,
    CurrentWarehouse,
}

fn scope_label(state: &AppState, scope: ExportScope) -> String {
    match scope {
        ExportScope::AllWarehouses => "all_warehouses".to_string(),
        ExportScope::CurrentWarehouse => state
            .current_warehouse()
            .map(|w| w.name.split_whitespace().collect::<Vec<_>>().join("_"))
            .unwrap_or_else(|| "no_warehouse".to_string()),
    }
}

/// Default file name of a history export taken on `date`.
pub fn history_file_name(state: &AppState, scope: ExportScope, date: NaiveDate) -> String {
    format!(
        "bakul_tani_history_{}_{}.csv",
        scope_label(state, scope),
        date.format("%Y-%m-%d")
    )
}

fn type_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::In => "Stock in",
        TransactionType::Out => "Stock out",
        TransactionType::Adjustment => "Stock correction",
    }
}

/// Renders the transaction history as CSV, newest first.
pub fn history_csv<Tz: TimeZone>(
    state: &AppState,
    scope: ExportScope,
    tz: &Tz,
) -> Result<String, ReportError>
where
    Tz::Offset: fmt::Display,
{
    let warehouse_id = state.current_warehouse().map(|w| w.id.as_str());
    let transactions = newest_first(state.transactions.iter().filter(|t| match scope {
        ExportScope::AllWarehouses => true,
        ExportScope::CurrentWarehouse => state
            .item(&t.item_id)
            .is_some_and(|i| i.warehouse_id.as_deref() == warehouse_id),
    }));
    if transactions.is_empty() {
        return Err(ReportError::NothingToExport(scope_label(state, scope)));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Warehouse", "Item", "SKU", "Type", "Change", "Notes"])?;
    for t in transactions {
        let item = state.item(&t.item_id);
        let warehouse = item
            .and_then(|i| i.warehouse_id.as_deref())
            .and_then(|id| state.warehouse(id))
            .map_or("N/A", |w| w.name.as_str());
        let date = t.date.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string();
        writer.write_record([
            date.as_str(),
            warehouse,
            item.map_or(DELETED_ITEM_LABEL, |i| i.name.as_str()),
            item.map_or("N/A", |i| i.sku.as_str()),
            type_label(t.kind),
            t.signed_display().as_str(),
            t.notes.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
