use std::path::PathBuf;

use chrono::Local;
use clap::{Args, Subcommand, ValueEnum};

use bakul_tani_core::reports::{self, ExportScope, Period, DELETED_ITEM_LABEL};

use super::{find_item, truncate, OutputFormat};
use crate::session::Session;

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    /// Every warehouse
    All,
    /// Only the current warehouse
    Current,
}

impl From<ScopeArg> for ExportScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::All => ExportScope::AllWarehouses,
            ScopeArg::Current => ExportScope::CurrentWarehouse,
        }
    }
}

#[derive(Args)]
pub struct ReportCommand {
    #[command(subcommand)]
    pub command: ReportSubcommand,
}

#[derive(Subcommand)]
pub enum ReportSubcommand {
    /// Stock totals, low-stock items and recent activity
    Summary,

    /// Stock movement over a period
    Stats {
        /// Period: 7d, 30d, this-month, last-month
        #[arg(long, short, default_value = "7d")]
        period: Period,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Transaction history, newest first
    History {
        /// Limit to one item (ID or name)
        item: Option<String>,

        /// Maximum number of entries to show
        #[arg(long, short, default_value_t = 20)]
        limit: usize,
    },

    /// Export transaction history as CSV
    Export {
        /// Which warehouses to include
        #[arg(long, value_enum, default_value = "all")]
        scope: ScopeArg,

        /// Output file (defaults to a dated name in the working directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl ReportCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        match &self.command {
            ReportSubcommand::Summary => {
                let summary = reports::summary(&state);
                let warehouse = state.current_warehouse().map_or("N/A", |w| w.name.as_str());

                println!("Warehouse:       {}", warehouse);
                println!("Total stock:     {}", summary.total_stock);
                println!("Items:           {}", state.items.len());
                println!("Low stock items: {}", summary.low_stock_count);
                println!("Pending sync:    {}", state.pending_count());

                if !summary.crucial_items.is_empty() {
                    println!("\nNeeds restocking:");
                    for item in &summary.crucial_items {
                        println!("  {}", item);
                    }
                }

                if !summary.recent_transactions.is_empty() {
                    println!("\nRecent activity:");
                    for t in &summary.recent_transactions {
                        let name = state
                            .item(&t.item_id)
                            .map_or(DELETED_ITEM_LABEL, |i| i.name.as_str());
                        println!("  {}  {}", t, name);
                    }
                }
                Ok(())
            }

            ReportSubcommand::Stats { period, format } => {
                let today = Local::now().date_naive();
                let transactions = reports::in_period(&state, *period, today, &Local);
                let stats = reports::period_stats(&transactions);
                let top = reports::top_activity(&state, &transactions);

                match format {
                    OutputFormat::Json => {
                        let top: Vec<_> = top
                            .iter()
                            .map(|a| {
                                serde_json::json!({
                                    "itemId": a.item_id,
                                    "name": a.name,
                                    "stockIn": a.stock_in,
                                    "stockOut": a.stock_out,
                                })
                            })
                            .collect();
                        let value = serde_json::json!({
                            "period": period.to_string(),
                            "stockIn": stats.stock_in,
                            "stockOut": stats.stock_out,
                            "netChange": stats.net_change(),
                            "topItems": top,
                            "distribution": reports::stock_distribution(&state),
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", period.label());
                        println!("  Stock in:   {:+}", stats.stock_in);
                        println!("  Stock out:  {}", -stats.stock_out);
                        println!("  Net change: {:+}", stats.net_change());

                        if top.is_empty() {
                            println!("\nNo activity in this period");
                        } else {
                            println!("\n{:<30}  {:>8}  {:>8}", "MOST ACTIVE", "IN", "OUT");
                            println!("{}", "-".repeat(50));
                            for activity in &top {
                                println!(
                                    "{:<30}  {:>8}  {:>8}",
                                    truncate(&activity.name, 30),
                                    activity.stock_in,
                                    activity.stock_out
                                );
                            }
                        }

                        let distribution = reports::stock_distribution(&state);
                        if !distribution.is_empty() {
                            println!("\nStock on hand:");
                            for (name, quantity) in distribution {
                                println!("  {:<30}  {:>8}", truncate(name, 30), quantity);
                            }
                        }
                    }
                }
                Ok(())
            }

            ReportSubcommand::History { item, limit } => {
                let history = match item {
                    Some(identifier) => {
                        let item = find_item(&state, identifier)?;
                        reports::item_history(&state, &item.id)
                    }
                    None => {
                        let mut all: Vec<_> = state.transactions.iter().collect();
                        all.sort_by(|a, b| b.date.cmp(&a.date));
                        all
                    }
                };

                if history.is_empty() {
                    println!("No transactions found");
                    return Ok(());
                }

                for t in history.iter().take(*limit) {
                    let name = state
                        .item(&t.item_id)
                        .map_or(DELETED_ITEM_LABEL, |i| i.name.as_str());
                    println!("{}  {}", t, name);
                }
                if history.len() > *limit {
                    println!("\n... {} more", history.len() - limit);
                }
                Ok(())
            }

            ReportSubcommand::Export { scope, output } => {
                let scope = ExportScope::from(*scope);
                let csv = reports::history_csv(&state, scope, &Local)?;
                let path = output.clone().unwrap_or_else(|| {
                    PathBuf::from(reports::history_file_name(
                        &state,
                        scope,
                        Local::now().date_naive(),
                    ))
                });
                std::fs::write(&path, csv)?;
                println!("History exported to {}", path.display());
                Ok(())
            }
        }
    }
}
