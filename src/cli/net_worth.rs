use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::api::ApiClient;
use crate::error::Result;
use crate::fmt::{money, signed_percent};
use crate::settings::load_settings;

pub fn run(days: u32) -> Result<()> {
    let settings = load_settings();
    let api = ApiClient::new(&settings)?;
    let data = api.net_worth(days)?;
    let current = &data.current;

    println!("{}", "Net Worth".bold());
    let mut summary = Table::new();
    summary.set_header(vec!["", "Amount"]);
    for (label, value) in [
        ("Net worth", current.net_worth),
        ("Total assets", current.total_assets),
        ("Total liabilities", current.total_liabilities),
        ("Liquid assets", current.liquid_assets),
        ("Investments", current.investment_assets),
    ] {
        summary.add_row(vec![
            Cell::new(label),
            Cell::new(money(value)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{summary}\n");

    let changes = &current.changes;
    println!(
        "Change: {} today ({})   {} this week ({})   {} this month ({})",
        money(changes.daily.amount),
        signed_percent(changes.daily.percent),
        money(changes.weekly.amount),
        signed_percent(changes.weekly.percent),
        money(changes.monthly.amount),
        signed_percent(changes.monthly.percent),
    );

    if data.history.is_empty() {
        println!("\nNo history recorded yet. Snapshots appear after your first sync.");
        return Ok(());
    }

    let mut history = Table::new();
    history.set_header(vec!["Date", "Net worth"]);
    for point in &data.history {
        history.add_row(vec![
            Cell::new(point.date.as_deref().unwrap_or("")),
            Cell::new(money(point.net_worth)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("\nHistory (last {days} days)\n{history}");
    Ok(())
}
