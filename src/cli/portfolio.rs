use std::collections::BTreeMap;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::api::ApiClient;
use crate::error::Result;
use crate::fmt::{money, signed_percent};
use crate::settings::load_settings;

fn money_cell(value: Decimal) -> Cell {
    Cell::new(money(value)).set_alignment(CellAlignment::Right)
}

fn sector_summary(dist: &BTreeMap<String, Decimal>) -> String {
    dist.iter()
        .map(|(sector, pct)| format!("{sector} {:.1}%", pct.to_f64().unwrap_or(0.0)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let api = ApiClient::new(&settings)?;
    let portfolio = api.portfolio()?;
    let summary = &portfolio.summary;

    if summary.holdings.is_empty() {
        println!("No holdings found.");
        println!("Link an investment account with `ledgerdeck items link`, then sync.");
        return Ok(());
    }

    println!("{}", "Portfolio".bold());
    println!(
        "  Total value   {}   Cost basis {}   Gain/loss {} ({})",
        money(summary.total_value),
        money(summary.total_cost_basis),
        money(summary.total_gain_loss),
        signed_percent(summary.total_gain_loss_percent),
    );
    println!();

    let mut holdings = Table::new();
    holdings.set_header(vec![
        "Ticker", "Name", "Sector", "Qty", "Price", "Value", "Gain/Loss", "%",
    ]);
    for h in &summary.holdings {
        holdings.add_row(vec![
            Cell::new(h.ticker.as_deref().unwrap_or("\u{2014}")),
            Cell::new(h.name.as_deref().unwrap_or("")),
            Cell::new(h.sector.as_deref().unwrap_or("\u{2014}")),
            Cell::new(h.quantity).set_alignment(CellAlignment::Right),
            money_cell(h.price),
            money_cell(h.value),
            money_cell(h.gain_loss),
            Cell::new(signed_percent(h.gain_loss_percent)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Holdings\n{holdings}\n");

    if !summary.allocation.is_empty() {
        let mut allocation = Table::new();
        allocation.set_header(vec!["Type", "Value", "Percent"]);
        for (label, slice) in &summary.allocation {
            allocation.add_row(vec![
                Cell::new(label),
                money_cell(slice.value),
                Cell::new(format!("{:.1}%", slice.percent.to_f64().unwrap_or(0.0)))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        println!("Allocation\n{allocation}\n");
    }

    let risk = &portfolio.risk_analysis;
    println!("{}", "Risk".bold());
    println!(
        "  Diversification {}/100   Concentration: {}   Top holding {:.1}%",
        risk.diversification_score,
        if risk.concentration_risk.is_empty() {
            "unknown"
        } else {
            &risk.concentration_risk
        },
        risk.top_holding_percent.to_f64().unwrap_or(0.0),
    );
    if !risk.sector_distribution.is_empty() {
        println!("  Sectors: {}", sector_summary(&risk.sector_distribution));
    }
    for rec in &risk.recommendations {
        println!("  - {rec}");
    }
    println!();

    let dividends = &portfolio.dividends;
    println!("{}", "Dividends (12 months)".bold());
    println!(
        "  Income {}   Monthly average {}   Payments {}",
        money(dividends.total_dividend_income),
        money(dividends.average_monthly),
        dividends.dividend_count,
    );
    Ok(())
}
