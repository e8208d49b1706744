use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::api::ApiClient;
use crate::error::Result;
use crate::fmt::money;
use crate::settings::load_settings;
use crate::view_model::{group_by_institution, NetWorthTotals};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let api = ApiClient::new(&settings)?;
    let accounts = api.accounts()?.accounts;

    if accounts.is_empty() {
        println!("No accounts linked yet.");
        println!("Run `ledgerdeck items link` to connect your first institution.");
        return Ok(());
    }

    for group in group_by_institution(&accounts) {
        let mut table = Table::new();
        table.set_header(vec!["Account", "Type", "Balance"]);
        for account in &group.accounts {
            let kind = account
                .subtype
                .as_deref()
                .or(account.account_type.as_deref())
                .unwrap_or("");
            let balance = Cell::new(money(account.balance())).set_alignment(CellAlignment::Right);
            table.add_row(vec![
                Cell::new(account.display_name()),
                Cell::new(kind),
                balance,
            ]);
        }
        println!("{}\n{table}\n", group.institution_name.bold());
    }

    let totals = NetWorthTotals::from_accounts(&accounts);
    let mut summary = Table::new();
    summary.set_header(vec!["", "Total"]);
    for (label, value) in [
        ("Assets", totals.total_assets),
        ("Liabilities", totals.total_liabilities),
        ("Net worth", totals.net_worth),
    ] {
        summary.add_row(vec![
            Cell::new(label),
            Cell::new(money(value)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Summary\n{summary}");
    Ok(())
}
