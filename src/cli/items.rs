use std::io::Write;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{ExchangeRequest, Institution, InstitutionMeta};
use crate::settings::load_settings;
use crate::view_model::format_relative_str;

/// The slice of the API the item commands touch. Mutations re-fetch
/// through the same surface, which keeps the delete-then-reload flow
/// testable without a server.
trait ItemsApi {
    fn list_items(&self) -> Result<Vec<Institution>>;
    fn remove_item(&self, item_id: &str) -> Result<serde_json::Value>;
}

impl ItemsApi for ApiClient {
    fn list_items(&self) -> Result<Vec<Institution>> {
        ApiClient::list_items(self)
    }

    fn remove_item(&self, item_id: &str) -> Result<serde_json::Value> {
        ApiClient::remove_item(self, item_id)
    }
}

/// Issue the DELETE, then one re-fetch of the institution list. The
/// refreshed list is what the caller renders; nothing is patched up
/// locally.
fn remove_and_reload(api: &impl ItemsApi, item_id: &str) -> Result<Vec<Institution>> {
    api.remove_item(item_id)?;
    api.list_items()
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn client() -> Result<ApiClient> {
    ApiClient::new(&load_settings())
}

fn items_table(items: &[Institution]) -> Table {
    let now = chrono::Utc::now();
    let mut table = Table::new();
    table.set_header(vec!["Item ID", "Institution", "Status", "Accounts", "Last Synced"]);
    for item in items {
        let synced = item
            .last_synced_at
            .as_deref()
            .map(|s| format_relative_str(s, now))
            .unwrap_or_else(|| "never".to_string());
        table.add_row(vec![
            Cell::new(&item.id),
            Cell::new(item.display_name()),
            Cell::new(&item.status),
            Cell::new(item.account_count),
            Cell::new(synced),
        ]);
    }
    table
}

pub fn list() -> Result<()> {
    let api = client()?;
    let items = api.list_items()?;

    if items.is_empty() {
        println!("No institutions linked.");
        println!("Run `ledgerdeck items link` to connect one.");
        return Ok(());
    }

    println!("Linked institutions\n{}", items_table(&items));
    Ok(())
}

/// Link a new institution. Plaid Link itself runs in a browser; this
/// walks the token exchange from the terminal.
pub fn link() -> Result<()> {
    let api = client()?;
    let link = api.create_link_token()?;

    println!("{}", "Link a new institution".bold());
    println!();
    println!("1. Open your server's link page (or any Plaid Link host) in a browser");
    println!("2. Paste this link token when asked:");
    println!();
    println!("   {}", link.link_token);
    if let Some(expiration) = &link.expiration {
        println!("   (expires {expiration})");
    }
    println!();
    println!("3. Complete the bank login, then copy the public token it returns.");
    println!();

    let public_token = prompt("Public token: ")?;
    if public_token.is_empty() {
        println!("Cancelled.");
        return Ok(());
    }
    let institution_name = prompt("Institution name (as shown in Plaid Link): ")?;
    let institution_id = prompt("Institution id (blank if unknown): ")?;

    let exchange = ExchangeRequest {
        public_token,
        institution: InstitutionMeta {
            institution_id: (!institution_id.is_empty()).then_some(institution_id),
            name: (!institution_name.is_empty()).then_some(institution_name),
        },
    };
    let response = api.exchange_token(&exchange)?;

    let name = response
        .institution_name
        .as_deref()
        .unwrap_or("institution");
    println!("\nLinked {name} (item {}).", response.item_id);
    println!("Running initial sync...");
    print_sync_result(&api.sync_item(&response.item_id)?);
    Ok(())
}

fn print_sync_result(result: &crate::models::SyncResult) {
    println!(
        "Synced {} account(s), {} transaction(s), {} holding(s).",
        result.accounts_synced, result.transactions_synced, result.holdings_synced
    );
    for error in &result.errors {
        eprintln!("  warning: {error}");
    }
}

pub fn sync(item_id: &str) -> Result<()> {
    let api = client()?;
    println!("Syncing {item_id}...");
    print_sync_result(&api.sync_item(item_id)?);
    Ok(())
}

pub fn sync_all() -> Result<()> {
    let api = client()?;
    println!("Syncing all institutions...");
    let result = api.sync_all()?;
    println!(
        "Done: {} synced, {} failed.",
        result.items_synced, result.items_failed
    );
    Ok(())
}

/// Unlink an institution. Destructive on the server side (removes the
/// item's accounts, transactions and holdings), so the institution name
/// must be typed back to confirm.
pub fn remove(item_id: &str) -> Result<()> {
    let api = client()?;
    let items = api.list_items()?;
    let Some(item) = items.iter().find(|i| i.id == item_id) else {
        println!("No linked institution with item id {item_id}.");
        println!("See `ledgerdeck items list`.");
        return Ok(());
    };

    let name = item.display_name().to_string();
    println!(
        "This removes {name} and deletes its {} account(s) and their data from the server.",
        item.account_count
    );
    let confirmation = prompt(&format!("Type \"{name}\" to confirm: "))?;
    if confirmation != name {
        println!("Cancelled.");
        return Ok(());
    }

    let remaining = remove_and_reload(&api, item_id)?;
    println!("Removed {name}.");
    if remaining.is_empty() {
        println!("No institutions remain linked.");
    } else {
        println!("Linked institutions\n{}", items_table(&remaining));
    }
    Ok(())
}
