mod api;
mod charts;
mod cli;
mod error;
mod filters;
mod fmt;
mod models;
mod settings;
mod tui;
mod view_model;

use clap::Parser;

use cli::{Cli, Commands, ItemsCommands, UserCommands};
use filters::FilterState;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Dashboard) => cli::dashboard::run(),
        Some(Commands::Transactions {
            search,
            from_date,
            to_date,
            account,
            flow_type,
            per_page,
        }) => {
            let mut filters = FilterState::default();
            if let Some(per_page) = per_page {
                filters.per_page = per_page.clamp(1, 100);
            }
            if let Some(search) = search {
                filters.set_search(search);
            }
            filters.set_date_range(from_date, to_date);
            filters.set_account(account);
            filters.set_flow_type(flow_type);
            cli::transactions::run(filters)
        }
        Some(Commands::Accounts) => cli::accounts::run(),
        Some(Commands::Portfolio) => cli::portfolio::run(),
        Some(Commands::NetWorth { days }) => cli::net_worth::run(days),
        Some(Commands::Items { command }) => match command {
            ItemsCommands::List => cli::items::list(),
            ItemsCommands::Link => cli::items::link(),
            ItemsCommands::Sync { item_id } => cli::items::sync(&item_id),
            ItemsCommands::SyncAll => cli::items::sync_all(),
            ItemsCommands::Remove { item_id } => cli::items::remove(&item_id),
        },
        Some(Commands::User { command }) => match command {
            UserCommands::Profile {
                first_name,
                last_name,
                currency,
                timezone,
            } => cli::user::profile(first_name, last_name, currency, timezone),
            UserCommands::Password => cli::user::password(),
            UserCommands::Delete => cli::user::delete(),
        },
        Some(Commands::Connect { url, token }) => cli::connect::run(&url, token),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
