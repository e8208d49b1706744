pub mod accounts;
pub mod connect;
pub mod dashboard;
pub mod items;
pub mod net_worth;
pub mod portfolio;
pub mod transactions;
pub mod user;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ledgerdeck",
    about = "Terminal dashboard for a Plaid-linked personal finance server."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive overview dashboard (default when no command is given).
    Dashboard,
    /// Interactively browse transactions with search and filters.
    Transactions {
        /// Initial search term
        #[arg(long)]
        search: Option<String>,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Filter by account id
        #[arg(long)]
        account: Option<String>,
        /// Filter by flow: income or expense
        #[arg(long = "type")]
        flow_type: Option<String>,
        /// Transactions per page
        #[arg(long = "per-page")]
        per_page: Option<u32>,
    },
    /// List accounts grouped by institution, with balance totals.
    Accounts,
    /// Holdings, allocation, risk and dividend summary.
    Portfolio,
    /// Net worth summary and history.
    NetWorth {
        /// History window in days
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Manage linked institutions.
    Items {
        #[command(subcommand)]
        command: ItemsCommands,
    },
    /// Manage your user profile.
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Point ledgerdeck at a server and store the API token.
    Connect {
        /// Server URL, e.g. http://localhost:5000
        url: String,
        /// Bearer token for the API (prompted when omitted)
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ItemsCommands {
    /// List linked institutions with sync status.
    List,
    /// Link a new institution via Plaid Link.
    Link,
    /// Sync one institution by item id.
    Sync {
        /// Item id (shown in `ledgerdeck items list`)
        item_id: String,
    },
    /// Sync every linked institution.
    SyncAll,
    /// Unlink an institution and delete its local data on the server.
    Remove {
        /// Item id (shown in `ledgerdeck items list`)
        item_id: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Update profile fields.
    Profile {
        #[arg(long = "first-name")]
        first_name: Option<String>,
        #[arg(long = "last-name")]
        last_name: Option<String>,
        /// ISO currency code, e.g. USD
        #[arg(long)]
        currency: Option<String>,
        /// IANA timezone, e.g. America/Los_Angeles
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Change your password.
    Password,
    /// Permanently delete your account and all synced data.
    Delete,
}
