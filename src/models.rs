use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A linked financial institution (one Plaid item).
#[derive(Debug, Clone, Deserialize)]
pub struct Institution {
    pub id: String,
    pub institution_name: Option<String>,
    #[serde(default)]
    pub status: String,
    pub last_synced_at: Option<String>,
    #[serde(default)]
    pub account_count: u32,
}

impl Institution {
    pub fn display_name(&self) -> &str {
        self.institution_name.as_deref().unwrap_or("Unknown institution")
    }
}

/// Account as served by the dashboard API. Read-only from the client's
/// perspective; balances change only through a sync.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: Option<String>,
    pub mask: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    pub subtype: Option<String>,
    pub balance_current: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_asset: bool,
    #[serde(default)]
    pub plaid_item_id: String,
    #[serde(default)]
    pub institution_name: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Account {
    pub fn balance(&self) -> Decimal {
        self.balance_current.unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        let name = self.name.as_deref().unwrap_or("Account");
        match self.mask.as_deref() {
            Some(mask) if !mask.is_empty() => format!("{name} \u{2022}{mask}"),
            _ => name.to_string(),
        }
    }
}

/// Sign convention (Plaid): negative = income/credit, positive = expense/debit.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub date: Option<String>,
    pub name: Option<String>,
    pub merchant_name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

impl Transaction {
    /// Merchant name when known, otherwise the raw transaction name.
    pub fn description(&self) -> &str {
        self.merchant_name
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.name.as_deref())
            .unwrap_or("(no description)")
    }

    pub fn currency(&self) -> &str {
        self.iso_currency_code.as_deref().unwrap_or("USD")
    }
}

/// Server-authoritative pagination metadata. The client never computes
/// `pages` itself.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default)]
    pub has_next: bool,
}

fn default_page() -> u32 {
    1
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: 0,
            total: 0,
            pages: 0,
            has_prev: false,
            has_next: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub pagination: PageMeta,
}

/// One security position inside an investment account.
#[derive(Debug, Clone, Deserialize)]
pub struct Holding {
    #[serde(alias = "ticker_symbol")]
    pub ticker: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub security_type: Option<String>,
    pub sector: Option<String>,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub cost_basis: Decimal,
    #[serde(default)]
    pub gain_loss: Decimal,
    #[serde(default)]
    pub gain_loss_percent: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AllocationSlice {
    #[serde(default)]
    pub value: Decimal,
    #[serde(default)]
    pub percent: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioSummary {
    #[serde(default)]
    pub total_value: Decimal,
    #[serde(default)]
    pub total_cost_basis: Decimal,
    #[serde(default)]
    pub total_gain_loss: Decimal,
    #[serde(default)]
    pub total_gain_loss_percent: Decimal,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub allocation: BTreeMap<String, AllocationSlice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskAnalysis {
    #[serde(default)]
    pub diversification_score: u32,
    #[serde(default)]
    pub concentration_risk: String,
    #[serde(default)]
    pub top_holding_percent: Decimal,
    #[serde(default)]
    pub sector_distribution: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DividendSummary {
    #[serde(default)]
    pub total_dividend_income: Decimal,
    #[serde(default)]
    pub average_monthly: Decimal,
    #[serde(default)]
    pub dividend_count: u32,
}

/// `GET /api/dashboard/portfolio` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioResponse {
    #[serde(default)]
    pub summary: PortfolioSummary,
    #[serde(default)]
    pub risk_analysis: RiskAnalysis,
    #[serde(default)]
    pub dividends: DividendSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetWorthChange {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub percent: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetWorthChanges {
    #[serde(default)]
    pub daily: NetWorthChange,
    #[serde(default)]
    pub weekly: NetWorthChange,
    #[serde(default)]
    pub monthly: NetWorthChange,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetWorthSummary {
    #[serde(default)]
    pub net_worth: Decimal,
    #[serde(default)]
    pub total_assets: Decimal,
    #[serde(default)]
    pub total_liabilities: Decimal,
    #[serde(default)]
    pub liquid_assets: Decimal,
    #[serde(default)]
    pub investment_assets: Decimal,
    #[serde(default)]
    pub changes: NetWorthChanges,
}

/// One point of the historical net-worth series.
#[derive(Debug, Clone, Deserialize)]
pub struct NetWorthPoint {
    #[serde(alias = "snapshot_date")]
    pub date: Option<String>,
    #[serde(default)]
    pub net_worth: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetWorthHistory {
    #[serde(default)]
    pub current: NetWorthSummary,
    #[serde(default)]
    pub history: Vec<NetWorthPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyFlow {
    pub date: Option<String>,
    #[serde(default)]
    pub income: Decimal,
    #[serde(default)]
    pub expenses: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CashFlow {
    #[serde(default)]
    pub total_income: Decimal,
    #[serde(default)]
    pub total_expenses: Decimal,
    #[serde(default)]
    pub net_cash_flow: Decimal,
    #[serde(default)]
    pub savings_rate: Decimal,
    #[serde(default)]
    pub expenses_by_category: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub daily_data: Vec<DailyFlow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverviewSummary {
    #[serde(default)]
    pub institutions_linked: u32,
    #[serde(default)]
    pub accounts_count: u32,
    #[serde(default)]
    pub last_sync: Option<String>,
}

/// `GET /api/dashboard/overview` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Overview {
    #[serde(default)]
    pub net_worth: NetWorthSummary,
    #[serde(default)]
    pub cash_flow: CashFlow,
    #[serde(default)]
    pub portfolio: PortfolioSummary,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
    #[serde(default)]
    pub summary: OverviewSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkTokenResponse {
    pub link_token: String,
    #[serde(default)]
    pub expiration: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRequest {
    pub public_token: String,
    pub institution: InstitutionMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstitutionMeta {
    pub institution_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub institution_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResult {
    #[serde(default)]
    pub accounts_synced: u32,
    #[serde(default)]
    pub transactions_synced: u32,
    #[serde(default)]
    pub holdings_synced: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncAllResult {
    #[serde(default)]
    pub items_synced: u32,
    #[serde(default)]
    pub items_failed: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.default_currency.is_none()
            && self.timezone.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}
