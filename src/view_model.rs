use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Account, Transaction};

/// Decimal-exact account totals. Liability balances are counted by
/// absolute value, mirroring the server's own aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetWorthTotals {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub checking: Decimal,
    pub savings: Decimal,
    pub credit: Decimal,
    pub investment: Decimal,
}

impl NetWorthTotals {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let mut totals = Self::default();
        for account in accounts {
            let balance = account.balance();
            if account.is_asset {
                totals.total_assets += balance;
                match account.subtype.as_deref() {
                    Some("checking") => totals.checking += balance,
                    Some("savings") => totals.savings += balance,
                    _ => {
                        if account.account_type.as_deref() == Some("investment") {
                            totals.investment += balance;
                        }
                    }
                }
            } else {
                let debt = balance.abs();
                totals.total_liabilities += debt;
                if account.account_type.as_deref() == Some("credit") {
                    totals.credit += debt;
                }
            }
        }
        totals.net_worth = totals.total_assets - totals.total_liabilities;
        totals
    }
}

/// Accounts of one institution, in the order the accounts list presented
/// them.
#[derive(Debug, Clone)]
pub struct InstitutionGroup {
    pub item_id: String,
    pub institution_name: String,
    pub accounts: Vec<Account>,
}

/// Partition accounts by `plaid_item_id`, preserving first-seen
/// institution order. Every account lands in exactly one group.
pub fn group_by_institution(accounts: &[Account]) -> Vec<InstitutionGroup> {
    let mut groups: Vec<InstitutionGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for account in accounts {
        let key = account.plaid_item_id.clone();
        let idx = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(InstitutionGroup {
                item_id: key,
                institution_name: account
                    .institution_name
                    .clone()
                    .unwrap_or_else(|| "Unknown institution".to_string()),
                accounts: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].accounts.push(account.clone());
    }
    groups
}

/// "FOOD_AND_DRINK" / "food_and_drink" -> "Food And Drink";
/// missing or empty -> "Uncategorized".
pub fn title_case_category(category: Option<&str>) -> String {
    let raw = match category {
        Some(c) if !c.trim().is_empty() => c,
        _ => return "Uncategorized".to_string(),
    };
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relative age of a timestamp against an injected `now`:
/// "just now" (<1 min), "{m}m ago" (<60 min), "{h}h ago" (<24 h),
/// "{d}d ago" (<7 d), else the calendar date.
pub fn format_relative(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(t);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = elapsed.num_days();
    if days < 7 {
        return format!("{days}d ago");
    }
    t.format("%b %-d, %Y").to_string()
}

/// Parse an ISO timestamp (with or without offset) and format it relative
/// to `now`. Unparseable input is shown as-is rather than dropped.
pub fn format_relative_str(iso: &str, now: DateTime<Utc>) -> String {
    if let Ok(t) = DateTime::parse_from_rfc3339(iso) {
        return format_relative(t.with_timezone(&Utc), now);
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f") {
        return format_relative(naive.and_utc(), now);
    }
    iso.to_string()
}

/// CSV of the currently loaded transaction page. Exports only what is on
/// screen, not the full filtered result set — a documented limitation.
/// `account_names` maps account ids to display names.
pub fn transactions_csv(
    transactions: &[Transaction],
    account_names: &HashMap<String, String>,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Description", "Category", "Account", "Amount", "Currency"])?;

    for txn in transactions {
        let account = account_names
            .get(&txn.account_id)
            .map(String::as_str)
            .unwrap_or("");
        writer.write_record([
            txn.date.as_deref().unwrap_or(""),
            txn.description(),
            &title_case_category(txn.category.as_deref()),
            account,
            &txn.amount.to_string(),
            txn.currency(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::DeckError::Other(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::error::DeckError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn account(id: &str, item: &str, balance: Decimal, is_asset: bool) -> Account {
        let json = serde_json::json!({
            "id": id,
            "name": format!("Account {id}"),
            "plaid_item_id": item,
            "institution_name": format!("Bank {item}"),
            "is_asset": is_asset,
        });
        let mut account: Account = serde_json::from_value(json).unwrap();
        account.balance_current = Some(balance);
        account
    }

    fn txn(date: &str, name: &str, category: Option<&str>, account_id: &str, amount: Decimal) -> Transaction {
        let json = serde_json::json!({
            "date": date,
            "name": name,
            "account_id": account_id,
            "category": category,
        });
        let mut txn: Transaction = serde_json::from_value(json).unwrap();
        txn.amount = amount;
        txn
    }

    #[test]
    fn test_net_worth_identity_empty() {
        let totals = NetWorthTotals::from_accounts(&[]);
        assert_eq!(totals, NetWorthTotals::default());
        assert_eq!(totals.net_worth, Decimal::ZERO);
    }

    #[test]
    fn test_net_worth_identity() {
        let accounts = vec![
            account("a", "item-1", dec!(1000.10), true),
            account("b", "item-1", dec!(250.25), true),
            account("c", "item-2", dec!(-300.05), false),
        ];
        let totals = NetWorthTotals::from_accounts(&accounts);
        assert_eq!(totals.total_assets, dec!(1250.35));
        assert_eq!(totals.total_liabilities, dec!(300.05));
        assert_eq!(totals.net_worth, totals.total_assets - totals.total_liabilities);
        assert_eq!(totals.net_worth, dec!(950.30));
    }

    #[test]
    fn test_net_worth_no_float_drift() {
        // 0.1 + 0.2 style sums that drift under binary floats
        let accounts: Vec<Account> = (0..1000)
            .map(|i| account(&format!("a{i}"), "item-1", dec!(0.10), true))
            .collect();
        let totals = NetWorthTotals::from_accounts(&accounts);
        assert_eq!(totals.total_assets, dec!(100.00));
    }

    #[test]
    fn test_subtype_breakdown() {
        let mut checking = account("a", "i", dec!(100), true);
        checking.subtype = Some("checking".to_string());
        let mut credit = account("b", "i", dec!(-40), false);
        credit.account_type = Some("credit".to_string());
        let totals = NetWorthTotals::from_accounts(&[checking, credit]);
        assert_eq!(totals.checking, dec!(100));
        assert_eq!(totals.credit, dec!(40));
    }

    #[test]
    fn test_grouping_preserves_count_and_order() {
        let accounts = vec![
            account("a", "item-1", dec!(1), true),
            account("b", "item-2", dec!(1), true),
            account("c", "item-1", dec!(1), true),
            account("d", "item-3", dec!(1), true),
        ];
        let groups = group_by_institution(&accounts);
        assert_eq!(groups.len(), 3);
        // First-seen order
        assert_eq!(groups[0].item_id, "item-1");
        assert_eq!(groups[1].item_id, "item-2");
        assert_eq!(groups[2].item_id, "item-3");
        // Count invariant: every account in exactly one group
        let total: usize = groups.iter().map(|g| g.accounts.len()).sum();
        assert_eq!(total, accounts.len());
        assert_eq!(groups[0].accounts.len(), 2);
    }

    #[test]
    fn test_title_case_category() {
        assert_eq!(title_case_category(Some("FOOD_AND_DRINK")), "Food And Drink");
        assert_eq!(title_case_category(Some("travel")), "Travel");
        assert_eq!(title_case_category(Some("loan_payments")), "Loan Payments");
        assert_eq!(title_case_category(None), "Uncategorized");
        assert_eq!(title_case_category(Some("")), "Uncategorized");
        assert_eq!(title_case_category(Some("  ")), "Uncategorized");
    }

    #[test]
    fn test_format_relative_boundaries() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let at = |secs: i64| now - chrono::Duration::seconds(secs);

        assert_eq!(format_relative(at(0), now), "just now");
        assert_eq!(format_relative(at(59), now), "just now");
        assert_eq!(format_relative(at(60), now), "1m ago");
        assert_eq!(format_relative(at(59 * 60), now), "59m ago");
        assert_eq!(format_relative(at(60 * 60), now), "1h ago");
        assert_eq!(format_relative(at(24 * 3600 - 60), now), "23h ago");
        assert_eq!(format_relative(at(24 * 3600), now), "1d ago");
        assert_eq!(format_relative(at(6 * 24 * 3600), now), "6d ago");
        assert_eq!(format_relative(at(7 * 24 * 3600), now), "Aug 22, 2026");
    }

    #[test]
    fn test_format_relative_str_parses_server_timestamps() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        // Flask's isoformat() has no offset
        assert_eq!(format_relative_str("2026-08-29T11:30:00", now), "30m ago");
        assert_eq!(format_relative_str("2026-08-29T11:30:00+00:00", now), "30m ago");
        assert_eq!(format_relative_str("yesterday-ish", now), "yesterday-ish");
    }

    #[test]
    fn test_csv_round_trip_with_quoting() {
        let transactions = vec![
            txn("2026-08-01", "Safeway, Inc.", Some("FOOD_AND_DRINK"), "acc-1", dec!(54.10)),
            txn("2026-08-02", "Payroll", Some("INCOME"), "acc-2", dec!(-1850.00)),
        ];
        let mut names = HashMap::new();
        names.insert("acc-1".to_string(), "Checking, Primary".to_string());
        names.insert("acc-2".to_string(), "Savings".to_string());

        let csv_text = transactions_csv(&transactions, &names).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Date,Description,Category,Account,Amount,Currency"
        );
        // Comma-bearing free text is quoted
        let first = lines.next().unwrap();
        assert!(first.contains("\"Safeway, Inc.\""));
        assert!(first.contains("\"Checking, Primary\""));

        // Round trip: same number of data rows
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let rows: Vec<_> = reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), transactions.len());
        assert_eq!(&rows[1][1], "Payroll");
        assert_eq!(&rows[1][4], "-1850.00");
    }

    #[test]
    fn test_csv_empty_page_has_header_only() {
        let csv_text = transactions_csv(&[], &HashMap::new()).unwrap();
        assert_eq!(csv_text.lines().count(), 1);
    }
}
