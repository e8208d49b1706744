use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Format a decimal as a dollar amount with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let abs = val
        .abs()
        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    let cents = format!("{abs:.2}");
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Format an integer count with thousands separators: 12,345
pub fn number(val: u64) -> String {
    let digits = val.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Compact dollar label for chart axes: "$5k", "$2.5k", "$1M".
pub fn money_compact(val: f64) -> String {
    if val >= 1_000_000.0 {
        let m = val / 1_000_000.0;
        if m == m.floor() {
            format!("${}M", m as u64)
        } else {
            format!("${m:.1}M")
        }
    } else if val >= 1000.0 {
        let k = val / 1000.0;
        if k == k.floor() {
            format!("${}k", k as u64)
        } else {
            format!("${k:.1}k")
        }
    } else {
        format!("${}", val as u64)
    }
}

/// Format a percentage with one decimal and sign: "+4.2%", "-0.3%".
pub fn signed_percent(val: Decimal) -> String {
    let v = val.round_dp(1).to_f64().unwrap_or(0.0);
    if v >= 0.0 {
        format!("+{v:.1}%")
    } else {
        format!("{v:.1}%")
    }
}
