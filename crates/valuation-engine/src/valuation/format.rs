//! Rounding and display helpers used when describing adjustments.
//!
//! Engine outputs stay unrounded; these only shape the human-readable strings and
//! give callers a consistent rounding rule for presentation.

use super::domain::{Measurement, Money};

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub fn round_currency(value: Money) -> Money {
    round_to(value, 2)
}

pub fn round_percentage(value: f64) -> f64 {
    round_to(value, 2)
}

/// Whole-dollar amount with thousands separators, e.g. `$2,500,000` or `-$8,500`.
pub fn money(value: Money) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

/// Like [`money`] but always carries a sign for non-zero amounts.
pub fn signed_money(value: Money) -> String {
    if value.round() > 0.0 {
        format!("+{}", money(value))
    } else {
        money(value)
    }
}

pub fn signed_percentage(value: f64) -> String {
    let rounded = round_percentage(value);
    if rounded > 0.0 {
        format!("+{rounded:.2}%")
    } else if rounded < 0.0 {
        format!("{rounded:.2}%")
    } else {
        "0.00%".to_string()
    }
}

pub fn area(measurement: &Measurement) -> String {
    format!(
        "{} {}",
        trim_number(measurement.value),
        measurement.unit.label()
    )
}

pub fn rate(value: Money) -> String {
    if value.fract() == 0.0 {
        money(value)
    } else {
        let sign = if value < 0.0 { "-" } else { "" };
        let cents = (value.abs() * 100.0).round() as u64;
        format!("{sign}${}.{:02}", group_thousands(cents / 100), cents % 100)
    }
}

/// Up to two decimals, with trailing zeros removed.
pub fn trim_number(value: f64) -> String {
    let formatted = format!("{:.2}", round_to(value, 2));
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
