// 💰 Money helpers - BRL rounding, parsing and display
// All amounts are rust_decimal::Decimal; floats never touch a price.

use anyhow::{anyhow, Context, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Round to cents, half away from zero (what card gateways charge)
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format as Brazilian Real: 1234.5 -> "R$ 1.234,50"
pub fn format_brl(value: Decimal) -> String {
    let mut rounded = round_cents(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(2);

    let text = rounded.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-R$ {},{}", grouped, frac_part)
    } else {
        format!("R$ {},{}", grouped, frac_part)
    }
}

/// Parse a price typed by staff: "150", "150.90", "150,90", "1.500" or "R$ 1.500,90"
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim().trim_start_matches("R$").trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Empty amount"));
    }

    // With a comma present it is the decimal separator and dots group thousands.
    // Without one, "1.500" and "1.500.000" are thousands groups; "150.90" is cents.
    let canonical = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if is_thousands_grouped(trimmed) {
        trimmed.replace('.', "")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&canonical).with_context(|| format!("Invalid amount: {:?}", input))
}

/// "1.500" / "12.345.678": every group after a dot is exactly three digits
fn is_thousands_grouped(text: &str) -> bool {
    let mut groups = text.split('.');
    let head = groups.next().unwrap_or_default();
    let mut tail = groups.peekable();

    !head.is_empty()
        && tail.peek().is_some()
        && tail.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}
