//! French number rendering for documents and list totals

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::pricing::Quantity;

/// Two decimals, decimal comma, no thousands separator: `1000,00`
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let mut text = format!("{:.2}", rounded);
    if text == "-0.00" {
        text = "0.00".to_string();
    }
    text.replace('.', ",")
}

/// `1000,00 €`
pub fn format_euros(value: Decimal) -> String {
    format!("{} €", format_amount(value))
}

/// Percentage without trailing zeros: `50`, `33,5`
pub fn format_percent(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

/// Quantity cell: numbers get two decimals, tokens and legacy text are kept
/// verbatim, and the unit (if any) follows after a space.
pub fn format_quantity(quantity: &Quantity, unit: Option<&str>) -> String {
    let base = match quantity {
        Quantity::Numeric(q) => format_amount(*q),
        Quantity::Token(token) => token.as_str().to_string(),
        Quantity::Unspecified(raw) => raw.clone(),
    };

    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) if base.is_empty() => unit.to_string(),
        Some(unit) => format!("{} {}", base, unit),
        None => base,
    }
}
