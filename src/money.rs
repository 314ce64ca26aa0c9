//! Currency helpers.
//!
//! All amounts stay exact `Decimal` values through the pricing chain and are
//! rounded only when they are shown to a person.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::AppError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format as Brazilian reais, e.g. `R$ 190.43`.
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {:.2}", round_money(value))
}

fn too_large(what: &str) -> AppError {
    AppError::ValidationError(format!("{} is too large to compute", what))
}

/// `a * b`, reporting overflow as a validation error naming `what`
pub fn checked_mul(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, AppError> {
    a.checked_mul(b).ok_or_else(|| too_large(what))
}

/// `a + b`, reporting overflow as a validation error naming `what`
pub fn checked_add(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, AppError> {
    a.checked_add(b).ok_or_else(|| too_large(what))
}

/// Sum every value, failing on the first overflow
pub fn checked_sum<I>(values: I, what: &str) -> Result<Decimal, AppError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(acc, v, what))
}

/// Apply a percentage expressed in points (5 means 5%).
pub fn percent_of(base: Decimal, pct: Decimal) -> Result<Decimal, AppError> {
    Ok(checked_mul(base, pct, "percentage")? / HUNDRED)
}

/// Parse a money or quantity cell: trims, strips an `R$` prefix and accepts a
/// decimal comma. Empty input yields `None`.
pub fn parse_amount(raw: &str) -> Option<Result<Decimal, rust_decimal::Error>> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("R$")
        .map(str::trim)
        .unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }

    // "1.234,56" and "10,5" use a decimal comma. A comma before the last dot
    // ("1,234.56") is ambiguous and rejected.
    let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
        (Some(comma), Some(dot)) if dot > comma => {
            return Some(Err(rust_decimal::Error::ErrorString(format!(
                "ambiguous separators in '{}'",
                trimmed
            ))))
        }
        (Some(_), _) => trimmed.replace('.', "").replace(',', "."),
        (None, _) => trimmed.to_string(),
    };

    Some(normalized.parse::<Decimal>())
}
