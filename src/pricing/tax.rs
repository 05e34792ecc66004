//! Percentage tax on the subtotal.

use rust_decimal::Decimal;

use crate::error::PricingError;

/// Tax on the surged price plus distance charge. Kept at full precision;
/// only display code rounds.
pub fn tax_amount(subtotal: Decimal, tax_percentage: Decimal) -> Result<Decimal, PricingError> {
    subtotal
        .checked_mul(tax_percentage)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::AmountOverflow("tax"))
}
