//! Weekend surge and excess distance charges applied on top of the base price.

use rust_decimal::Decimal;

use crate::error::PricingError;

#[derive(Debug, Clone, PartialEq)]
pub struct WeekendSurge {
    pub price_after_surge: Decimal,
    /// Multiplier actually applied; 1 when no surge happened.
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcessDistance {
    pub distance: Decimal,
    pub charge: Decimal,
}

pub fn weekend_surge(
    base_price: Decimal,
    multiplier: Decimal,
    applies: bool,
) -> Result<WeekendSurge, PricingError> {
    if !applies {
        return Ok(WeekendSurge {
            price_after_surge: base_price,
            multiplier: Decimal::ONE,
        });
    }

    let price_after_surge = base_price
        .checked_mul(multiplier)
        .ok_or(PricingError::AmountOverflow("weekend surge"))?;
    Ok(WeekendSurge {
        price_after_surge,
        multiplier,
    })
}

/// Distance beyond the allowance. Estimates have no actual distance yet and
/// always come out as zero.
pub fn excess_distance(
    actual_distance: Option<Decimal>,
    included_distance: Decimal,
    rate: Decimal,
) -> Result<ExcessDistance, PricingError> {
    match actual_distance {
        Some(actual) if actual > included_distance => {
            let distance = actual
                .checked_sub(included_distance)
                .ok_or(PricingError::AmountOverflow("excess distance"))?;
            let charge = distance
                .checked_mul(rate)
                .ok_or(PricingError::AmountOverflow("excess distance charge"))?;
            Ok(ExcessDistance { distance, charge })
        }
        _ => Ok(ExcessDistance {
            distance: Decimal::ZERO,
            charge: Decimal::ZERO,
        }),
    }
}
