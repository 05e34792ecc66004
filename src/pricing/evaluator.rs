//! Base amount for the model the resolver picked.

use chrono::{DateTime, Duration, TimeZone};
use rust_decimal::Decimal;

use super::calendar::is_weekend;
use super::resolver::{PricingModel, TariffRates};
use crate::error::PricingError;
use crate::models::{FALLBACK_EXTRA_DISTANCE_RATE, MinimumBookingRule, Slab, SlabType};

/// Base price plus the distance terms the surcharge step needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCharge {
    pub base_price: Decimal,
    pub included_distance: Decimal,
    pub extra_distance_rate: Decimal,
}

pub fn evaluate<Tz: TimeZone>(
    model: &PricingModel<'_>,
    pickup: &DateTime<Tz>,
    duration_hours: Decimal,
) -> Result<BaseCharge, PricingError> {
    match model {
        PricingModel::Tariff(rates) => evaluate_tariff(rates, pickup, duration_hours),
        PricingModel::Package12Hour {
            price,
            km_limit,
            excess_distance_rate,
        } => Ok(BaseCharge {
            base_price: *price,
            included_distance: km_limit.map(Decimal::from).unwrap_or(Decimal::ZERO),
            extra_distance_rate: excess_distance_rate.unwrap_or(FALLBACK_EXTRA_DISTANCE_RATE),
        }),
        PricingModel::Slab { slab_type, slab } => {
            evaluate_slab(*slab_type, slab, duration_hours).map(|base_price| BaseCharge {
                base_price,
                included_distance: slab.included_km,
                extra_distance_rate: slab.extra_km_price,
            })
        }
        PricingModel::Legacy {
            hourly_rate,
            km_limit,
        } => Ok(BaseCharge {
            base_price: hourly_rate
                .checked_mul(duration_hours)
                .ok_or(PricingError::AmountOverflow("legacy base price"))?,
            included_distance: km_limit.map(Decimal::from).unwrap_or(Decimal::ZERO),
            extra_distance_rate: FALLBACK_EXTRA_DISTANCE_RATE,
        }),
    }
}

/// Slab price after the range check and the minimum-booking rule.
pub fn evaluate_slab(
    slab_type: SlabType,
    slab: &Slab,
    duration_hours: Decimal,
) -> Result<Decimal, PricingError> {
    if duration_hours < slab.duration_min || duration_hours > slab.duration_max {
        return Err(PricingError::DurationOutOfRange {
            requested: slab_type,
            duration_hours,
            min: slab.duration_min,
            max: slab.duration_max,
        });
    }

    match slab.minimum_booking_rule {
        MinimumBookingRule::None => Ok(slab.price),
        MinimumBookingRule::MinPrice => Ok(slab.price.max(slab.minimum_value)),
        MinimumBookingRule::MinDuration if duration_hours < slab.minimum_value => {
            if duration_hours <= Decimal::ZERO {
                return Err(PricingError::InvalidDuration { duration_hours });
            }
            slab.minimum_value
                .checked_div(duration_hours)
                .and_then(|ratio| ratio.checked_mul(slab.price))
                .ok_or(PricingError::AmountOverflow("minimum duration price"))
        }
        MinimumBookingRule::MinDuration => Ok(slab.price),
    }
}

/// Walks the billed duration hour by hour from pickup. Each increment is
/// charged at the weekend or weekday rate of the instant it starts on; the
/// last increment is pro-rated.
pub fn evaluate_tariff<Tz: TimeZone>(
    rates: &TariffRates,
    pickup: &DateTime<Tz>,
    duration_hours: Decimal,
) -> Result<BaseCharge, PricingError> {
    let billed_hours = duration_hours.max(rates.min_booking_hours);

    let mut base_price = Decimal::ZERO;
    let mut remaining = billed_hours;
    let mut instant = pickup.clone();
    while remaining > Decimal::ZERO {
        let increment = remaining.min(Decimal::ONE);
        let rate = if is_weekend(&instant) {
            rates.weekend_rate
        } else {
            rates.weekday_rate
        };
        base_price = rate
            .checked_mul(increment)
            .and_then(|charge| base_price.checked_add(charge))
            .ok_or(PricingError::AmountOverflow("tariff base price"))?;
        remaining -= increment;
        instant = instant + Duration::hours(1);
    }

    let included_distance = match (rates.km_limit, rates.km_limit_per_hour) {
        (Some(km_limit), _) => Decimal::from(km_limit),
        (None, Some(per_hour)) => per_hour
            .checked_mul(billed_hours)
            .ok_or(PricingError::AmountOverflow("included distance"))?,
        (None, None) => Decimal::ZERO,
    };

    Ok(BaseCharge {
        base_price,
        included_distance,
        extra_distance_rate: rates.excess_distance_rate,
    })
}
