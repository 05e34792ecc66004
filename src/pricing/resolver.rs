//! Picks exactly one pricing model for a bike.
//!
//! Newer models override older ones, in this order:
//! tariff, 12-hour package, requested slab, legacy hourly rate.
//! Old bikes keep whatever fields they were created with, so every model is
//! tried in turn instead of assuming a single schema.

use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::error::PricingError;
use crate::models::{PricingConfiguration, PricingType, Slab, SlabType};

/// Longest rental the 12-hour package still covers.
pub const PACKAGE_MAX_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct TariffRates {
    pub weekday_rate: Decimal,
    pub weekend_rate: Decimal,
    pub min_booking_hours: Decimal,
    pub km_limit: Option<i32>,
    pub km_limit_per_hour: Option<Decimal>,
    pub excess_distance_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PricingModel<'a> {
    Tariff(TariffRates),
    Package12Hour {
        price: Decimal,
        km_limit: Option<i32>,
        excess_distance_rate: Option<Decimal>,
    },
    Slab {
        slab_type: SlabType,
        slab: &'a Slab,
    },
    Legacy {
        hourly_rate: Decimal,
        km_limit: Option<i32>,
    },
}

impl PricingModel<'_> {
    pub fn pricing_type(&self) -> PricingType {
        match self {
            PricingModel::Tariff(_) => PricingType::Tariff,
            PricingModel::Package12Hour { .. } => PricingType::Package12Hour,
            PricingModel::Slab { slab_type, .. } => PricingType::from(*slab_type),
            PricingModel::Legacy { .. } => PricingType::Legacy,
        }
    }

    /// Weekend surge only applies to the per-booking models. Tariffs already
    /// price weekend hours, and the package is a flat fee.
    pub fn surges_on_weekends(&self) -> bool {
        matches!(self, PricingModel::Slab { .. } | PricingModel::Legacy { .. })
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

fn tariff_rates(config: &PricingConfiguration) -> Option<TariffRates> {
    let weekday = positive(config.weekday_hourly_rate);
    let weekend = positive(config.weekend_hourly_rate);

    // A tariff with one side missing charges the other side's rate
    let (weekday_rate, weekend_rate) = match (weekday, weekend) {
        (Some(weekday), Some(weekend)) => (weekday, weekend),
        (Some(rate), None) | (None, Some(rate)) => (rate, rate),
        (None, None) => return None,
    };

    Some(TariffRates {
        weekday_rate,
        weekend_rate,
        min_booking_hours: config.min_booking_hours.unwrap_or(Decimal::ZERO),
        km_limit: config.km_limit,
        km_limit_per_hour: config.km_limit_per_hour,
        excess_distance_rate: config.excess_distance_rate.unwrap_or(Decimal::ZERO),
    })
}

pub fn resolve(
    config: &PricingConfiguration,
    duration_hours: Decimal,
    requested: Option<SlabType>,
) -> Result<PricingModel<'_>, PricingError> {
    if let Some(rates) = tariff_rates(config) {
        return Ok(PricingModel::Tariff(rates));
    }

    if duration_hours <= PACKAGE_MAX_HOURS
        && let Some(price) = positive(config.package_12_hour)
    {
        return Ok(PricingModel::Package12Hour {
            price,
            km_limit: config.km_limit,
            excess_distance_rate: config.excess_distance_rate,
        });
    }

    if let Some(slab_type) = requested
        && let Some(slab) = config.slabs.get(slab_type)
    {
        return Ok(PricingModel::Slab { slab_type, slab });
    }

    if let Some(hourly_rate) = positive(config.legacy_hourly_rate) {
        return Ok(PricingModel::Legacy {
            hourly_rate,
            km_limit: config.km_limit,
        });
    }

    Err(PricingError::NoPricingConfigured)
}

/// Slab tabs a booking UI can offer before any window is chosen.
///
/// Configured slabs are listed as-is. Tariff and legacy bikes are billed by
/// the hour, so they offer `hourly`. A package-only bike offers nothing.
pub fn available_pricing_types(config: &PricingConfiguration) -> BTreeSet<SlabType> {
    let mut types: BTreeSet<SlabType> = config
        .slabs
        .iter()
        .map(|(slab_type, _)| slab_type)
        .collect();

    if tariff_rates(config).is_some() || positive(config.legacy_hourly_rate).is_some() {
        types.insert(SlabType::Hourly);
    }

    types
}
