use chrono::{DateTime, Duration, TimeZone};
use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::models::{PricingConfiguration, Slab, SlabType};

/// Longest rental window accepted, and the cap on `min_booking_hours`.
pub const MAX_RENTAL_HOURS: i64 = 24 * 366;

pub const MAX_DISTANCE_KM: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Upper bound for any configured price, rate or slab value.
pub const MAX_RATE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

pub const MAX_SURGE_MULTIPLIER: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

pub fn validate_rental_window<Tz: TimeZone>(
    pickup: &DateTime<Tz>,
    dropoff: &DateTime<Tz>,
) -> Result<()> {
    if dropoff <= pickup {
        return Err(AppError::InvalidRentalWindow);
    }
    if dropoff.clone().signed_duration_since(pickup) > Duration::hours(MAX_RENTAL_HOURS) {
        return Err(AppError::RentalTooLong {
            max_hours: MAX_RENTAL_HOURS,
        });
    }
    Ok(())
}

pub fn validate_distance(distance: &Decimal) -> Result<()> {
    if distance < &Decimal::ZERO || distance > &MAX_DISTANCE_KM {
        return Err(AppError::InvalidDistance(*distance));
    }
    Ok(())
}

fn invalid(message: String) -> AppError {
    AppError::InvalidPricingConfiguration(message)
}

pub fn validate_rate(name: &str, value: Option<&Decimal>) -> Result<()> {
    match value {
        Some(v) if v < &Decimal::ZERO => Err(invalid(format!("{} must be non-negative", name))),
        Some(v) if v > &MAX_RATE => Err(invalid(format!("{} must not exceed {}", name, MAX_RATE))),
        _ => Ok(()),
    }
}

fn validate_slab(slab_type: SlabType, slab: &Slab) -> Result<()> {
    let field = |name: &str| format!("slabs.{}.{}", slab_type, name);

    validate_rate(&field("price"), Some(&slab.price))?;
    validate_rate(&field("duration_min"), Some(&slab.duration_min))?;
    validate_rate(&field("included_km"), Some(&slab.included_km))?;
    validate_rate(&field("extra_km_price"), Some(&slab.extra_km_price))?;
    validate_rate(&field("minimum_value"), Some(&slab.minimum_value))?;

    if slab.duration_max < slab.duration_min {
        return Err(invalid(format!(
            "{} must not be below {}",
            field("duration_max"),
            field("duration_min")
        )));
    }
    Ok(())
}

/// Checks a configuration before it is stored on a bike. The engine itself
/// trusts stored configurations.
pub fn validate_pricing_configuration(config: &PricingConfiguration) -> Result<()> {
    if let Some(hours) = config.min_booking_hours
        && hours > Decimal::from(MAX_RENTAL_HOURS)
    {
        return Err(invalid(format!(
            "min_booking_hours must not exceed {}",
            MAX_RENTAL_HOURS
        )));
    }

    let rates = [
        ("legacy_hourly_rate", config.legacy_hourly_rate.as_ref()),
        ("package_12_hour", config.package_12_hour.as_ref()),
        ("per_week_rate", config.per_week_rate.as_ref()),
        ("weekday_hourly_rate", config.weekday_hourly_rate.as_ref()),
        ("weekend_hourly_rate", config.weekend_hourly_rate.as_ref()),
        ("min_booking_hours", config.min_booking_hours.as_ref()),
        ("km_limit_per_hour", config.km_limit_per_hour.as_ref()),
        ("excess_distance_rate", config.excess_distance_rate.as_ref()),
    ];
    for (name, value) in rates {
        validate_rate(name, value)?;
    }

    if let Some(km_limit) = config.km_limit
        && km_limit < 0
    {
        return Err(invalid("km_limit must be non-negative".to_string()));
    }

    if let Some(multiplier) = config.weekend_surge_multiplier
        && (multiplier < Decimal::ONE || multiplier > MAX_SURGE_MULTIPLIER)
    {
        return Err(invalid(format!(
            "weekend_surge_multiplier must be between 1 and {}",
            MAX_SURGE_MULTIPLIER
        )));
    }

    if let Some(tax) = config.tax_percentage
        && (tax < Decimal::ZERO || tax > Decimal::ONE_HUNDRED)
    {
        return Err(invalid(
            "tax_percentage must be between 0 and 100".to_string(),
        ));
    }

    for (slab_type, slab) in config.slabs.iter() {
        validate_slab(slab_type, slab)?;
    }

    Ok(())
}

pub fn sanitize_notes(notes: Option<String>) -> Option<String> {
    notes.and_then(|n| {
        let trimmed = n.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
