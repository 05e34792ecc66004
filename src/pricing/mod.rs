//! Rental pricing engine.
//!
//! Both the booking estimate and the post-ride settlement call
//! [`calculate_price`], so the two always agree for the same inputs. The
//! engine does no I/O and holds no state.

pub mod calendar;
pub mod evaluator;
pub mod resolver;
pub mod surcharge;
pub mod tax;

use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::error::PricingError;
use crate::models::{PriceBreakdown, PricingConfiguration, SlabType};

pub use resolver::available_pricing_types;

/// Prices a rental window against a bike's pricing configuration.
///
/// `actual_distance` is unknown at estimate time and supplied at settlement.
pub fn calculate_price<Tz: TimeZone>(
    config: &PricingConfiguration,
    pickup: &DateTime<Tz>,
    dropoff: &DateTime<Tz>,
    requested: Option<SlabType>,
    actual_distance: Option<Decimal>,
) -> Result<PriceBreakdown, PricingError> {
    let duration_hours = calendar::duration_hours(pickup, dropoff);
    let model = resolver::resolve(config, duration_hours, requested)?;
    let charge = evaluator::evaluate(&model, pickup, duration_hours)?;

    let has_weekend = calendar::has_weekend_period(pickup, dropoff);
    let surge = surcharge::weekend_surge(
        charge.base_price,
        config.effective_surge_multiplier(),
        has_weekend && model.surges_on_weekends(),
    )?;
    let excess = surcharge::excess_distance(
        actual_distance,
        charge.included_distance,
        charge.extra_distance_rate,
    )?;

    let subtotal = surge
        .price_after_surge
        .checked_add(excess.charge)
        .ok_or(PricingError::AmountOverflow("subtotal"))?;
    let tax_percentage = config.effective_tax_percentage();
    let tax_amount = tax::tax_amount(subtotal, tax_percentage)?;
    let total = subtotal
        .checked_add(tax_amount)
        .ok_or(PricingError::AmountOverflow("total"))?;

    Ok(PriceBreakdown {
        duration_hours,
        base_price: charge.base_price,
        price_after_surge: surge.price_after_surge,
        surge_multiplier: surge.multiplier,
        has_weekend,
        excess_distance: excess.distance,
        excess_distance_charge: excess.charge,
        subtotal,
        tax_percentage,
        tax_amount,
        total,
        resolved_pricing_type: model.pricing_type(),
        included_distance: charge.included_distance,
        extra_distance_rate: charge.extra_distance_rate,
    })
}

/// Same as [`available_pricing_types`] but as an ordered list for JSON.
pub fn available_pricing_type_list(config: &PricingConfiguration) -> Vec<SlabType> {
    let types: BTreeSet<SlabType> = available_pricing_types(config);
    types.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MinimumBookingRule, PricingType, Slab, Slabs};
    use chrono::{Duration, FixedOffset, Utc};
    use rust_decimal_macros::dec;

    fn legacy_config() -> PricingConfiguration {
        PricingConfiguration {
            legacy_hourly_rate: Some(dec!(10)),
            km_limit: Some(20),
            ..Default::default()
        }
    }

    fn hourly_slab_config(rule: MinimumBookingRule, minimum_value: Decimal) -> PricingConfiguration {
        PricingConfiguration {
            slabs: Slabs {
                hourly: Some(Slab {
                    price: dec!(100),
                    duration_min: dec!(1),
                    duration_max: dec!(6),
                    included_km: dec!(20),
                    extra_km_price: dec!(2),
                    minimum_booking_rule: rule,
                    minimum_value,
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn tariff_config() -> PricingConfiguration {
        PricingConfiguration {
            weekday_hourly_rate: Some(dec!(10)),
            weekend_hourly_rate: Some(dec!(20)),
            min_booking_hours: Some(dec!(0)),
            km_limit_per_hour: Some(dec!(10)),
            excess_distance_rate: Some(dec!(4)),
            weekend_surge_multiplier: Some(dec!(2)),
            ..Default::default()
        }
    }

    fn assert_consistent(breakdown: &PriceBreakdown) {
        assert_eq!(
            breakdown.subtotal,
            breakdown.price_after_surge + breakdown.excess_distance_charge
        );
        assert_eq!(breakdown.total, breakdown.subtotal + breakdown.tax_amount);
        assert_eq!(
            breakdown.tax_amount,
            breakdown.subtotal * breakdown.tax_percentage / dec!(100)
        );
        assert!(breakdown.total >= Decimal::ZERO);
    }

    #[test]
    fn test_legacy_with_excess_distance() {
        // Tuesday, five hours
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();

        let breakdown =
            calculate_price(&legacy_config(), &pickup, &dropoff, None, Some(dec!(25))).unwrap();

        assert_eq!(breakdown.resolved_pricing_type, PricingType::Legacy);
        assert_eq!(breakdown.duration_hours, dec!(5));
        assert_eq!(breakdown.base_price, dec!(50));
        assert_eq!(breakdown.price_after_surge, dec!(50));
        assert_eq!(breakdown.excess_distance, dec!(5));
        assert_eq!(breakdown.excess_distance_charge, dec!(25));
        assert_eq!(breakdown.subtotal, dec!(75));
        assert_eq!(breakdown.tax_percentage, dec!(18));
        assert_eq!(breakdown.tax_amount, dec!(13.5));
        assert_eq!(breakdown.total, dec!(88.5));
        assert!(!breakdown.has_weekend);
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_legacy_estimate_without_distance() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap();

        let breakdown = calculate_price(&legacy_config(), &pickup, &dropoff, None, None).unwrap();
        assert_eq!(breakdown.excess_distance, Decimal::ZERO);
        assert_eq!(breakdown.excess_distance_charge, Decimal::ZERO);
        assert_eq!(breakdown.total, dec!(59));
    }

    #[test]
    fn test_legacy_weekend_surge() {
        let mut config = legacy_config();
        config.weekend_surge_multiplier = Some(dec!(1.2));
        let pickup = Utc.with_ymd_and_hms(2024, 1, 6, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 6, 15, 0, 0).unwrap();

        let breakdown = calculate_price(&config, &pickup, &dropoff, None, None).unwrap();
        assert_eq!(breakdown.price_after_surge, dec!(60));
        assert_eq!(breakdown.surge_multiplier, dec!(1.2));
        assert!(breakdown.has_weekend);
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_slab_min_price() {
        let config = hourly_slab_config(MinimumBookingRule::MinPrice, dec!(150));
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 13, 0, 0).unwrap();

        let breakdown =
            calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None).unwrap();
        assert_eq!(breakdown.resolved_pricing_type, PricingType::Hourly);
        assert_eq!(breakdown.base_price, dec!(150));
        assert_eq!(breakdown.included_distance, dec!(20));
        assert_eq!(breakdown.extra_distance_rate, dec!(2));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_slab_min_duration() {
        let config = hourly_slab_config(MinimumBookingRule::MinDuration, dec!(4));
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let breakdown =
            calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None).unwrap();
        assert_eq!(breakdown.base_price, dec!(200));
    }

    #[test]
    fn test_slab_excess_distance_uses_slab_rate() {
        let config = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO);
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let breakdown = calculate_price(
            &config,
            &pickup,
            &dropoff,
            Some(SlabType::Hourly),
            Some(dec!(30)),
        )
        .unwrap();
        assert_eq!(breakdown.excess_distance, dec!(10));
        assert_eq!(breakdown.excess_distance_charge, dec!(20));
        assert_eq!(breakdown.subtotal, dec!(120));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_slab_surge_friday_night_into_saturday() {
        let mut config = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO);
        config.weekend_surge_multiplier = Some(dec!(1.5));
        let pickup = Utc.with_ymd_and_hms(2024, 1, 5, 23, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 6, 1, 0, 0).unwrap();

        let breakdown =
            calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None).unwrap();
        assert!(breakdown.has_weekend);
        assert_eq!(breakdown.base_price, dec!(100));
        assert_eq!(breakdown.surge_multiplier, dec!(1.5));
        assert_eq!(breakdown.price_after_surge, dec!(150));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_slab_duration_bounds() {
        let config = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO);
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        let at_max = pickup + Duration::hours(6);
        assert!(calculate_price(&config, &pickup, &at_max, Some(SlabType::Hourly), None).is_ok());

        // 0.01 hours is 36 seconds
        let over_max = at_max + Duration::seconds(36);
        let err =
            calculate_price(&config, &pickup, &over_max, Some(SlabType::Hourly), None).unwrap_err();
        assert_eq!(
            err,
            PricingError::DurationOutOfRange {
                requested: SlabType::Hourly,
                duration_hours: dec!(6.01),
                min: dec!(1),
                max: dec!(6),
            }
        );
    }

    #[test]
    fn test_slab_out_of_range_does_not_fall_back() {
        let mut config = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO);
        config.legacy_hourly_rate = Some(dec!(10));
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 20, 0, 0).unwrap();

        let result = calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None);
        assert!(matches!(
            result,
            Err(PricingError::DurationOutOfRange { .. })
        ));

        // Without the slab request the legacy rate applies
        let breakdown = calculate_price(&config, &pickup, &dropoff, None, None).unwrap();
        assert_eq!(breakdown.resolved_pricing_type, PricingType::Legacy);
    }

    #[test]
    fn test_tariff_saturday_all_weekend_hours() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 6, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 6, 13, 0, 0).unwrap();

        let breakdown = calculate_price(&tariff_config(), &pickup, &dropoff, None, None).unwrap();
        assert_eq!(breakdown.resolved_pricing_type, PricingType::Tariff);
        assert_eq!(breakdown.base_price, dec!(60));
        // weekend pricing is in the hourly rate, never surged
        assert_eq!(breakdown.price_after_surge, dec!(60));
        assert_eq!(breakdown.surge_multiplier, Decimal::ONE);
        assert!(breakdown.has_weekend);
        assert_eq!(breakdown.included_distance, dec!(30));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_tariff_ignores_requested_slab() {
        let mut config = tariff_config();
        config.slabs = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO).slabs;
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let breakdown =
            calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None).unwrap();
        assert_eq!(breakdown.resolved_pricing_type, PricingType::Tariff);
        assert_eq!(breakdown.base_price, dec!(20));
    }

    #[test]
    fn test_tariff_excess_distance() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();

        let breakdown =
            calculate_price(&tariff_config(), &pickup, &dropoff, None, Some(dec!(26))).unwrap();
        assert_eq!(breakdown.included_distance, dec!(20));
        assert_eq!(breakdown.excess_distance, dec!(6));
        assert_eq!(breakdown.excess_distance_charge, dec!(24));
        assert_eq!(breakdown.subtotal, dec!(44));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_package_flat_fee_never_surges() {
        let config = PricingConfiguration {
            package_12_hour: Some(dec!(499)),
            km_limit: Some(60),
            weekend_surge_multiplier: Some(dec!(2)),
            tax_percentage: Some(dec!(5)),
            ..Default::default()
        };
        let pickup = Utc.with_ymd_and_hms(2024, 1, 6, 1, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();

        let breakdown = calculate_price(&config, &pickup, &dropoff, None, None).unwrap();
        assert_eq!(breakdown.resolved_pricing_type, PricingType::Package12Hour);
        assert_eq!(breakdown.duration_hours, dec!(23));
        assert_eq!(breakdown.price_after_surge, dec!(499));
        assert_eq!(breakdown.tax_amount, dec!(24.95));
        assert_eq!(breakdown.total, dec!(523.95));
        assert_consistent(&breakdown);
    }

    #[test]
    fn test_no_pricing_configured() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let result = calculate_price(
            &PricingConfiguration::default(),
            &pickup,
            &dropoff,
            None,
            None,
        );
        assert_eq!(result.unwrap_err(), PricingError::NoPricingConfigured);
    }

    #[test]
    fn test_zero_duration_min_duration_slab() {
        let mut config = hourly_slab_config(MinimumBookingRule::MinDuration, dec!(4));
        if let Some(slab) = config.slabs.hourly.as_mut() {
            slab.duration_min = Decimal::ZERO;
        }
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();

        let result = calculate_price(&config, &pickup, &pickup, Some(SlabType::Hourly), None);
        assert!(matches!(result, Err(PricingError::InvalidDuration { .. })));
    }

    #[test]
    fn test_deterministic() {
        let config = tariff_config();
        let pickup = Utc.with_ymd_and_hms(2024, 1, 5, 21, 17, 0).unwrap();
        let dropoff = Utc.with_ymd_and_hms(2024, 1, 6, 3, 41, 13).unwrap();

        let first = calculate_price(&config, &pickup, &dropoff, None, Some(dec!(77.3))).unwrap();
        let second = calculate_price(&config, &pickup, &dropoff, None, Some(dec!(77.3))).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_consistent(&first);
    }

    #[test]
    fn test_estimate_and_settlement_agree_without_distance() {
        let config = hourly_slab_config(MinimumBookingRule::MinDuration, dec!(3));
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let pickup = ist.with_ymd_and_hms(2024, 1, 6, 2, 0, 0).unwrap();
        let dropoff = ist.with_ymd_and_hms(2024, 1, 6, 4, 30, 0).unwrap();

        let estimate =
            calculate_price(&config, &pickup, &dropoff, Some(SlabType::Hourly), None).unwrap();
        let settlement = calculate_price(
            &config,
            &pickup,
            &dropoff,
            Some(SlabType::Hourly),
            Some(dec!(0)),
        )
        .unwrap();
        assert_eq!(estimate.total, settlement.total);
        // Saturday in the booking's own offset
        assert!(estimate.has_weekend);
    }

    #[test]
    fn test_available_pricing_type_list_order() {
        let mut config = hourly_slab_config(MinimumBookingRule::None, Decimal::ZERO);
        config.slabs.weekly = config.slabs.hourly.clone();
        config.slabs.daily = config.slabs.hourly.clone();
        assert_eq!(
            available_pricing_type_list(&config),
            vec![SlabType::Hourly, SlabType::Daily, SlabType::Weekly]
        );
    }

    #[test]
    fn test_huge_distance_is_an_error() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = pickup + Duration::hours(5);

        let result = calculate_price(&legacy_config(), &pickup, &dropoff, None, Some(Decimal::MAX));
        assert!(matches!(result, Err(PricingError::AmountOverflow(_))));
    }

    #[test]
    fn test_breakdown_serializes_full_precision() {
        let pickup = Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let dropoff = pickup + Duration::minutes(10);
        let breakdown = calculate_price(&legacy_config(), &pickup, &dropoff, None, None).unwrap();

        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["total"], breakdown.total.to_string());
        assert_eq!(json["subtotal"], breakdown.subtotal.to_string());

        let parsed: PriceBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, breakdown);
        assert_eq!(parsed.total, parsed.subtotal + parsed.tax_amount);
    }
}
