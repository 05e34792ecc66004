use crate::db::setup_database;
use crate::models::{
    Bike, BikeRecord, Booking, BookingRecord, BookingStatus, MinimumBookingRule,
    PricingConfiguration, Slab, SlabType, Slabs,
};
use crate::pricing::calculate_price;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::RngExt;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use surrealdb::{Surreal, engine::local::Db};
use tracing::{info, warn};

const SEED_DAYS: i64 = 30;
const RIDE_PROBABILITY: f64 = 0.4;

// Random past ride on one bike
struct RideData {
    start_hour: u32,
    hours: i64,
    distance_float: f64,
}

impl RideData {
    fn random(max_hours: i64) -> Option<Self> {
        let mut rng = rand::rng();

        if !rng.random_bool(RIDE_PROBABILITY) {
            return None;
        }

        Some(Self {
            start_hour: rng.random_range(6..20),
            hours: rng.random_range(1..=max_hours),
            distance_float: rng.random_range(5.0..90.0),
        })
    }

    fn window(
        &self,
        day: DateTime<Utc>,
    ) -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
        let pickup = day
            .date_naive()
            .and_hms_opt(self.start_hour, 0, 0)?
            .and_utc()
            .fixed_offset();
        Some((pickup, pickup + Duration::hours(self.hours)))
    }

    fn distance(&self) -> Decimal {
        Decimal::from_f64(self.distance_float)
            .unwrap_or(Decimal::ZERO)
            .round_dp(1)
    }
}

// One demo bike per pricing model
struct BikeTemplate {
    name: &'static str,
    location: &'static str,
    requested: Option<SlabType>,
    max_ride_hours: i64,
    pricing: fn() -> PricingConfiguration,
}

fn legacy_pricing() -> PricingConfiguration {
    PricingConfiguration {
        legacy_hourly_rate: Some(Decimal::from(60)),
        km_limit: Some(40),
        weekend_surge_multiplier: Some(Decimal::new(12, 1)),
        ..Default::default()
    }
}

fn slab_pricing() -> PricingConfiguration {
    PricingConfiguration {
        slabs: Slabs {
            hourly: Some(Slab {
                price: Decimal::from(250),
                duration_min: Decimal::ONE,
                duration_max: Decimal::from(6),
                included_km: Decimal::from(30),
                extra_km_price: Decimal::from(4),
                minimum_booking_rule: MinimumBookingRule::MinDuration,
                minimum_value: Decimal::from(2),
            }),
            daily: Some(Slab {
                price: Decimal::from(900),
                duration_min: Decimal::from(6),
                duration_max: Decimal::from(24),
                included_km: Decimal::from(120),
                extra_km_price: Decimal::from(3),
                minimum_booking_rule: MinimumBookingRule::MinPrice,
                minimum_value: Decimal::from(900),
            }),
            weekly: None,
        },
        weekend_surge_multiplier: Some(Decimal::new(15, 1)),
        ..Default::default()
    }
}

fn package_pricing() -> PricingConfiguration {
    PricingConfiguration {
        package_12_hour: Some(Decimal::from(699)),
        per_week_rate: Some(Decimal::from(3999)),
        km_limit: Some(100),
        excess_distance_rate: Some(Decimal::from(4)),
        ..Default::default()
    }
}

fn tariff_pricing() -> PricingConfiguration {
    PricingConfiguration {
        weekday_hourly_rate: Some(Decimal::from(45)),
        weekend_hourly_rate: Some(Decimal::from(65)),
        min_booking_hours: Some(Decimal::from(2)),
        km_limit_per_hour: Some(Decimal::from(10)),
        excess_distance_rate: Some(Decimal::new(35, 1)),
        tax_percentage: Some(Decimal::from(5)),
        ..Default::default()
    }
}

static TEMPLATES: [BikeTemplate; 4] = [
    BikeTemplate {
        name: "City Cruiser",
        location: "Central Station",
        requested: None,
        max_ride_hours: 8,
        pricing: legacy_pricing,
    },
    BikeTemplate {
        name: "Trail Hopper",
        location: "Lakeside Depot",
        requested: Some(SlabType::Hourly),
        max_ride_hours: 6,
        pricing: slab_pricing,
    },
    BikeTemplate {
        name: "Day Tripper Scooter",
        location: "Old Town",
        requested: None,
        max_ride_hours: 12,
        pricing: package_pricing,
    },
    BikeTemplate {
        name: "Metro E-Scooter",
        location: "Tech Park",
        requested: None,
        max_ride_hours: 5,
        pricing: tariff_pricing,
    },
];

fn completed_booking(
    bike: &Bike,
    template: &BikeTemplate,
    ride: &RideData,
    day: DateTime<Utc>,
) -> Option<BookingRecord> {
    let (pickup, dropoff) = ride.window(day)?;
    let distance = ride.distance();

    let priced = calculate_price(&bike.pricing, &pickup, &dropoff, template.requested, None)
        .and_then(|estimate| {
            calculate_price(
                &bike.pricing,
                &pickup,
                &dropoff,
                template.requested,
                Some(distance),
            )
            .map(|settlement| (estimate, settlement))
        });

    let (estimate, settlement) = match priced {
        Ok(prices) => prices,
        Err(e) => {
            warn!("Skipping demo ride on {}: {}", template.name, e);
            return None;
        }
    };

    Some(BookingRecord {
        bike_id: bike.id.id.to_string(),
        pickup,
        dropoff,
        pricing_type: template.requested,
        status: BookingStatus::Completed,
        estimate,
        settlement: Some(settlement),
        actual_distance: Some(distance),
        created_at: (pickup.to_utc() - Duration::days(1)).into(),
        completed_at: Some(dropoff.to_utc().into()),
        notes: None,
    })
}

pub async fn seed_demo_data(db: &Surreal<Db>) -> surrealdb::Result<()> {
    setup_database(db).await?;

    let mut bikes = Vec::with_capacity(TEMPLATES.len());
    for template in &TEMPLATES {
        let record = BikeRecord {
            name: template.name.to_string(),
            location: Some(template.location.to_string()),
            pricing: (template.pricing)(),
        };
        let bike: Option<Bike> = db.create("bikes").content(record).await?;
        if let Some(bike) = bike {
            bikes.push((bike, template));
        }
    }

    let rides = seed_rides(db, &bikes).await?;
    info!("Seeded {} bikes and {} rides", bikes.len(), rides);
    Ok(())
}

async fn seed_rides(
    db: &Surreal<Db>,
    bikes: &[(Bike, &BikeTemplate)],
) -> surrealdb::Result<usize> {
    let end_date = Utc::now() - Duration::days(1);
    let mut current_date = end_date - Duration::days(SEED_DAYS);
    let mut seeded = 0;

    while current_date <= end_date {
        for (bike, template) in bikes {
            let Some(ride) = RideData::random(template.max_ride_hours) else {
                continue;
            };
            if let Some(record) = completed_booking(bike, template, &ride, current_date) {
                let _: Option<Booking> = db.create("bookings").content(record).await?;
                seeded += 1;
            }
        }

        current_date += Duration::days(1);
    }

    Ok(seeded)
}
