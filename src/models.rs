use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use surrealdb::sql::Thing;

fn serialize_thing_as_string<S>(thing: &Thing, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&thing.id.to_string())
}

// Stored pricing fields may come back from the database as ints or decimals
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexibleDecimal {
    Int(i64),
    Decimal(Decimal),
}

impl From<FlexibleDecimal> for Decimal {
    fn from(value: FlexibleDecimal) -> Self {
        match value {
            FlexibleDecimal::Int(i) => Decimal::from(i),
            FlexibleDecimal::Decimal(d) => d,
        }
    }
}

fn deserialize_flexible_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(FlexibleDecimal::deserialize(deserializer)?.into())
}

fn deserialize_optional_flexible_decimal<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<FlexibleDecimal> = Option::deserialize(deserializer)?;
    Ok(opt.map(Decimal::from))
}

// ---------------------------------------------------------------------------
// Pricing engine inputs and outputs
// ---------------------------------------------------------------------------

/// Tax applied when a bike does not carry its own percentage.
pub const DEFAULT_TAX_PERCENTAGE: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// Excess-distance rate for models that have no configured rate of their own.
pub const FALLBACK_EXTRA_DISTANCE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Tier of the slab model a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlabType {
    Hourly,
    Daily,
    Weekly,
}

impl SlabType {
    pub const ALL: [SlabType; 3] = [SlabType::Hourly, SlabType::Daily, SlabType::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlabType::Hourly => "hourly",
            SlabType::Daily => "daily",
            SlabType::Weekly => "weekly",
        }
    }
}

impl fmt::Display for SlabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single pricing model a calculation was settled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    Legacy,
    Hourly,
    Daily,
    Weekly,
    #[serde(rename = "package_12_hour")]
    Package12Hour,
    Tariff,
}

impl From<SlabType> for PricingType {
    fn from(slab_type: SlabType) -> Self {
        match slab_type {
            SlabType::Hourly => PricingType::Hourly,
            SlabType::Daily => PricingType::Daily,
            SlabType::Weekly => PricingType::Weekly,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinimumBookingRule {
    #[default]
    None,
    MinDuration,
    MinPrice,
}

/// One tier of the slab model. Durations are in hours.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slab {
    #[serde(deserialize_with = "deserialize_flexible_decimal")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "deserialize_flexible_decimal")]
    pub duration_min: Decimal,
    #[serde(deserialize_with = "deserialize_flexible_decimal")]
    pub duration_max: Decimal,
    #[serde(default, deserialize_with = "deserialize_flexible_decimal")]
    pub included_km: Decimal,
    #[serde(default, deserialize_with = "deserialize_flexible_decimal")]
    pub extra_km_price: Decimal,
    #[serde(default)]
    pub minimum_booking_rule: MinimumBookingRule,
    #[serde(default, deserialize_with = "deserialize_flexible_decimal")]
    pub minimum_value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Slabs {
    #[serde(default)]
    pub hourly: Option<Slab>,
    #[serde(default)]
    pub daily: Option<Slab>,
    #[serde(default)]
    pub weekly: Option<Slab>,
}

impl Slabs {
    pub fn get(&self, slab_type: SlabType) -> Option<&Slab> {
        match slab_type {
            SlabType::Hourly => self.hourly.as_ref(),
            SlabType::Daily => self.daily.as_ref(),
            SlabType::Weekly => self.weekly.as_ref(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlabType, &Slab)> {
        SlabType::ALL
            .into_iter()
            .filter_map(move |slab_type| self.get(slab_type).map(|slab| (slab_type, slab)))
    }
}

/// Snapshot of a bike's pricing fields. Every model that ever existed lives
/// side by side here; the resolver picks one per calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfiguration {
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub legacy_hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub km_limit: Option<i32>,
    #[serde(default)]
    pub slabs: Slabs,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub package_12_hour: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub per_week_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub weekday_hourly_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub weekend_hourly_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub min_booking_hours: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub km_limit_per_hour: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub excess_distance_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub weekend_surge_multiplier: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_flexible_decimal")]
    pub tax_percentage: Option<Decimal>,
}

impl PricingConfiguration {
    pub fn effective_surge_multiplier(&self) -> Decimal {
        self.weekend_surge_multiplier.unwrap_or(Decimal::ONE)
    }

    pub fn effective_tax_percentage(&self) -> Decimal {
        self.tax_percentage.unwrap_or(DEFAULT_TAX_PERCENTAGE)
    }
}

/// Full result of one pricing calculation. Nothing is rounded, and amounts
/// are written as decimal strings so storage and JSON keep every digit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_after_surge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub surge_multiplier: Decimal,
    pub has_weekend: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub excess_distance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub excess_distance_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub resolved_pricing_type: PricingType,
    #[serde(with = "rust_decimal::serde::str")]
    pub included_distance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub extra_distance_rate: Decimal,
}

// ---------------------------------------------------------------------------
// Bike inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Bike {
    #[serde(serialize_with = "serialize_thing_as_string")]
    pub id: Thing,
    pub name: String,
    pub location: Option<String>,
    pub pricing: PricingConfiguration,
}

#[derive(Debug, Serialize)]
pub struct BikeRecord {
    pub name: String,
    pub location: Option<String>,
    pub pricing: PricingConfiguration,
}

#[derive(Debug, Deserialize)]
pub struct CreateBikeRequest {
    pub name: String,
    pub location: Option<String>,
    pub pricing: PricingConfiguration,
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(serialize_with = "serialize_thing_as_string")]
    pub id: Thing,
    pub bike_id: String,
    pub pickup: DateTime<FixedOffset>,
    pub dropoff: DateTime<FixedOffset>,
    pub pricing_type: Option<SlabType>,
    pub status: BookingStatus,
    pub estimate: PriceBreakdown,
    pub settlement: Option<PriceBreakdown>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::str_option::serialize",
        deserialize_with = "deserialize_optional_flexible_decimal"
    )]
    pub actual_distance: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingRecord {
    pub bike_id: String,
    pub pickup: DateTime<FixedOffset>,
    pub dropoff: DateTime<FixedOffset>,
    pub pricing_type: Option<SlabType>,
    pub status: BookingStatus,
    pub estimate: PriceBreakdown,
    pub settlement: Option<PriceBreakdown>,
    #[serde(serialize_with = "rust_decimal::serde::str_option::serialize")]
    pub actual_distance: Option<Decimal>,
    pub created_at: surrealdb::sql::Datetime,
    pub completed_at: Option<surrealdb::sql::Datetime>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Default)]
pub struct BookingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<PriceBreakdown>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::str_option::serialize"
    )]
    pub actual_distance: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<surrealdb::sql::Datetime>,
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub pickup: DateTime<FixedOffset>,
    pub dropoff: DateTime<FixedOffset>,
    pub pricing_type: Option<SlabType>,
    pub actual_distance: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub bike_id: String,
    pub pickup: DateTime<FixedOffset>,
    pub dropoff: DateTime<FixedOffset>,
    pub pricing_type: Option<SlabType>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteBookingRequest {
    pub actual_distance: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingTypesResponse {
    pub pricing_types: Vec<SlabType>,
}
