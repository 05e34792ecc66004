use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::error;

use crate::models::{BookingStatus, SlabType};

/// Failures of the pricing engine. Each one is a pure function of the
/// inputs, so retrying with the same inputs always fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("No pricing configured for this bike")]
    NoPricingConfigured,

    #[error(
        "Duration of {duration_hours} hours is outside the {requested} slab range ({min} to {max} hours)"
    )]
    DurationOutOfRange {
        requested: SlabType,
        duration_hours: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("Invalid rental duration: {duration_hours} hours")]
    InvalidDuration { duration_hours: Decimal },

    #[error("Price calculation overflowed while computing {0}")]
    AmountOverflow(&'static str),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] Box<surrealdb::Error>),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("Bike not found")]
    BikeNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Bike already has an active booking")]
    BikeUnavailable,

    #[error("Invalid rental window: dropoff must be after pickup")]
    InvalidRentalWindow,

    #[error("Rental window is longer than {max_hours} hours")]
    RentalTooLong { max_hours: i64 },

    #[error("Invalid distance: {0} must be between 0 and 1000000 km")]
    InvalidDistance(Decimal),

    #[error("Invalid pricing configuration: {0}")]
    InvalidPricingConfiguration(String),

    #[error("Booking is {}, expected {}", current.as_str(), expected.as_str())]
    InvalidBookingStatus {
        current: BookingStatus,
        expected: BookingStatus,
    },
}

// Helper conversion to avoid .map_err(Box::new) everywhere
impl From<surrealdb::Error> for AppError {
    fn from(err: surrealdb::Error) -> Self {
        AppError::Database(Box::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Pricing(PricingError::NoPricingConfigured) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Pricing(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::BikeNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BookingNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BikeUnavailable => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidBookingStatus { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidRentalWindow => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::RentalTooLong { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidDistance(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidPricingConfiguration(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
