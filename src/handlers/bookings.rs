use axum::{
    Json,
    extract::{Extension, Path},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    db::helpers::{
        creation_failed, get_bike_by_id, get_booking_by_id, has_active_booking, query_bookings,
    },
    error::{AppError, Result},
    middleware::SessionId,
    models::{
        Booking, BookingRecord, BookingStatus, BookingUpdate, CompleteBookingRequest,
        CreateBookingRequest,
    },
    pricing::calculate_price,
    state::AppState,
    validation,
};

fn ensure_confirmed(booking: &Booking) -> Result<()> {
    if booking.status != BookingStatus::Confirmed {
        return Err(AppError::InvalidBookingStatus {
            current: booking.status,
            expected: BookingStatus::Confirmed,
        });
    }
    Ok(())
}

pub async fn get_all_bookings(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
) -> Result<Json<Vec<Booking>>> {
    info!("Fetching all bookings for session {}", session.0);
    let db = state.db_provider.get_db(Some(&session.0)).await?;

    let bookings = query_bookings(&db, "SELECT * FROM bookings ORDER BY created_at DESC").await?;

    info!("Retrieved {} bookings", bookings.len());
    Ok(Json(bookings))
}

pub async fn get_booking(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    let db = state.db_provider.get_db(Some(&session.0)).await?;
    Ok(Json(get_booking_by_id(&db, &id).await?))
}

/// Books a bike and stores the estimate the rider agreed to.
pub async fn create_booking(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<Booking>> {
    info!("Creating booking for bike {}", payload.bike_id);
    validation::validate_rental_window(&payload.pickup, &payload.dropoff)?;

    let db = state.db_provider.get_db(Some(&session.0)).await?;
    let bike = get_bike_by_id(&db, &payload.bike_id).await?;

    // TODO: run this check and the insert in one transaction once bookings carry rider ids
    if has_active_booking(&db, &payload.bike_id).await? {
        warn!("Bike {} already has an active booking", payload.bike_id);
        return Err(AppError::BikeUnavailable);
    }

    let estimate = calculate_price(
        &bike.pricing,
        &payload.pickup,
        &payload.dropoff,
        payload.pricing_type,
        None,
    )?;

    let record = BookingRecord {
        bike_id: payload.bike_id,
        pickup: payload.pickup,
        dropoff: payload.dropoff,
        pricing_type: payload.pricing_type,
        status: BookingStatus::Confirmed,
        estimate,
        settlement: None,
        actual_distance: None,
        created_at: Utc::now().into(),
        completed_at: None,
        notes: validation::sanitize_notes(payload.notes),
    };

    let booking: Option<Booking> = db.create("bookings").content(record).await?;
    let booking = booking.ok_or_else(|| creation_failed("booking"))?;

    info!(
        "Booking created: id={}, estimate={}",
        booking.id.id, booking.estimate.total
    );
    Ok(Json(booking))
}

/// Settles a finished ride. The bike's pricing is read again so the
/// settlement uses the same engine and window as the estimate, plus the
/// distance actually ridden.
pub async fn complete_booking(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
    Json(payload): Json<CompleteBookingRequest>,
) -> Result<Json<Booking>> {
    info!("Completing booking: id={}", id);
    validation::validate_distance(&payload.actual_distance)?;

    let db = state.db_provider.get_db(Some(&session.0)).await?;
    let booking = get_booking_by_id(&db, &id).await?;
    ensure_confirmed(&booking)?;

    let bike = get_bike_by_id(&db, &booking.bike_id).await?;
    let settlement = calculate_price(
        &bike.pricing,
        &booking.pickup,
        &booking.dropoff,
        booking.pricing_type,
        Some(payload.actual_distance),
    )?;
    let settled_total = settlement.total;

    let update = BookingUpdate {
        status: Some(BookingStatus::Completed),
        settlement: Some(settlement),
        actual_distance: Some(payload.actual_distance),
        completed_at: Some(Utc::now().into()),
    };

    let updated: Option<Booking> = db
        .update(("bookings", id.as_str()))
        .merge(update)
        .await?;
    let updated = updated.ok_or(AppError::BookingNotFound)?;

    info!(
        "Booking completed: id={}, estimate={}, settled={}",
        id, booking.estimate.total, settled_total
    );
    Ok(Json(updated))
}

pub async fn cancel_booking(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> Result<Json<Booking>> {
    info!("Cancelling booking: id={}", id);
    let db = state.db_provider.get_db(Some(&session.0)).await?;

    let booking = get_booking_by_id(&db, &id).await?;
    ensure_confirmed(&booking)?;

    let update = BookingUpdate {
        status: Some(BookingStatus::Cancelled),
        ..Default::default()
    };
    let updated: Option<Booking> = db
        .update(("bookings", id.as_str()))
        .merge(update)
        .await?;

    info!("Booking cancelled: id={}", id);
    updated.map(Json).ok_or(AppError::BookingNotFound)
}
