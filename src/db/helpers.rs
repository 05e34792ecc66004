use surrealdb::{Surreal, engine::local::Db};

use crate::{
    error::{AppError, Result},
    models::{Bike, Booking, BookingStatus},
};

pub fn creation_failed(what: &str) -> AppError {
    AppError::Database(Box::new(surrealdb::Error::Api(
        surrealdb::error::Api::Query(format!("Failed to create {}", what)),
    )))
}

pub async fn query_bikes(db: &Surreal<Db>, query: &str) -> Result<Vec<Bike>> {
    let mut result = db.query(query).await?;
    let bikes: Vec<Bike> = result.take(0)?;
    Ok(bikes)
}

pub async fn get_bike_by_id(db: &Surreal<Db>, id: &str) -> Result<Bike> {
    let bike: Option<Bike> = db.select(("bikes", id)).await?;
    bike.ok_or(AppError::BikeNotFound)
}

pub async fn query_bookings(db: &Surreal<Db>, query: &str) -> Result<Vec<Booking>> {
    let mut result = db.query(query).await?;
    let bookings: Vec<Booking> = result.take(0)?;
    Ok(bookings)
}

pub async fn query_bookings_for_bike(db: &Surreal<Db>, bike_id: &str) -> Result<Vec<Booking>> {
    let mut result = db
        .query("SELECT * FROM bookings WHERE bike_id = $bike_id ORDER BY created_at DESC")
        .bind(("bike_id", bike_id.to_string()))
        .await?;
    let bookings: Vec<Booking> = result.take(0)?;
    Ok(bookings)
}

pub async fn has_active_booking(db: &Surreal<Db>, bike_id: &str) -> Result<bool> {
    let bookings = query_bookings_for_bike(db, bike_id).await?;
    Ok(bookings
        .iter()
        .any(|booking| booking.status == BookingStatus::Confirmed))
}

pub async fn get_booking_by_id(db: &Surreal<Db>, id: &str) -> Result<Booking> {
    let booking: Option<Booking> = db.select(("bookings", id)).await?;
    booking.ok_or(AppError::BookingNotFound)
}
