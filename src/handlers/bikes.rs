use axum::{
    Json,
    extract::{Extension, Path},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    db::helpers::{creation_failed, get_bike_by_id, query_bikes},
    error::Result,
    middleware::SessionId,
    models::{Bike, BikeRecord, CreateBikeRequest, PriceBreakdown, PricingTypesResponse, QuoteRequest},
    pricing::{available_pricing_type_list, calculate_price},
    state::AppState,
    validation,
};

pub async fn get_all_bikes(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
) -> Result<Json<Vec<Bike>>> {
    info!("Fetching all bikes for session {}", session.0);
    let db = state.db_provider.get_db(Some(&session.0)).await?;

    let bikes = query_bikes(&db, "SELECT * FROM bikes ORDER BY name ASC").await?;

    info!("Retrieved {} bikes", bikes.len());
    Ok(Json(bikes))
}

pub async fn get_bike(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> Result<Json<Bike>> {
    info!("Fetching bike: id={}", id);
    let db = state.db_provider.get_db(Some(&session.0)).await?;

    Ok(Json(get_bike_by_id(&db, &id).await?))
}

pub async fn create_bike(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Json(payload): Json<CreateBikeRequest>,
) -> Result<Json<Bike>> {
    info!("Registering bike: {}", payload.name);
    validation::validate_pricing_configuration(&payload.pricing)?;

    let db = state.db_provider.get_db(Some(&session.0)).await?;

    let record = BikeRecord {
        name: payload.name.trim().to_string(),
        location: validation::sanitize_notes(payload.location),
        pricing: payload.pricing,
    };

    let bike: Option<Bike> = db.create("bikes").content(record).await?;
    let bike = bike.ok_or_else(|| creation_failed("bike"))?;

    info!("Bike registered: id={}", bike.id.id);
    Ok(Json(bike))
}

pub async fn get_pricing_types(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
) -> Result<Json<PricingTypesResponse>> {
    let db = state.db_provider.get_db(Some(&session.0)).await?;
    let bike = get_bike_by_id(&db, &id).await?;

    Ok(Json(PricingTypesResponse {
        pricing_types: available_pricing_type_list(&bike.pricing),
    }))
}

/// Pre-booking estimate for a bike and window.
pub async fn quote_bike(
    Extension(state): Extension<Arc<AppState>>,
    session: SessionId,
    Path(id): Path<String>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<PriceBreakdown>> {
    info!(
        "Quoting bike {} from {} to {}",
        id, payload.pickup, payload.dropoff
    );

    validation::validate_rental_window(&payload.pickup, &payload.dropoff)?;
    if let Some(distance) = &payload.actual_distance {
        validation::validate_distance(distance)?;
    }

    let db = state.db_provider.get_db(Some(&session.0)).await?;
    let bike = get_bike_by_id(&db, &id).await?;

    let breakdown = calculate_price(
        &bike.pricing,
        &payload.pickup,
        &payload.dropoff,
        payload.pricing_type,
        payload.actual_distance,
    )
    .inspect_err(|e| warn!("Quote for bike {} failed: {}", id, e))?;

    info!(
        "Quoted bike {}: {:?} total={}",
        id, breakdown.resolved_pricing_type, breakdown.total
    );
    Ok(Json(breakdown))
}
