#![allow(dead_code)]

use bikerent::middleware::SessionId;
use bikerent::models::{Bike, BikeRecord, PricingConfiguration};
use bikerent::state::{AppState, DbProvider, SingleDbProvider};
use std::sync::Arc;
use surrealdb::{
    Surreal,
    engine::local::{Db, Mem},
};

/// Create a fresh in-memory test database with schema
pub async fn setup_test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(())
        .await
        .expect("Failed to create in-memory DB");
    db.use_ns("test")
        .use_db("test")
        .await
        .expect("Failed to use namespace/database");

    // Setup schema using the same function as production
    bikerent::db::setup_database(&db)
        .await
        .expect("Failed to set up schema");

    db
}

pub fn app_state(db: Surreal<Db>) -> Arc<AppState> {
    Arc::new(AppState {
        db_provider: Arc::new(DbProvider::Single(SingleDbProvider { db })),
    })
}

pub fn session() -> SessionId {
    SessionId("test-session".to_string())
}

pub async fn insert_bike(db: &Surreal<Db>, name: &str, pricing: PricingConfiguration) -> Bike {
    let record = BikeRecord {
        name: name.to_string(),
        location: None,
        pricing,
    };
    let bike: Option<Bike> = db.create("bikes").content(record).await.unwrap();
    bike.unwrap()
}
