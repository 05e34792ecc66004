pub mod helpers;

use surrealdb::{Surreal, engine::local::Db};
use tracing::info;

pub async fn setup_database(db: &Surreal<Db>) -> surrealdb::Result<()> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS bikes SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS bookings SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_bookings_bike ON TABLE bookings FIELDS bike_id;
        DEFINE INDEX IF NOT EXISTS idx_bookings_created ON TABLE bookings FIELDS created_at;
        "#,
    )
    .await?
    .check()?;

    info!("Database schema ready");
    Ok(())
}
