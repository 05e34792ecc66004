use crate::seeding::seed_demo_data;

use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use surrealdb::{
    Surreal,
    engine::local::{Db, Mem},
};
use tracing::error;

/// Idle time after which a demo session's database is dropped.
pub const DEMO_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub enum DbProvider {
    Single(SingleDbProvider),
    Demo(DemoDbProvider),
}

impl DbProvider {
    pub async fn get_db(&self, session_id: Option<&str>) -> surrealdb::Result<Surreal<Db>> {
        match self {
            DbProvider::Single(p) => p.get_db(session_id).await,
            DbProvider::Demo(p) => p.get_db(session_id).await,
        }
    }

    pub async fn check_health(&self) -> serde_json::Value {
        match self {
            DbProvider::Single(p) => match p.db.version().await {
                Ok(version) => json!({
                    "status": "ok",
                    "mode": "persistent",
                    "db_version": version.to_string(),
                }),
                Err(e) => {
                    error!("Health check failed: {}", e);
                    json!({
                        "status": "error",
                        "mode": "persistent",
                        "error": e.to_string(),
                    })
                }
            },
            DbProvider::Demo(p) => json!({
                "status": "ok",
                "mode": "demo",
                "active_sessions": p.session_count(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct SingleDbProvider {
    pub db: Surreal<Db>,
}

impl SingleDbProvider {
    async fn get_db(&self, _session_id: Option<&str>) -> surrealdb::Result<Surreal<Db>> {
        Ok(self.db.clone())
    }
}

#[derive(Clone, Default)]
pub struct DemoDbProvider {
    // Map: SessionID -> (DB Instance, Last Access Time)
    sessions: Arc<DashMap<String, (Surreal<Db>, Instant)>>,
}

impl DemoDbProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn cleanup_old_sessions(&self) {
        let now = Instant::now();
        self.sessions
            .retain(|_, (_, last_access)| now.duration_since(*last_access) < DEMO_SESSION_TTL);
    }

    async fn get_db(&self, session_id: Option<&str>) -> surrealdb::Result<Surreal<Db>> {
        let id = session_id.unwrap_or("default");

        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.1 = Instant::now();
            return Ok(entry.0.clone());
        }

        // Create new in-memory DB
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns("bikerent").use_db("demo").await?;

        if let Err(e) = seed_demo_data(&db).await {
            error!("Failed to seed demo data for session {}: {:?}", id, e);
            return Err(e);
        }

        self.sessions
            .insert(id.to_string(), (db.clone(), Instant::now()));
        Ok(db)
    }
}

pub struct AppState {
    pub db_provider: Arc<DbProvider>,
}
