/// Health check endpoint
///
/// Reports whether the server can reach both database endpoints.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "statusCode": 200,
///   "success": true,
///   "messages": [],
///   "data": {
///     "status": "healthy",
///     "version": "0.1.0",
///     "read_database": "connected",
///     "write_database": "connected"
///   }
/// }
/// ```

use crate::{app::AppState, envelope::Envelope, error::ApiResult};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tasktrack_shared::db::pool::health_check as ping;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` when both endpoints answer, `degraded` otherwise
    pub status: String,

    /// Application version
    pub version: String,

    pub read_database: String,

    pub write_database: String,
}

async fn database_status(pool: &PgPool) -> &'static str {
    match ping(pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            "disconnected"
        }
    }
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Envelope> {
    let read_database = database_status(state.db.read()).await;
    let write_database = database_status(state.db.write()).await;

    let status = if read_database == "connected" && write_database == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Envelope::ok().with_data(&HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        read_database: read_database.to_string(),
        write_database: write_database.to_string(),
    }))
}
