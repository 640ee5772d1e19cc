use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// RFC 3339 time the probe was answered.
    pub timestamp: String,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tags = ["health"],
    operation_id = "health"
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(health_check),
    components(schemas(HealthStatus)),
    tags((name = "health", description = "Endpoints for health checks"))
)]
pub struct HealthApiDoc;
