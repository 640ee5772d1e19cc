//! HTTP-facing helpers shared by REST modules.

pub mod problem;

/// Collects OpenAPI fragments from REST modules; the REST host merges them
/// into the document it serves.
pub trait OpenApiRegistry {
    /// Register one module's OpenAPI document (paths + components).
    fn register_openapi(&self, doc: utoipa::openapi::OpenApi);
}

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id placed in request extensions by the REST host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XRequestId(pub String);
