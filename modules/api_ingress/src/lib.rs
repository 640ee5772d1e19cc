use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{http::StatusCode, middleware::from_fn, routing::get, Router};
use modkit::api::OpenApiRegistry;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa::OpenApi as _;

mod config;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;

/// REST host: owns the HTTP server, the base router (`/health`) and the
/// merged OpenAPI document served at `/openapi.json`.
pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    // Fragments merged as REST modules register
    openapi: Mutex<OpenApi>,
    // Finalized router from the REST phase, taken by `start`
    final_router: Mutex<Option<Router>>,
    server: Mutex<Option<JoinHandle<Result<()>>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        let base = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title("User API")
                    .version(env!("CARGO_PKG_VERSION"))
                    .description(Some("CRUD operations over users"))
                    .build(),
            )
            .build();

        Self {
            config: ArcSwap::from_pointee(config),
            openapi: Mutex::new(base),
            final_router: Mutex::new(None),
            server: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Address the server actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    /// Snapshot of the merged OpenAPI document.
    pub fn build_openapi(&self) -> OpenApi {
        self.openapi.lock().clone()
    }

    /// Wrap `router` with the global middleware stack.
    ///
    /// Outermost to innermost: SetRequestId -> PropagateRequestId ->
    /// push_req_id_to_extensions -> Trace -> Timeout -> CORS -> BodyLimit.
    /// `Router::layer` wraps what is already there, so layers go on innermost first.
    pub fn apply_layers(&self, mut router: Router) -> Router {
        let config = self.get_config();
        let x_request_id = request_id::header();

        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }

        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ));

        router = router.layer(request_id::create_trace_layer());

        router = router.layer(from_fn(request_id::push_req_id_to_extensions));

        // Copy x-request-id onto the response
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));

        // Generate x-request-id when missing
        router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
    }

    async fn serve(
        listener: tokio::net::TcpListener,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<()> {
        let shutdown = async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully (cancellation)");
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[async_trait]
impl modkit::Module for ApiIngress {
    async fn init(&self, ctx: &modkit::ModuleCtx) -> anyhow::Result<()> {
        let cfg = ctx.module_config::<ApiIngressConfig>()?;
        tracing::debug!(
            bind_addr = %cfg.bind_addr,
            cors_enabled = cfg.cors_enabled,
            request_timeout_secs = cfg.request_timeout_secs,
            "api_ingress configured"
        );
        self.config.store(Arc::new(cfg));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

// REST host role: prepare/finalize the router, but do not start the server here.
impl modkit::contracts::RestHostModule for ApiIngress {
    fn rest_prepare(
        &self,
        _ctx: &modkit::context::ModuleCtx,
        router: Router,
    ) -> anyhow::Result<Router> {
        self.register_openapi(web::HealthApiDoc::openapi());
        tracing::debug!("REST host prepared base router with health check");
        Ok(router.route("/health", get(web::health_check)))
    }

    fn rest_finalize(
        &self,
        _ctx: &modkit::context::ModuleCtx,
        router: Router,
    ) -> anyhow::Result<Router> {
        // Build once, serve as static JSON
        let doc = self.build_openapi();
        tracing::info!(paths = doc.paths.paths.len(), "emitting OpenAPI document");
        let openapi_value = Arc::new(serde_json::to_value(&doc)?);

        let router = router.route(
            "/openapi.json",
            get({
                use axum::{http::header, response::IntoResponse};
                let v = openapi_value.clone();
                move || async move {
                    let json = axum::Json((*v).clone());
                    ([(header::CACHE_CONTROL, "no-store")], json).into_response()
                }
            }),
        );

        let router = self.apply_layers(router);
        *self.final_router.lock() = Some(router.clone());

        tracing::debug!("REST host finalized router with OpenAPI endpoint");
        Ok(router)
    }

    fn as_registry(&self) -> &dyn OpenApiRegistry {
        self
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_openapi(&self, doc: OpenApi) {
        let path_count = doc.paths.paths.len();
        self.openapi.lock().merge(doc);
        tracing::debug!(paths = path_count, "merged OpenAPI fragment");
    }
}

#[async_trait]
impl modkit::contracts::StatefulModule for ApiIngress {
    /// Bind first so a bad address fails the start phase, then serve in the background.
    async fn start(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", cfg.bind_addr, e))?;

        // Take the finalized router so the MutexGuard is dropped before awaits
        let stored = { self.final_router.lock().take() };
        let router = match stored {
            Some(r) => r,
            None => {
                tracing::debug!("No router from REST phase, serving health only");
                self.apply_layers(Router::new().route("/health", get(web::health_check)))
            }
        };

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        *self.local_addr.lock() = Some(bound);
        tracing::info!("HTTP server bound on {}", bound);

        let handle = tokio::spawn(Self::serve(listener, router, cancel));
        *self.server.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self, cancel: CancellationToken) -> anyhow::Result<()> {
        cancel.cancel();
        let handle = { self.server.lock().take() };
        if let Some(handle) = handle {
            match tokio::time::timeout(Duration::from_secs(30), handle).await {
                Ok(joined) => joined??,
                Err(_) => tracing::warn!("HTTP server did not stop within 30s"),
            }
        }
        Ok(())
    }
}
