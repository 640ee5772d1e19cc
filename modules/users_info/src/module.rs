use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use modkit::api::OpenApiRegistry;
use modkit::{Module, ModuleCtx, RestfulModule};
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::events::UserDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::service::Service;
use crate::gateways::local::UsersInfoLocalClient;
use crate::infra::events::{NoopEventPublisher, TracingEventPublisher};
use crate::infra::storage::InMemoryUsersRepository;

/// Users module: owns the in-memory store and exposes it over REST and
/// through [`UsersInfoApi`].
#[derive(Default)]
pub struct UsersInfo {
    // Set once in `init`, read by REST registration and clients.
    service: ArcSwapOption<Service>,
}

impl UsersInfo {
    /// In-process client, available after `init`.
    pub fn client(&self) -> Option<Arc<dyn UsersInfoApi>> {
        self.service
            .load_full()
            .map(|svc| Arc::new(UsersInfoLocalClient::new(svc)) as Arc<dyn UsersInfoApi>)
    }
}

#[async_trait]
impl Module for UsersInfo {
    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing users_info module");

        let cfg: UsersInfoConfig = ctx.module_config()?;
        debug!(publish_events = cfg.publish_events, "Loaded users_info config");

        let events: Arc<dyn EventPublisher<UserDomainEvent>> = if cfg.publish_events {
            Arc::new(TracingEventPublisher)
        } else {
            Arc::new(NoopEventPublisher)
        };

        let service = Service::new(Arc::new(InMemoryUsersRepository::new()), events);
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl RestfulModule for UsersInfo {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering users_info REST routes");

        let service = self
            .service
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;

        let router = routes::register_routes(router, openapi, service)?;
        info!("Users REST routes registered successfully");
        Ok(router)
    }
}
