#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use modkit::{ConfigProvider, ModuleCtxBuilder, RegistryBuilder};
use tokio_util::sync::CancellationToken;

use api_ingress::{ApiIngress, ApiIngressConfig};
use users_info::contract::model::{Address, NewUser};
use users_info::domain::service::Service;
use users_info::infra::events::NoopEventPublisher;
use users_info::infra::storage::InMemoryUsersRepository;
use users_info::UsersInfo;

/// Module sections keyed by module name.
#[derive(Default)]
pub struct MapConfigProvider(pub HashMap<String, serde_json::Value>);

impl ConfigProvider for MapConfigProvider {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get(module_name)
    }
}

pub fn service() -> Arc<Service> {
    Arc::new(Service::new(
        Arc::new(InMemoryUsersRepository::new()),
        Arc::new(NoopEventPublisher),
    ))
}

pub fn new_user(first: &str, last: &str, email: &str) -> NewUser {
    NewUser {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        ..NewUser::default()
    }
}

pub fn full_user(email: &str) -> NewUser {
    NewUser {
        phone: Some("+15551234567".to_string()),
        date_of_birth: Some("1990-05-17".to_string()),
        address: Some(Address {
            street: Some("1 Main St".to_string()),
            city: Some("Springfield".to_string()),
            state: Some("IL".to_string()),
            postal_code: Some("62701".to_string()),
            country: Some("US".to_string()),
        }),
        ..new_user("John", "Doe", email)
    }
}

/// Router with the ingress stack and the users routes, as the server
/// would assemble it before binding.
pub async fn build_app() -> (Router, Arc<UsersInfo>) {
    let ingress = Arc::new(ApiIngress::new(ApiIngressConfig::default()));
    let users = Arc::new(UsersInfo::default());

    let mut b = RegistryBuilder::default();
    b.register_core("api_ingress", ingress.clone());
    b.register_rest_host("api_ingress", ingress);
    b.register_core("users_info", users.clone());
    b.register_rest("users_info", users.clone());
    let registry = b.build().expect("registry");

    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_config_provider(Arc::new(MapConfigProvider::default()))
        .build();
    registry.run_init_phase(&ctx).await.expect("init phase");
    let router = registry
        .run_rest_phase(&ctx, Router::new())
        .expect("rest phase");
    (router, users)
}
