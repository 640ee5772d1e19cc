use axum::{
    routing::get,
    Extension, Router,
};
use modkit::api::problem::{Problem, ValidationError};
use modkit::api::OpenApiRegistry;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_users,
        handlers::create_user,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::get_user_by_email,
    ),
    components(schemas(
        dto::UserDto,
        dto::AddressDto,
        dto::CreateUserReq,
        dto::UserListDto,
        Problem,
        ValidationError,
    )),
    tags((name = "users", description = "User management"))
)]
pub struct UsersApiDoc;

pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    openapi.register_openapi(UsersApiDoc::openapi());

    let users = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/by-email/{email}", get(handlers::get_user_by_email))
        .route(
            "/api/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(service));

    Ok(router.merge(users))
}
