use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::XRequestId;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::dto::{CreateUserReq, UserDto, UserListDto};
use crate::api::rest::error::{bad_body, map_domain_error, unknown_id};
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

fn trace_id(rid: &Option<Extension<XRequestId>>) -> Option<&str> {
    rid.as_ref().map(|Extension(XRequestId(id))| id.as_str())
}

fn fail(e: DomainError, uri: &Uri, rid: &Option<Extension<XRequestId>>) -> ProblemResponse {
    warn!(error = %e, path = %uri.path(), "users request failed");
    map_domain_error(&e, uri.path(), trace_id(rid))
}

fn parse_id(raw: &str, uri: &Uri, rid: &Option<Extension<XRequestId>>) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| unknown_id(raw, uri.path(), trace_id(rid)))
}

fn body<T>(
    payload: Result<Json<T>, JsonRejection>,
    uri: &Uri,
    rid: &Option<Extension<XRequestId>>,
) -> ApiResult<T> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected request body");
            Err(bad_body(
                format!("Invalid request body: {}", rejection.body_text()),
                uri.path(),
                trace_id(rid),
            ))
        }
    }
}

/// List every stored user
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = UserListDto),
        (status = 500, description = "Storage failure", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.list_users", skip_all)]
pub async fn list_users(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
) -> ApiResult<Json<UserListDto>> {
    let users = svc.list_users().await.map_err(|e| fail(e, &uri, &rid))?;
    let users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
    Ok(Json(UserListDto {
        total: users.len(),
        users,
    }))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.get_user", skip_all)]
pub async fn get_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<UserDto>> {
    let id = parse_id(&raw_id, &uri, &rid)?;
    let user = svc.get_user(id).await.map_err(|e| fail(e, &uri, &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// Get a user by exact email
#[utoipa::path(
    get,
    path = "/api/users/by-email/{email}",
    tag = "users",
    params(("email" = String, Path, description = "Exact, case-sensitive email")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Blank email", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.get_user_by_email", skip_all)]
pub async fn get_user_by_email(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
    Path(email): Path<String>,
) -> ApiResult<Json<UserDto>> {
    let user = svc
        .get_user_by_email(&email)
        .await
        .map_err(|e| fail(e, &uri, &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already in use", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.create_user", skip_all)]
pub async fn create_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let req = body(payload, &uri, &rid)?;
    let user = svc
        .create_user(req.into())
        .await
        .map_err(|e| fail(e, &uri, &rid))?;
    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Replace a user; every mutable field comes from the body
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    request_body = CreateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Validation failed", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Email already in use", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.update_user", skip_all)]
pub async fn update_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
    Path(raw_id): Path<String>,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> ApiResult<Json<UserDto>> {
    let id = parse_id(&raw_id, &uri, &rid)?;
    let req = body(payload, &uri, &rid)?;
    let user = svc
        .update_user(id, req.into())
        .await
        .map_err(|e| fail(e, &uri, &rid))?;
    Ok(Json(UserDto::from(user)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user", body = Problem, content_type = "application/problem+json")
    )
)]
#[tracing::instrument(name = "users_info.http.delete_user", skip_all)]
pub async fn delete_user(
    Extension(svc): Extension<Arc<Service>>,
    rid: Option<Extension<XRequestId>>,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, &uri, &rid)?;
    svc.delete_user(id).await.map_err(|e| fail(e, &uri, &rid))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
