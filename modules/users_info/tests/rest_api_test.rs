//! HTTP behavior of the users routes behind the ingress middleware stack.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::build_app;

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn john() -> Value {
    json!({
        "first_name": "John",
        "last_name": "Doe",
        "email": "john@x.com",
        "phone": "+15551234567",
        "date_of_birth": "1990-05-17",
        "address": { "city": "Springfield", "country": "US" }
    })
}

async fn create(app: &Router, body: Value) -> Value {
    let resp = send(app, json_req("POST", "/api/users", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

fn assert_problem(resp: &Response, status: StatusCode) {
    assert_eq!(resp.status(), status);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/problem+json"
    );
}

#[tokio::test]
async fn create_returns_201_with_user_shape() {
    let (app, _) = build_app().await;

    let user = create(&app, john()).await;

    assert_eq!(user["full_name"], "John Doe");
    assert_eq!(user["email"], "john@x.com");
    assert_eq!(user["date_of_birth"], "1990-05-17");
    assert_eq!(user["address"], json!({ "city": "Springfield", "country": "US" }));
    assert!(user["id"].as_str().is_some());
    assert_eq!(user["created_at"], user["updated_at"]);
}

#[tokio::test]
async fn create_with_invalid_fields_returns_validation_problem() {
    let (app, _) = build_app().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(
            json!({ "first_name": "J", "email": "nope" }).to_string(),
        ))
        .unwrap();
    let resp = send(&app, req).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);

    let problem = body_json(resp).await;
    assert_eq!(problem["code"], "USERS_VALIDATION");
    assert_eq!(problem["trace_id"], "req-42");
    assert_eq!(problem["instance"], "/api/users");
    assert_eq!(
        problem["detail"],
        "First name must be at least 2 characters long; Last name is required; \
         Email must be a valid email address"
    );
    let pointers: Vec<&str> = problem["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["pointer"].as_str().unwrap())
        .collect();
    assert_eq!(pointers, vec!["/first_name", "/last_name", "/email"]);
}

#[tokio::test]
async fn malformed_or_untyped_bodies_are_bad_requests() {
    let (app, _) = build_app().await;

    let broken = Request::post("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"first_name\": "))
        .unwrap();
    let resp = send(&app, broken).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "USERS_VALIDATION");

    let untyped = Request::post("/api/users")
        .body(Body::from(john().to_string()))
        .unwrap();
    let resp = send(&app, untyped).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);

    let wrong_type = json_req("POST", "/api/users", json!({ "first_name": 7 }));
    let resp = send(&app, wrong_type).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_returns_conflict() {
    let (app, _) = build_app().await;
    create(&app, john()).await;

    let resp = send(&app, json_req("POST", "/api/users", john())).await;
    assert_problem(&resp, StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "USERS_EMAIL_CONFLICT");
}

#[tokio::test]
async fn list_and_lookups_find_created_users() {
    let (app, _) = build_app().await;
    let john = create(&app, john()).await;
    create(
        &app,
        json!({ "first_name": "Jane", "last_name": "Roe", "email": "jane@x.com" }),
    )
    .await;

    let list = body_json(send(&app, get("/api/users")).await).await;
    assert_eq!(list["total"], 2);
    assert_eq!(list["users"].as_array().unwrap().len(), 2);

    let id = john["id"].as_str().unwrap();
    let resp = send(&app, get(&format!("/api/users/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, john);

    let resp = send(&app, get("/api/users/by-email/john@x.com")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["id"], john["id"]);
}

#[tokio::test]
async fn unknown_users_are_not_found() {
    let (app, _) = build_app().await;

    let resp = send(
        &app,
        get("/api/users/6f1c2d1e-0000-4000-8000-000000000000"),
    )
    .await;
    assert_problem(&resp, StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "USERS_NOT_FOUND");

    let resp = send(&app, get("/api/users/not-a-uuid")).await;
    assert_problem(&resp, StatusCode::NOT_FOUND);

    let resp = send(&app, get("/api/users/by-email/ghost@x.com")).await;
    assert_problem(&resp, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_email_lookup_is_a_bad_request() {
    let (app, _) = build_app().await;

    let resp = send(&app, get("/api/users/by-email/%20%20")).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["detail"], "Email is required");
}

#[tokio::test]
async fn put_replaces_the_user() {
    let (app, _) = build_app().await;
    let john = create(&app, john()).await;
    let id = john["id"].as_str().unwrap();

    let resp = send(
        &app,
        json_req(
            "PUT",
            &format!("/api/users/{id}"),
            json!({ "first_name": "Johnny", "last_name": "Doe", "email": "johnny@x.com" }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated = body_json(resp).await;
    assert_eq!(updated["id"], john["id"]);
    assert_eq!(updated["created_at"], john["created_at"]);
    assert_eq!(updated["full_name"], "Johnny Doe");
    assert!(updated.get("address").is_none());
}

#[tokio::test]
async fn put_errors_map_to_statuses() {
    let (app, _) = build_app().await;
    let john = create(&app, john()).await;
    create(
        &app,
        json!({ "first_name": "Jane", "last_name": "Roe", "email": "jane@x.com" }),
    )
    .await;
    let uri = format!("/api/users/{}", john["id"].as_str().unwrap());

    let taken = json!({ "first_name": "John", "last_name": "Doe", "email": "jane@x.com" });
    let resp = send(&app, json_req("PUT", &uri, taken)).await;
    assert_problem(&resp, StatusCode::CONFLICT);

    let invalid = json!({ "first_name": "John", "last_name": "Doe", "email": "" });
    let resp = send(&app, json_req("PUT", &uri, invalid)).await;
    assert_problem(&resp, StatusCode::BAD_REQUEST);

    let resp = send(
        &app,
        json_req(
            "PUT",
            "/api/users/6f1c2d1e-0000-4000-8000-000000000000",
            json!({ "first_name": "John", "last_name": "Doe", "email": "x@x.com" }),
        ),
    )
    .await;
    assert_problem(&resp, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_204_then_404() {
    let (app, _) = build_app().await;
    let john = create(&app, john()).await;
    let uri = format!("/api/users/{}", john["id"].as_str().unwrap());

    let del = || Request::delete(uri.as_str()).body(Body::empty()).unwrap();

    let resp = send(&app, del()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, del()).await;
    assert_problem(&resp, StatusCode::NOT_FOUND);

    let resp = send(&app, get(&uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_includes_users_routes() {
    let (app, _) = build_app().await;

    let resp = send(&app, get("/openapi.json")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let doc = body_json(resp).await;
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/health"));
    assert!(paths.contains_key("/api/users"));
    assert!(paths.contains_key("/api/users/{id}"));
    assert!(paths.contains_key("/api/users/by-email/{email}"));
    assert!(doc["components"]["schemas"]["UserDto"].is_object());
}
