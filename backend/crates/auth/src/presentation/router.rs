//! Auth Router

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::domain::repository::UnitOfWork;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_admin, require_auth};

/// Create the Auth router for any unit of work implementation
pub fn auth_router<U>(state: AuthAppState<U>) -> Router
where
    U: UnitOfWork,
{
    let protected = Router::new()
        .route("/auth/profile", get(handlers::profile::<U>))
        .route_layer(from_fn_with_state(state.signer.clone(), require_auth));

    // Layers run outermost-last: authenticate, then check the role
    let admin: Router<AuthAppState<U>> = Router::new()
        .route("/admin/test", get(handlers::admin_test))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.signer.clone(), require_auth));

    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/auth/register", post(handlers::register::<U>))
        .route("/auth/login", post(handlers::login::<U>))
        .merge(protected)
        .merge(admin)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use platform::password::HashCost;
    use platform::token::TokenConfig;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::application::AuthConfig;
    use crate::domain::value_object::UserId;
    use crate::infra::memory::MemoryUnitOfWork;

    fn app() -> (Router, AuthAppState<MemoryUnitOfWork>) {
        let config = AuthConfig::new(TokenConfig {
            secret: SecretString::from("router-test-secret".to_string()),
            expiry_hours: 1,
        })
        .with_hash_cost(HashCost::light());
        let state = AuthAppState::new(Arc::new(MemoryUnitOfWork::new()), &config).unwrap();
        (auth_router(state.clone()), state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn bob() -> Value {
        json!({ "username": "bob", "email": "bob@example.com", "password": "hunter22" })
    }

    #[tokio::test]
    async fn test_ping() {
        let (app, _) = app();
        let (status, body) = send(&app, get_with_token("/ping", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "pong");
    }

    #[tokio::test]
    async fn test_register_login_profile() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("/auth/register", bob())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["username"], "bob");
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"].get("passwordHash").is_none());

        let (status, body) = send(
            &app,
            post_json("/auth/login", json!({ "username": "bob", "password": "hunter22" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, get_with_token("/auth/profile", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "bob@example.com");
        assert!(body.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn test_duplicate_register_is_conflict() {
        let (app, _) = app();
        send(&app, post_json("/auth/register", bob())).await;

        let (status, body) = send(&app, post_json("/auth/register", bob())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "username already exists");
    }

    #[tokio::test]
    async fn test_short_password_is_bad_request() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            post_json(
                "/auth/register",
                json!({ "username": "bob", "email": "bob@example.com", "password": "12345" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (app, _) = app();
        send(&app, post_json("/auth/register", bob())).await;

        let (status, body) = send(
            &app,
            post_json("/auth/login", json!({ "username": "bob", "password": "wrong-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "invalid credentials");
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let (app, _) = app();

        let (status, _) = send(&app, get_with_token("/auth/profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, get_with_token("/auth/profile", Some("not-a-jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_checks_role() {
        let (app, state) = app();

        let (_, body) = send(&app, post_json("/auth/register", bob())).await;
        let user_token = body["token"].as_str().unwrap().to_string();
        let (status, _) = send(&app, get_with_token("/admin/test", Some(&user_token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, get_with_token("/admin/test", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let admin_token = state
            .signer
            .issue(&UserId::new().to_string(), "root", "admin")
            .unwrap();
        let (status, body) = send(&app, get_with_token("/admin/test", Some(&admin_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "This is an admin-only endpoint");
        assert_eq!(body["user"], "root");
    }
}
