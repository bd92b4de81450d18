//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use platform::password::PasswordHasher;
use platform::token::{SessionClaims, TokenError, TokenSigner};

use crate::application::config::AuthConfig;
use crate::application::{
    GetProfileUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::repository::UnitOfWork;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminResponse, AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UserResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<U>
where
    U: UnitOfWork,
{
    pub uow: Arc<U>,
    pub signer: Arc<TokenSigner>,
    pub hasher: Arc<PasswordHasher>,
}

// Manual impl: `U` itself need not be `Clone`
impl<U> Clone for AuthAppState<U>
where
    U: UnitOfWork,
{
    fn clone(&self) -> Self {
        Self {
            uow: Arc::clone(&self.uow),
            signer: Arc::clone(&self.signer),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<U> AuthAppState<U>
where
    U: UnitOfWork,
{
    /// Build the signer and hasher once; bad settings fail here, not per request
    pub fn new(uow: Arc<U>, config: &AuthConfig) -> AuthResult<Self> {
        let signer = TokenSigner::new(&config.token)?;
        let hasher = PasswordHasher::new(config.hash_cost)
            .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            uow,
            signer: Arc::new(signer),
            hasher: Arc::new(hasher),
        })
    }
}

// ============================================================================
// Health
// ============================================================================

/// GET /ping
pub async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    U: UnitOfWork,
{
    req.validate()?;

    let use_case = RegisterUseCase::new(
        state.uow.clone(),
        state.signer.clone(),
        state.hasher.clone(),
    );

    let input = RegisterInput {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

// ============================================================================
// Login
// ============================================================================

/// POST /auth/login
pub async fn login<U>(
    State(state): State<AuthAppState<U>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UnitOfWork,
{
    let use_case = LoginUseCase::new(
        state.uow.clone(),
        state.signer.clone(),
        state.hasher.clone(),
    );

    let input = LoginInput {
        username: req.username,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Profile (requires authentication)
// ============================================================================

/// GET /auth/profile
pub async fn profile<U>(
    State(state): State<AuthAppState<U>>,
    Extension(claims): Extension<SessionClaims>,
) -> AuthResult<Json<UserResponse>>
where
    U: UnitOfWork,
{
    let user_id: UserId = claims
        .user_id
        .parse()
        .map_err(|_| AuthError::InvalidToken(TokenError::InvalidSubject))?;

    let user = GetProfileUseCase::new(state.uow.clone())
        .execute(&user_id)
        .await?;

    Ok(Json(user.view().into()))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/test
pub async fn admin_test(Extension(claims): Extension<SessionClaims>) -> Json<AdminResponse> {
    Json(AdminResponse {
        message: "This is an admin-only endpoint".to_string(),
        user: claims.username,
    })
}
