//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, conversions::sqlx_error_kind, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input
    #[error("{0}")]
    Validation(String),

    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken(#[source] TokenError),

    #[error("missing bearer token")]
    MissingToken,

    #[error("admin role required")]
    AdminRequired,

    #[error("user not found")]
    UserNotFound,

    /// Signing secret or expiry not usable
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The transaction failed and could not be rolled back either
    #[error("{source} (rollback also failed: {rollback})")]
    RollbackFailed {
        source: Box<AuthError>,
        rollback: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::UsernameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::MissingToken => ErrorKind::Unauthorized,
            AuthError::AdminRequired => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(e) => sqlx_error_kind(e),
            AuthError::RollbackFailed { source, .. } => source.kind(),
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    ///
    /// Server-side failures and every driver error get a generic message;
    /// the detail stays in logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::RollbackFailed { source, .. } => source.to_app_error(),
            AuthError::Validation(msg) => AppError::bad_request(msg.clone()),
            AuthError::UsernameTaken | AuthError::EmailTaken => {
                AppError::conflict(self.to_string())
            }
            AuthError::InvalidCredentials => AppError::unauthorized(self.to_string()),
            AuthError::MissingToken => AppError::unauthorized(self.to_string())
                .with_action("Send an `Authorization: Bearer <token>` header"),
            AuthError::InvalidToken(_) => {
                AppError::unauthorized(self.to_string()).with_action("Log in again")
            }
            AuthError::AdminRequired => AppError::forbidden(self.to_string()),
            AuthError::UserNotFound => AppError::not_found(self.to_string()),
            AuthError::Database(e) => database_app_error(e),
            AuthError::Configuration(_) | AuthError::Internal(_) => {
                AppError::internal("internal server error")
            }
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::RollbackFailed { source, rollback } => {
                tracing::error!(error = %source, rollback = %rollback, "Transaction rollback failed");
            }
            AuthError::Configuration(msg) | AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidToken(reason) => {
                tracing::warn!(reason = %reason, "Rejected session token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

/// Driver text can name tables, constraints and values, so it never reaches
/// the client, whatever the kind.
fn database_app_error(err: &sqlx::Error) -> AppError {
    match sqlx_error_kind(err) {
        ErrorKind::NotFound => AppError::not_found("record not found"),
        ErrorKind::Conflict => AppError::conflict("conflicting record"),
        ErrorKind::BadRequest => AppError::bad_request("invalid data"),
        ErrorKind::ServiceUnavailable => AppError::service_unavailable("service unavailable"),
        _ => AppError::internal("internal server error"),
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        if err.is_configuration() {
            AuthError::Configuration(err.to_string())
        } else {
            AuthError::InvalidToken(err)
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let cases = [
            (AuthError::Validation("bad".into()), 400),
            (AuthError::UsernameTaken, 409),
            (AuthError::EmailTaken, 409),
            (AuthError::InvalidCredentials, 401),
            (AuthError::InvalidToken(TokenError::Expired), 401),
            (AuthError::MissingToken, 401),
            (AuthError::AdminRequired, 403),
            (AuthError::UserNotFound, 404),
            (AuthError::Configuration("x".into()), 500),
            (AuthError::Database(sqlx::Error::PoolTimedOut), 503),
            (AuthError::Internal("x".into()), 500),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn test_conflict_messages_name_the_field() {
        assert_eq!(AuthError::UsernameTaken.to_app_error().message(), "username already exists");
        assert_eq!(AuthError::EmailTaken.to_app_error().message(), "email already exists");
    }

    #[test]
    fn test_server_errors_are_sanitized() {
        let err = AuthError::Internal("connection string postgres://secret".into());
        let app = err.to_app_error();
        assert_eq!(app.kind(), ErrorKind::InternalServerError);
        assert!(!app.message().contains("secret"));
    }

    #[test]
    fn test_database_errors_never_echo_driver_text() {
        let err = AuthError::Database(sqlx::Error::RowNotFound);
        let app = err.to_app_error();
        assert_eq!(app.kind(), ErrorKind::NotFound);
        assert_eq!(app.message(), "record not found");
        assert!(!app.message().contains("no rows returned"));

        let err = AuthError::Database(sqlx::Error::PoolTimedOut);
        let app = err.to_app_error();
        assert_eq!(app.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(app.message(), "service unavailable");

        let err = AuthError::Database(sqlx::Error::Protocol("relation users_secret".into()));
        let app = err.to_app_error();
        assert_eq!(app.kind(), ErrorKind::InternalServerError);
        assert!(!app.message().contains("users_secret"));
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let app = AuthError::Validation("email is invalid".into()).to_app_error();
        assert_eq!(app.kind(), ErrorKind::BadRequest);
        assert_eq!(app.message(), "email is invalid");

        let app = AuthError::AdminRequired.to_app_error();
        assert_eq!(app.kind(), ErrorKind::Forbidden);
        assert_eq!(app.message(), "admin role required");

        let app = AuthError::InvalidToken(TokenError::Expired).to_app_error();
        assert_eq!(app.action(), Some("Log in again"));
    }

    #[test]
    fn test_rollback_failure_keeps_original_kind() {
        let err = AuthError::RollbackFailed {
            source: Box::new(AuthError::EmailTaken),
            rollback: "connection closed".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_app_error().message(), "email already exists");
        assert!(err.to_string().contains("rollback also failed"));
    }

    #[test]
    fn test_token_configuration_errors_are_not_auth_failures() {
        let err: AuthError = TokenError::MissingSecret.into();
        assert!(matches!(err, AuthError::Configuration(_)));

        let err: AuthError = TokenError::Expired.into();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_empty_password_is_validation_error() {
        let err: AuthError = PasswordPolicyError::Empty.into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
