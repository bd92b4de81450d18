//! Client-facing error
//!
//! Every domain crate owns a `thiserror` enum and lowers it into an
//! [`AppError`] right before the response is written.

use std::borrow::Cow;
use std::fmt;

use super::kind::ErrorKind;

type Text = Cow<'static, str>;

/// What a client is told when a request fails
///
/// Only carries text that is safe to show. Whoever builds one is
/// responsible for logging the underlying cause first.
///
/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::conflict("username already exists")
///     .with_action("Choose a different username");
/// assert_eq!(err.status_code(), 409);
/// assert_eq!(err.action(), Some("Choose a different username"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    kind: ErrorKind,
    message: Text,
    action: Option<Text>,
}

macro_rules! kind_constructors {
    ($($name:ident => $kind:ident),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(message: impl Into<Text>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )*
    };
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Text>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
        }
    }

    kind_constructors! {
        bad_request => BadRequest,
        unauthorized => Unauthorized,
        forbidden => Forbidden,
        not_found => NotFound,
        conflict => Conflict,
        internal => InternalServerError,
        service_unavailable => ServiceUnavailable,
    }

    /// Hint for what the client should do next
    pub fn with_action(mut self, action: impl Into<Text>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.status_code(), self.message)?;
        match &self.action {
            Some(action) => write!(f, " ({action})"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for AppError {}
