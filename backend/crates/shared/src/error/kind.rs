//! HTTP-facing error classes

/// Broad class of a failure, one per response status
///
/// Domain errors pick a kind; the transport turns it into a status line.
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::Conflict.status_code(), 409);
/// assert_eq!(ErrorKind::Conflict.to_string(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    /// Authenticated, but the role does not allow it
    Forbidden,
    NotFound,
    /// Clashes with an existing record
    Conflict,
    InternalServerError,
    /// A dependency (database, pool) is down or saturated
    ServiceUnavailable,
}

impl ErrorKind {
    const fn parts(self) -> (u16, &'static str) {
        match self {
            Self::BadRequest => (400, "Bad Request"),
            Self::Unauthorized => (401, "Unauthorized"),
            Self::Forbidden => (403, "Forbidden"),
            Self::NotFound => (404, "Not Found"),
            Self::Conflict => (409, "Conflict"),
            Self::InternalServerError => (500, "Internal Server Error"),
            Self::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    pub const fn status_code(self) -> u16 {
        self.parts().0
    }

    /// Reason phrase, used as the problem `title`
    pub const fn as_str(self) -> &'static str {
        self.parts().1
    }

    /// Failures on our side. Their detail belongs in logs, not responses.
    pub const fn is_server_error(self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
