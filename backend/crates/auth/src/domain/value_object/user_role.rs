use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
///
/// Stored as its text code. Codes other than the known ones are kept
/// verbatim so new roles can be introduced without a migration; only
/// `Admin` carries elevated privilege.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Other(String),
}

impl UserRole {
    #[inline]
    pub fn code(&self) -> &str {
        use UserRole::*;
        match self {
            User => "user",
            Admin => "admin",
            Other(code) => code,
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn from_code(code: &str) -> Self {
        use UserRole::*;
        match code {
            "user" => User,
            "admin" => Admin,
            other => Other(other.to_string()),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for UserRole {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.code().to_string()
    }
}
