//! Platform Crate - Technical Infrastructure
//!
//! Domain-agnostic building blocks shared by the backend crates:
//! - Password hashing (Argon2id, PHC strings)
//! - Signed session tokens (JWT, HS256)

pub mod password;
pub mod token;
