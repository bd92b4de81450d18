//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and unit-of-work traits
//! - `application/` - Use cases (register, login, profile, admin seeding)
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Registration and login with username + password
//! - Stateless HS256 session tokens (`Authorization: Bearer`)
//! - Role-based access (User, Admin)
//! - Soft-deleted accounts keep their username and email reserved
//!
//! ## Security Model
//! - Passwords hashed with Argon2id on the blocking pool
//! - Unknown users and wrong passwords are indistinguishable, including timing
//! - Writes go through a unit of work; any error or panic rolls back

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, DefaultAdmin};
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryUnitOfWork, postgres::PgUnitOfWork};
pub use presentation::{AuthAppState, auth_router};
