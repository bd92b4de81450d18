//! Shared Kernel
//!
//! Vocabulary every backend crate agrees on:
//! - The transport-facing error type and its HTTP classification
//! - Typed identifiers for domain entities
//!
//! Only things whose meaning is stable across domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
