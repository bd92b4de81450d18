//! Infrastructure Layer
//!
//! Store backends for the unit of work and user repository.

pub mod memory;
pub mod postgres;
pub(crate) mod transaction;

pub use memory::MemoryUnitOfWork;
pub use postgres::PgUnitOfWork;
