//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic for the diary program.
//! NO I/O, NO async.
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - Dependencies point INWARD only (stores and adapters depend on this).

pub mod entities;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
