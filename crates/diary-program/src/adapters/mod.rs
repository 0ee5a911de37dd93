//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports.

pub mod memory_ledger;

pub use memory_ledger::*;
