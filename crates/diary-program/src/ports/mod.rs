//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `DiaryApi`
//! - **Driven Ports (Outbound)**: `Ledger`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
