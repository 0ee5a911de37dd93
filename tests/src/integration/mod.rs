//! # Integration Flows
//!
//! Signed transactions through `DiaryService` against the in-memory ledger.

pub mod atomicity;
pub mod concurrency;
pub mod lifecycle;
