//! # Ledger Diary Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Funded authority + service harness
//! ├── benchmarks/       # Criterion benchmark groups
//! │   ├── derivation.rs
//! │   └── transactions.rs
//! │
//! └── integration/      # End-to-end flows through DiaryService
//!     ├── lifecycle.rs
//!     ├── authorization.rs
//!     ├── atomicity.rs
//!     └── concurrency.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p diary-tests
//!
//! # By category
//! cargo test -p diary-tests integration::lifecycle
//! cargo test -p diary-tests integration::concurrency
//!
//! # Benchmarks
//! cargo bench -p diary-tests
//! ```

pub mod fixtures;
pub mod integration;
