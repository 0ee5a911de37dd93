//! # Diary Program - Ledger-Backed Diaries
//!
//! An authority creates diaries at addresses derived from its own key and a
//! numeric id, then attaches, extends and removes text records. Each record
//! lives in its own caller-funded account owned by the program.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Stored id equals derivation id | `domain/invariants.rs` - `check_id_invariant()` |
//! | INVARIANT-2 | Bounded record list | `domain/invariants.rs` - `check_capacity_invariant()` |
//! | INVARIANT-3 | No duplicate record references | `domain/invariants.rs` - `check_unique_records_invariant()` |
//! | INVARIANT-4 | Valid diary name | `domain/invariants.rs` - `check_name_invariant()` |
//! | INVARIANT-5 | Lamports conserved per transaction | `store/mod.rs` - `AccountSet::check_lamports_conserved()` |
//!
//! ## Security
//!
//! - Every mutation must be signed by the diary's stored authority
//! - The diary address is re-derived on every call with the stored bump
//! - Record accounts must sign `add_record`, proving the caller controls them
//! - Accounts are locked for the whole transaction; conflicts are rejected
//! - Only accounts an instruction declares writable may be modified
//!
//! ## Account Layouts
//!
//! | Account | Size | Owner |
//! |---------|------|-------|
//! | Diary | `DIARY_ACCOUNT_LEN` (10 217 bytes) | program |
//! | Record | caller-chosen, up to 10 MiB | program |
//!
//! ## Usage Example
//!
//! ```ignore
//! use diary_program::prelude::*;
//!
//! let service = create_test_service();
//! let ix = instruction::create_diary(&program_id, &authority, 1, "My diary 1")?;
//! let tx = Transaction::from_instruction(ix, &[&keypair])?;
//! let receipt = service.process_transaction(&tx).await?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod instruction;
pub mod ports;
pub mod processor;
pub mod service;
pub mod store;
pub mod transaction;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Account, Diary, Record, DIARY_ACCOUNT_LEN, MAX_NAME_LENGTH, MAX_PERMITTED_DATA_LENGTH,
        MAX_RECORDS, RECORD_HEADER_LEN,
    };

    // Value objects
    pub use crate::domain::value_objects::{Lamports, Pubkey};

    // Domain services
    pub use crate::domain::services::{
        account_discriminator, create_program_address, derive_diary_address, diary_id_seed,
        find_program_address, instruction_discriminator, rent,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Codec
    pub use crate::codec::{Decode, Encode};

    // Ports
    pub use crate::ports::inbound::{DiaryApi, TransactionReceipt};
    pub use crate::ports::outbound::Ledger;

    // Instructions and transactions
    pub use crate::instruction::{self, AccountMeta, DiaryInstruction, Instruction};
    pub use crate::transaction::{Message, Transaction};

    // Events
    pub use crate::events::DiaryEvent;

    // Errors
    pub use crate::errors::{CodecError, DerivationError, DiaryError, LedgerError};

    // Adapters
    pub use crate::adapters::InMemoryLedger;

    // Service
    pub use crate::config::{ConfigError, ServiceConfig, DEFAULT_PROGRAM_ID};
    pub use crate::service::{create_test_service, DiaryService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
