//! # Domain Entities
//!
//! Diary metadata, record payloads and the raw ledger account that stores
//! either of them.

use crate::domain::value_objects::{Lamports, Pubkey};
use serde::{Deserialize, Serialize};

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

/// Length of the type discriminator prefixed to diary and record data.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Bytes of a record account before the text: discriminator and length.
pub const RECORD_HEADER_LEN: usize = DISCRIMINATOR_LEN + 4;

/// Exclusive upper bound on diary name length, in bytes.
pub const MAX_NAME_LENGTH: usize = 20;

/// Largest account a transaction may allocate up front (10 MiB).
pub const MAX_PERMITTED_DATA_LENGTH: usize = 10 * 1024 * 1024;

/// Largest account a program may create for a derived address.
pub const MAX_DERIVED_ACCOUNT_LENGTH: usize = 10_240;

/// Bytes of a diary account that do not depend on the record count.
pub const DIARY_HEADER_LEN: usize = DISCRIMINATOR_LEN
    + 4                      // id
    + 32                     // authority
    + 4 + MAX_NAME_LENGTH    // name
    + 4                      // records_len
    + 1; // bump

/// Maximum records a single diary can reference.
pub const MAX_RECORDS: usize = (MAX_DERIVED_ACCOUNT_LENGTH - DIARY_HEADER_LEN) / 32;

/// Allocated size of every diary account.
pub const DIARY_ACCOUNT_LEN: usize = DIARY_HEADER_LEN + 32 * MAX_RECORDS;

// =============================================================================
// DIARY
// =============================================================================

/// Diary metadata stored at the derived diary address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diary {
    /// Diary id, part of the derivation seeds.
    pub id: u32,
    /// Owner; must sign every mutation.
    pub authority: Pubkey,
    /// Human-readable name.
    pub name: String,
    /// Record account addresses, in insertion order.
    pub records: Vec<Pubkey>,
    /// Bump seed found when the address was derived.
    pub bump: u8,
}

impl Diary {
    /// Creates an empty diary.
    #[must_use]
    pub fn new(id: u32, authority: Pubkey, name: impl Into<String>, bump: u8) -> Self {
        Self {
            id,
            authority,
            name: name.into(),
            records: Vec::new(),
            bump,
        }
    }

    /// Returns true if the diary references `record`.
    #[must_use]
    pub fn contains_record(&self, record: &Pubkey) -> bool {
        self.records.contains(record)
    }

    /// Position of `record` in the reference list.
    #[must_use]
    pub fn record_index(&self, record: &Pubkey) -> Option<usize> {
        self.records.iter().position(|r| r == record)
    }

    /// Number of referenced records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Exact size of the encoded diary.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        DISCRIMINATOR_LEN + 4 + 32 + 4 + self.name.len() + 4 + 32 * self.records.len() + 1
    }
}

// =============================================================================
// RECORD
// =============================================================================

/// A record's text payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// UTF-8 text.
    pub text: String,
}

impl Record {
    /// Creates a record.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Exact size of the encoded record, discriminator included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_LEN + self.text.len()
    }
}

// =============================================================================
// LEDGER ACCOUNT
// =============================================================================

/// A sized, funded storage unit on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Account {
    /// Balance; an account with zero lamports is removed at commit.
    pub lamports: Lamports,
    /// Raw data.
    pub data: Vec<u8>,
    /// Program allowed to modify `data`.
    pub owner: Pubkey,
}

impl Account {
    /// Creates a zero-filled account of `space` bytes.
    #[must_use]
    pub fn new(lamports: Lamports, space: usize, owner: Pubkey) -> Self {
        Self {
            lamports,
            data: vec![0u8; space],
            owner,
        }
    }

    /// Returns true if every data byte is zero.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }

    /// Returns true if the account still holds lamports.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.lamports > 0
    }
}

// =============================================================================
// TESTS
// =============================================================================
