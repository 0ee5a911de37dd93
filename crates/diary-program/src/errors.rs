//! # Error Types
//!
//! All error types for the diary program and the ledger it runs on.

use crate::domain::value_objects::{Lamports, Pubkey};
use thiserror::Error;

// =============================================================================
// DIARY ERRORS
// =============================================================================

/// Errors returned by diary operations.
///
/// Every variant aborts the whole transaction; nothing is committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiaryError {
    /// No initialized diary or record lives at the address.
    #[error("not found: {0}")]
    NotFound(Pubkey),

    /// The address is already occupied.
    #[error("already exists: {0}")]
    AlreadyExists(Pubkey),

    /// The signer is not the diary's authority.
    #[error("unauthorized: diary authority is {expected}, signer is {actual}")]
    Unauthorized {
        /// Authority stored in the diary.
        expected: Pubkey,
        /// Key that signed instead.
        actual: Pubkey,
    },

    /// A required account did not sign the transaction.
    #[error("missing required signature for {0}")]
    MissingSigner(Pubkey),

    /// The payload does not fit the allocated storage.
    #[error("insufficient space at {address}: required {required} bytes, available {available}")]
    InsufficientSpace {
        /// Account that is too small.
        address: Pubkey,
        /// Bytes the write needs.
        required: usize,
        /// Bytes the account holds.
        available: usize,
    },

    /// Stored bytes could not be decoded.
    #[error("corrupt record: {0}")]
    CorruptRecord(#[from] CodecError),

    /// Diary name is empty.
    #[error("diary name is empty")]
    EmptyName,

    /// Diary name is too long.
    #[error("diary name too long: {len} >= {max} bytes")]
    NameTooLong {
        /// Name length in bytes.
        len: usize,
        /// Exclusive upper bound.
        max: usize,
    },

    /// The diary already references the maximum number of records.
    #[error("diary is full: {max} records")]
    DiaryFull {
        /// Configured record limit.
        max: usize,
    },

    /// The supplied diary account is not the one derived from the seeds.
    #[error("address mismatch: expected {expected}, got {actual}")]
    AddressMismatch {
        /// Address derived from the seeds.
        expected: Pubkey,
        /// Address the instruction supplied.
        actual: Pubkey,
    },

    /// Account is not owned by the diary program.
    #[error("account {address} is owned by {owner}, not the diary program")]
    IllegalOwner {
        /// Offending account.
        address: Pubkey,
        /// Its actual owner.
        owner: Pubkey,
    },

    /// Payer cannot fund the new account.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Lamports needed.
        required: Lamports,
        /// Lamports held by the payer.
        available: Lamports,
    },

    /// Instruction data could not be decoded.
    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),

    /// Instruction targets a different program.
    #[error("incorrect program id: {0}")]
    IncorrectProgramId(Pubkey),

    /// Fewer accounts were supplied than the instruction needs.
    #[error("not enough accounts: expected {expected}, got {actual}")]
    NotEnoughAccounts {
        /// Accounts the instruction needs.
        expected: usize,
        /// Accounts supplied.
        actual: usize,
    },

    /// Account was touched without being declared by the transaction.
    #[error("account not declared by the transaction: {0}")]
    UndeclaredAccount(Pubkey),

    /// Write to an account the transaction declared read-only.
    #[error("account declared read-only: {0}")]
    ReadOnlyAccount(Pubkey),

    /// A domain invariant would be broken by the commit.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Address derivation failed.
    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    /// Ledger access failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Execution exceeded the configured timeout.
    #[error("execution timeout after {elapsed_ms}ms")]
    Timeout {
        /// Time spent before giving up.
        elapsed_ms: u64,
    },
}

impl DiaryError {
    /// Returns true if resubmitting the same transaction may succeed.
    ///
    /// Lock conflicts and timeouts are transient; everything else is a
    /// property of the transaction or of stored state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Ledger(LedgerError::AccountInUse(_))
        )
    }

    /// Short, stable label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::Unauthorized { .. } | Self::MissingSigner(_) => "unauthorized",
            Self::InsufficientSpace { .. } => "insufficient_space",
            Self::CorruptRecord(_) => "corrupt_record",
            Self::EmptyName | Self::NameTooLong { .. } => "invalid_name",
            Self::DiaryFull { .. } => "diary_full",
            Self::AddressMismatch { .. } | Self::Derivation(_) => "address_mismatch",
            Self::IllegalOwner { .. } => "illegal_owner",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidInstruction(_)
            | Self::IncorrectProgramId(_)
            | Self::NotEnoughAccounts { .. }
            | Self::UndeclaredAccount(_) => "invalid_instruction",
            Self::ReadOnlyAccount(_) => "read_only_account",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::Ledger(_) => "ledger",
            Self::Timeout { .. } => "timeout",
        }
    }
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from decoding on-ledger byte layouts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer ended before the field did.
    #[error("truncated: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        /// Cursor position when reading failed.
        offset: usize,
        /// Bytes the field needs.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// String field is not valid UTF-8.
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    /// Account discriminator does not match the expected type.
    #[error("unexpected discriminator {found:02x?}")]
    BadDiscriminator {
        /// The leading bytes actually stored.
        found: [u8; 8],
    },

    /// Declared length exceeds what the format allows.
    #[error("length {len} exceeds limit {max}")]
    LengthOverflow {
        /// Declared length.
        len: usize,
        /// Largest length accepted.
        max: usize,
    },
}

// =============================================================================
// DERIVATION ERRORS
// =============================================================================

/// Errors from program-address derivation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// A seed is longer than 32 bytes.
    #[error("seed length {len} exceeds maximum of {max}")]
    MaxSeedLengthExceeded {
        /// Length of the offending seed.
        len: usize,
        /// Per-seed limit.
        max: usize,
    },

    /// More seeds than allowed.
    #[error("{count} seeds exceed maximum of {max}")]
    TooManySeeds {
        /// Seeds supplied.
        count: usize,
        /// Seed count limit.
        max: usize,
    },

    /// The seeds and bump hash to a point on the curve.
    #[error("seeds produce an on-curve address")]
    InvalidSeeds,

    /// No bump in 0..=255 produced an off-curve address.
    #[error("unable to find a viable bump seed")]
    NoViableBump,
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors from the ledger access layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Account is locked by an in-flight transaction.
    #[error("account in use: {0}")]
    AccountInUse(Pubkey),

    /// Account does not exist.
    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Account already exists.
    #[error("account already exists: {0}")]
    AccountAlreadyExists(Pubkey),

    /// Payer balance too low.
    #[error("insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        /// Paying account.
        account: Pubkey,
        /// Lamports needed.
        required: Lamports,
        /// Lamports it holds.
        available: Lamports,
    },

    /// Requested size or balance is not acceptable for a new account.
    #[error("invalid account size: requested {requested}, max {max}")]
    InvalidAccountSize {
        /// Size asked for.
        requested: usize,
        /// Largest size allowed.
        max: usize,
    },

    /// Lamports below the rent-exempt minimum for the requested size.
    #[error("not rent exempt: {lamports} < {minimum}")]
    NotRentExempt {
        /// Lamports offered.
        lamports: Lamports,
        /// Rent-exempt minimum for the size.
        minimum: Lamports,
    },

    /// A signer account has no signature attached.
    #[error("missing signature for {0}")]
    MissingSignature(Pubkey),

    /// A signature does not verify against the message.
    #[error("signature verification failed for {0}")]
    SignatureVerificationFailed(Pubkey),

    /// Message could not be serialized for signing.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backing store unavailable.
    #[error("ledger unavailable")]
    Unavailable,
}

// =============================================================================
// TESTS
// =============================================================================
