//! # Domain Invariants
//!
//! Conditions that must hold for every diary before it is committed.
//!
//! | ID | Invariant |
//! |----|-----------|
//! | INVARIANT-1 | Stored id equals the id used to derive the address |
//! | INVARIANT-2 | Record count never exceeds the configured maximum |
//! | INVARIANT-3 | No record is referenced twice |
//! | INVARIANT-4 | Name is non-empty and shorter than the layout limit |

use crate::domain::entities::{Diary, MAX_NAME_LENGTH};
use std::collections::HashSet;

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// INVARIANT-1: the stored id matches the derivation input.
#[must_use]
pub fn check_id_invariant(diary: &Diary, expected_id: u32) -> bool {
    diary.id == expected_id
}

/// INVARIANT-2: the reference list is bounded.
#[must_use]
pub fn check_capacity_invariant(diary: &Diary, max_records: usize) -> bool {
    diary.records.len() <= max_records
}

/// INVARIANT-3: every referenced record is distinct.
#[must_use]
pub fn check_unique_records_invariant(diary: &Diary) -> bool {
    let mut seen = HashSet::with_capacity(diary.records.len());
    diary.records.iter().all(|r| seen.insert(*r))
}

/// INVARIANT-4: the name fits the reserved layout.
#[must_use]
pub fn check_name_invariant(diary: &Diary) -> bool {
    !diary.name.is_empty() && diary.name.len() < MAX_NAME_LENGTH
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    diary: &Diary,
    expected_id: u32,
    max_records: usize,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_id_invariant(diary, expected_id) {
        violations.push(InvariantViolation::IdMismatch {
            stored: diary.id,
            expected: expected_id,
        });
    }

    if !check_capacity_invariant(diary, max_records) {
        violations.push(InvariantViolation::TooManyRecords {
            count: diary.records.len(),
            max: max_records,
        });
    }

    if !check_unique_records_invariant(diary) {
        violations.push(InvariantViolation::DuplicateRecord);
    }

    if !check_name_invariant(diary) {
        violations.push(InvariantViolation::InvalidName {
            len: diary.name.len(),
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants are violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A single invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// INVARIANT-1.
    IdMismatch {
        /// Id stored in the diary.
        stored: u32,
        /// Id used for derivation.
        expected: u32,
    },
    /// INVARIANT-2.
    TooManyRecords {
        /// References held.
        count: usize,
        /// Allowed maximum.
        max: usize,
    },
    /// INVARIANT-3.
    DuplicateRecord,
    /// INVARIANT-4.
    InvalidName {
        /// Name length in bytes.
        len: usize,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IdMismatch { stored, expected } => {
                write!(f, "stored id {stored} != derived id {expected}")
            }
            Self::TooManyRecords { count, max } => write!(f, "{count} records > max {max}"),
            Self::DuplicateRecord => write!(f, "record referenced twice"),
            Self::InvalidName { len } => write!(f, "invalid name length {len}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
