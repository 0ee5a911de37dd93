//! Diary metadata accounts.

use crate::codec::{Decode, Encode};
use crate::domain::entities::{Account, Diary, DIARY_ACCOUNT_LEN};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::services::rent;
use crate::domain::value_objects::Pubkey;
use crate::errors::DiaryError;
use crate::store::AccountSet;
use tracing::debug;

/// Reads and writes diaries at their derived addresses.
#[derive(Debug, Clone, Copy)]
pub struct DiaryStore {
    program_id: Pubkey,
    max_records: usize,
}

impl DiaryStore {
    /// Creates a store for diaries owned by `program_id`.
    #[must_use]
    pub fn new(program_id: Pubkey, max_records: usize) -> Self {
        Self {
            program_id,
            max_records,
        }
    }

    /// Allocates a rent-exempt diary account funded by `payer` and writes
    /// the fresh diary into it.
    pub fn initialize(
        &self,
        accounts: &mut AccountSet,
        payer: &Pubkey,
        address: &Pubkey,
        diary: &Diary,
    ) -> Result<(), DiaryError> {
        if accounts.get(address)?.is_some_and(Account::is_live) {
            return Err(DiaryError::AlreadyExists(*address));
        }

        let required = rent::minimum_balance(DIARY_ACCOUNT_LEN);
        let available = accounts.get(payer)?.map_or(0, |a| a.lamports);
        if available < required {
            return Err(DiaryError::InsufficientFunds {
                required,
                available,
            });
        }

        accounts.create(*address, Account::new(0, DIARY_ACCOUNT_LEN, self.program_id))?;
        accounts.transfer(payer, address, required)?;
        self.save(accounts, address, diary)?;

        debug!(%address, id = diary.id, rent = required, "Diary account initialized");
        Ok(())
    }

    /// Loads the diary stored at `address`.
    pub fn load(&self, accounts: &AccountSet, address: &Pubkey) -> Result<Diary, DiaryError> {
        let account = accounts
            .get(address)?
            .filter(|a| a.is_live())
            .ok_or(DiaryError::NotFound(*address))?;
        if account.owner != self.program_id {
            return Err(DiaryError::IllegalOwner {
                address: *address,
                owner: account.owner,
            });
        }
        if account.is_zeroed() {
            return Err(DiaryError::NotFound(*address));
        }
        Ok(Diary::decode(&account.data)?)
    }

    /// Writes `diary` into the staged account, zero-filling the tail.
    pub fn save(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        diary: &Diary,
    ) -> Result<(), DiaryError> {
        if let InvariantCheckResult::Invalid(violations) =
            check_all_invariants(diary, diary.id, self.max_records)
        {
            let joined: Vec<String> = violations.iter().map(ToString::to_string).collect();
            return Err(DiaryError::InvariantViolation(joined.join("; ")));
        }

        let bytes = diary.encode();
        let account = accounts.get_mut(address)?;
        if account.owner != self.program_id {
            return Err(DiaryError::IllegalOwner {
                address: *address,
                owner: account.owner,
            });
        }
        if bytes.len() > account.data.len() {
            return Err(DiaryError::InsufficientSpace {
                address: *address,
                required: bytes.len(),
                available: account.data.len(),
            });
        }

        account.data[..bytes.len()].copy_from_slice(&bytes);
        account.data[bytes.len()..].fill(0);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
