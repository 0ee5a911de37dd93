//! # Account Stores
//!
//! Per-transaction view of ledger accounts.
//!
//! `AccountSet` holds a staged copy of every account the transaction
//! declared, together with its writable flag. `DiaryStore` and `RecordStore`
//! read and write through it; writes to read-only accounts are refused, and
//! nothing reaches the ledger until the service commits the whole set, so a
//! failed operation leaves no trace.

pub mod diary_store;
pub mod record_store;

pub use diary_store::DiaryStore;
pub use record_store::RecordStore;

use crate::domain::entities::Account;
use crate::domain::value_objects::{Lamports, Pubkey};
use crate::errors::{DiaryError, LedgerError};
use crate::instruction::AccountMeta;
use crate::ports::outbound::Ledger;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Staged {
    account: Option<Account>,
    writable: bool,
    dirty: bool,
}

/// Staged accounts for one transaction.
#[derive(Debug, Clone, Default)]
pub struct AccountSet {
    accounts: BTreeMap<Pubkey, Staged>,
    lamports_before: u128,
}

impl AccountSet {
    /// Loads every declared account from the ledger.
    ///
    /// Missing accounts are staged as absent so they can be created. A key
    /// listed twice is writable if any of its metas is.
    pub async fn load<L: Ledger + ?Sized>(
        ledger: &L,
        metas: &[AccountMeta],
    ) -> Result<Self, LedgerError> {
        let mut set = Self::default();
        for meta in metas {
            if let Some(staged) = set.accounts.get_mut(&meta.pubkey) {
                staged.writable |= meta.is_writable;
                continue;
            }
            let account = ledger.get_account(&meta.pubkey).await?;
            set.stage(meta.pubkey, account, meta.is_writable);
        }
        Ok(set)
    }

    /// Builds a set of writable accounts already in memory.
    #[must_use]
    pub fn from_accounts(accounts: impl IntoIterator<Item = (Pubkey, Option<Account>)>) -> Self {
        let mut set = Self::default();
        for (address, account) in accounts {
            set.stage(address, account, true);
        }
        set
    }

    /// Marks a declared account read-only for the rest of the transaction.
    pub fn set_read_only(&mut self, address: &Pubkey) -> Result<(), DiaryError> {
        self.accounts
            .get_mut(address)
            .ok_or(DiaryError::UndeclaredAccount(*address))?
            .writable = false;
        Ok(())
    }

    fn stage(&mut self, address: Pubkey, account: Option<Account>, writable: bool) {
        self.lamports_before += account.as_ref().map_or(0, |a| u128::from(a.lamports));
        self.accounts.insert(
            address,
            Staged {
                account,
                writable,
                dirty: false,
            },
        );
    }

    fn writable(&mut self, address: &Pubkey) -> Result<&mut Staged, DiaryError> {
        let staged = self
            .accounts
            .get_mut(address)
            .ok_or(DiaryError::UndeclaredAccount(*address))?;
        if !staged.writable {
            return Err(DiaryError::ReadOnlyAccount(*address));
        }
        Ok(staged)
    }

    /// Returns true if the transaction declared `address`.
    #[must_use]
    pub fn is_declared(&self, address: &Pubkey) -> bool {
        self.accounts.contains_key(address)
    }

    /// Returns true if `address` is declared and may be modified.
    #[must_use]
    pub fn is_writable(&self, address: &Pubkey) -> bool {
        self.accounts.get(address).is_some_and(|s| s.writable)
    }

    /// Staged account, if declared and present.
    pub fn get(&self, address: &Pubkey) -> Result<Option<&Account>, DiaryError> {
        self.accounts
            .get(address)
            .map(|s| s.account.as_ref())
            .ok_or(DiaryError::UndeclaredAccount(*address))
    }

    /// Mutable staged account; marks it for commit.
    pub fn get_mut(&mut self, address: &Pubkey) -> Result<&mut Account, DiaryError> {
        let staged = self.writable(address)?;
        staged.dirty = true;
        staged.account.as_mut().ok_or(DiaryError::NotFound(*address))
    }

    /// Stages a brand-new account at an absent address.
    pub fn create(&mut self, address: Pubkey, account: Account) -> Result<(), DiaryError> {
        let staged = self.writable(&address)?;
        if staged.account.as_ref().is_some_and(Account::is_live) {
            return Err(DiaryError::AlreadyExists(address));
        }
        staged.account = Some(account);
        staged.dirty = true;
        Ok(())
    }

    /// Moves lamports between two staged accounts. Both must be writable.
    pub fn transfer(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: Lamports,
    ) -> Result<(), DiaryError> {
        self.writable(to)?;
        let source = self.get_mut(from)?;
        if source.lamports < lamports {
            return Err(DiaryError::InsufficientFunds {
                required: lamports,
                available: source.lamports,
            });
        }
        source.lamports -= lamports;
        let dest = self.get_mut(to)?;
        dest.lamports = dest
            .lamports
            .checked_add(lamports)
            .ok_or_else(|| DiaryError::InvariantViolation("lamport overflow".into()))?;
        Ok(())
    }

    fn lamports_total(&self) -> u128 {
        self.accounts
            .values()
            .filter_map(|s| s.account.as_ref())
            .map(|a| u128::from(a.lamports))
            .sum()
    }

    /// Lamports are only ever moved between staged accounts, never minted
    /// or burned.
    pub fn check_lamports_conserved(&self) -> Result<(), DiaryError> {
        let after = self.lamports_total();
        if after != self.lamports_before {
            return Err(DiaryError::InvariantViolation(format!(
                "lamports not conserved: {} before, {after} after",
                self.lamports_before
            )));
        }
        Ok(())
    }

    /// Changed accounts, ready for an atomic commit.
    ///
    /// Accounts drained to zero lamports are returned as `None` (deleted).
    #[must_use]
    pub fn into_changes(self) -> Vec<(Pubkey, Option<Account>)> {
        self.accounts
            .into_iter()
            .filter(|(_, s)| s.dirty)
            .map(|(address, s)| (address, s.account.filter(Account::is_live)))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
