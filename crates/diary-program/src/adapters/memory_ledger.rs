//! # In-Memory Ledger
//!
//! Ledger adapter backed by a hash map. Used by the node binary and by
//! tests; a networked ledger client would implement the same port.

use crate::domain::entities::{Account, MAX_PERMITTED_DATA_LENGTH};
use crate::domain::services::rent;
use crate::domain::value_objects::{Lamports, Pubkey};
use crate::errors::LedgerError;
use crate::ports::outbound::Ledger;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// In-memory ledger with non-blocking account locks.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<Pubkey, Account>>,
    locked: Mutex<HashSet<Pubkey>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `lamports` to a system-owned account, creating it if needed.
    pub fn airdrop(&self, address: Pubkey, lamports: Lamports) {
        let mut accounts = self.accounts.write();
        let account = accounts
            .entry(address)
            .or_insert_with(|| Account::new(0, 0, Pubkey::ZERO));
        account.lamports = account.lamports.saturating_add(lamports);
        debug!(%address, lamports, "Airdrop");
    }

    /// Creates a zero-filled account of `space` bytes owned by `owner`,
    /// funded with `lamports` from `payer`.
    ///
    /// # Errors
    ///
    /// - `InvalidAccountSize` if `space` exceeds 10 MiB
    /// - `NotRentExempt` if `lamports` cannot cover rent for `space`
    /// - `AccountInUse` if either account is locked
    /// - `AccountAlreadyExists` if `new` is occupied
    /// - `InsufficientFunds` if `payer` cannot cover `lamports`
    pub fn create_account(
        &self,
        payer: &Pubkey,
        new: &Pubkey,
        lamports: Lamports,
        space: usize,
        owner: &Pubkey,
    ) -> Result<(), LedgerError> {
        if space > MAX_PERMITTED_DATA_LENGTH {
            return Err(LedgerError::InvalidAccountSize {
                requested: space,
                max: MAX_PERMITTED_DATA_LENGTH,
            });
        }
        let minimum = rent::minimum_balance(space);
        if lamports < minimum {
            return Err(LedgerError::NotRentExempt { lamports, minimum });
        }

        {
            let locked = self.locked.lock();
            if let Some(busy) = [payer, new].into_iter().find(|a| locked.contains(*a)) {
                return Err(LedgerError::AccountInUse(*busy));
            }
        }

        let mut accounts = self.accounts.write();
        if accounts.contains_key(new) {
            return Err(LedgerError::AccountAlreadyExists(*new));
        }
        let available = accounts.get(payer).map_or(0, |a| a.lamports);
        if available < lamports {
            return Err(LedgerError::InsufficientFunds {
                account: *payer,
                required: lamports,
                available,
            });
        }

        if let Some(source) = accounts.get_mut(payer) {
            source.lamports -= lamports;
            if source.lamports == 0 {
                accounts.remove(payer);
            }
        }
        accounts.insert(*new, Account::new(lamports, space, *owner));
        debug!(%payer, %new, lamports, space, %owner, "Account created");
        Ok(())
    }

    /// Number of live accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Number of currently held locks.
    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.locked.lock().len()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError> {
        Ok(self.accounts.read().get(address).cloned())
    }

    async fn commit(&self, changes: Vec<(Pubkey, Option<Account>)>) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.write();
        for (address, change) in changes {
            match change {
                Some(account) if account.is_live() => {
                    accounts.insert(address, account);
                }
                _ => {
                    accounts.remove(&address);
                    trace!(%address, "Account removed");
                }
            }
        }
        Ok(())
    }

    fn lock_accounts(&self, addresses: &[Pubkey]) -> Result<(), LedgerError> {
        let mut locked = self.locked.lock();
        if let Some(busy) = addresses.iter().find(|a| locked.contains(*a)) {
            return Err(LedgerError::AccountInUse(*busy));
        }
        locked.extend(addresses.iter().copied());
        Ok(())
    }

    fn unlock_accounts(&self, addresses: &[Pubkey]) {
        let mut locked = self.locked.lock();
        for address in addresses {
            locked.remove(address);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
