//! # Driven Ports (SPI - Outbound)
//!
//! The ledger the diary program is deployed onto. The program never holds
//! account state of its own; every read goes through `get_account` and every
//! write through a single atomic `commit`.

use crate::domain::entities::Account;
use crate::domain::value_objects::{Lamports, Pubkey};
use crate::errors::LedgerError;
use async_trait::async_trait;

// =============================================================================
// LEDGER ACCESS
// =============================================================================

/// Key-value store of accounts with per-account write locks.
///
/// ## Implementation Notes
///
/// - `lock_accounts` is all-or-nothing and must not block: if any address is
///   held by another transaction the call fails with `AccountInUse`.
/// - `commit` applies every change or none. `None` deletes the account.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Current state of an account, `None` if it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, LedgerError>;

    /// Atomically applies a batch of account changes.
    async fn commit(&self, changes: Vec<(Pubkey, Option<Account>)>) -> Result<(), LedgerError>;

    /// Takes write locks on every address.
    fn lock_accounts(&self, addresses: &[Pubkey]) -> Result<(), LedgerError>;

    /// Releases locks taken by `lock_accounts`.
    fn unlock_accounts(&self, addresses: &[Pubkey]);

    /// Check if account exists.
    async fn account_exists(&self, address: &Pubkey) -> Result<bool, LedgerError> {
        Ok(self.get_account(address).await?.is_some())
    }

    /// Get account balance; zero for absent accounts.
    async fn get_balance(&self, address: &Pubkey) -> Result<Lamports, LedgerError> {
        Ok(self
            .get_account(address)
            .await?
            .map_or(0, |account| account.lamports))
    }
}
