//! # Driving Ports (API - Inbound)
//!
//! The public API of the diary program. Callers submit signed transactions
//! and query committed state.

use crate::domain::entities::{Diary, Record};
use crate::domain::value_objects::Pubkey;
use crate::errors::DiaryError;
use crate::events::DiaryEvent;
use crate::transaction::Transaction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome of a committed transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Hex of the fee payer's signature; identifies the transaction.
    pub signature: String,
    /// Events emitted, one per instruction.
    pub events: Vec<DiaryEvent>,
    /// Program log lines.
    pub logs: Vec<String>,
}

/// Diary program API.
#[async_trait]
pub trait DiaryApi: Send + Sync {
    /// Verifies, executes and atomically commits a transaction.
    ///
    /// # Errors
    ///
    /// Any error means nothing was committed.
    async fn process_transaction(&self, tx: &Transaction)
        -> Result<TransactionReceipt, DiaryError>;

    /// Committed diary at `address`.
    async fn get_diary(&self, address: &Pubkey) -> Result<Diary, DiaryError>;

    /// Committed record at `address`.
    async fn get_record(&self, address: &Pubkey) -> Result<Record, DiaryError>;
}
