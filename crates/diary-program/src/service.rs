//! # Diary Service
//!
//! Runs signed transactions against the ledger.
//!
//! ## Pipeline
//!
//! 1. Verify every signature and that all required signers signed
//! 2. Lock every declared account (conflicts are rejected, not queued)
//! 3. Stage the accounts with their writable flags and execute each
//!    instruction; the deadline is checked during loading and before every
//!    instruction
//! 4. Check lamport conservation and commit the whole set at once
//!
//! Any failure before the commit discards the staged set.

use crate::adapters::InMemoryLedger;
use crate::config::ServiceConfig;
use crate::domain::entities::{Diary, Record};
use crate::domain::value_objects::Pubkey;
use crate::errors::{DiaryError, LedgerError};
use crate::events::DiaryEvent;
use crate::instruction::{AccountMeta, DiaryInstruction};
use crate::ports::inbound::{DiaryApi, TransactionReceipt};
use crate::ports::outbound::Ledger;
use crate::processor::Processor;
use crate::store::{AccountSet, DiaryStore, RecordStore};
use crate::transaction::Transaction;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Statistics for the Diary Service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Transactions that reached execution.
    pub transactions_processed: u64,
    /// Committed transactions.
    pub successful_transactions: u64,
    /// Transactions aborted during execution.
    pub failed_transactions: u64,
    /// Rejected before execution (bad signature, lock conflict).
    pub rejected_transactions: u64,
    /// Diaries created.
    pub diaries_created: u64,
    /// Records added.
    pub records_added: u64,
    /// Records removed.
    pub records_removed: u64,
    /// Encoded record bytes written by add and write.
    pub record_bytes_written: u64,
    /// Average execution time in microseconds.
    pub avg_execution_time_us: u64,
}

/// Releases ledger locks when dropped, on every exit path.
struct LockGuard<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
    keys: Vec<Pubkey>,
}

impl<'a, L: Ledger + ?Sized> LockGuard<'a, L> {
    fn acquire(ledger: &'a L, keys: Vec<Pubkey>) -> Result<Self, LedgerError> {
        ledger.lock_accounts(&keys)?;
        Ok(Self { ledger, keys })
    }
}

impl<L: Ledger + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        self.ledger.unlock_accounts(&self.keys);
    }
}

/// Execution budget for one transaction.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    fn new(start: Instant, budget: Duration) -> Self {
        Self { start, budget }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn check(&self) -> Result<(), DiaryError> {
        if self.start.elapsed() >= self.budget {
            return Err(DiaryError::Timeout {
                elapsed_ms: self.elapsed_ms(),
            });
        }
        Ok(())
    }
}

/// Staged result of a successful execution.
struct Executed {
    accounts: AccountSet,
    events: Vec<DiaryEvent>,
    logs: Vec<String>,
}

/// The diary program service.
pub struct DiaryService<L: Ledger> {
    /// Service configuration.
    config: ServiceConfig,
    /// Instruction state machine.
    processor: Processor,
    /// Ledger adapter.
    ledger: Arc<L>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl<L: Ledger> DiaryService<L> {
    /// Create a new Diary Service.
    pub fn new(ledger: Arc<L>, config: ServiceConfig) -> Self {
        Self {
            processor: Processor::new(&config),
            config,
            ledger,
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The ledger this service commits to.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Diary address for `(authority, id)` under this program.
    pub fn diary_address(&self, authority: &Pubkey, id: u32) -> Result<Pubkey, DiaryError> {
        Ok(crate::domain::services::derive_diary_address(authority, id, &self.config.program_id)?.0)
    }

    #[instrument(skip(self, tx), fields(signature = %tx.id()))]
    async fn handle_transaction(&self, tx: &Transaction) -> Result<TransactionReceipt, DiaryError> {
        if let Err(e) = tx.verify() {
            warn!(error = %e, "Transaction rejected");
            self.stats.write().await.rejected_transactions += 1;
            return Err(e.into());
        }
        if let Some(ix) = tx
            .message
            .instructions
            .iter()
            .find(|ix| ix.program_id != self.config.program_id)
        {
            self.stats.write().await.rejected_transactions += 1;
            return Err(DiaryError::IncorrectProgramId(ix.program_id));
        }

        let metas = tx.message.account_keys();
        let keys: Vec<Pubkey> = metas.iter().map(|meta| meta.pubkey).collect();
        let _guard = match LockGuard::acquire(self.ledger.as_ref(), keys.clone()) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, "Account lock conflict");
                self.stats.write().await.rejected_transactions += 1;
                return Err(e.into());
            }
        };

        let start = Instant::now();
        let budget = Duration::from_millis(self.config.execution_timeout_ms);
        let deadline = Deadline::new(start, budget);
        let executed = match tokio::time::timeout(budget, self.execute(tx, &metas, deadline)).await
        {
            Ok(result) => result,
            Err(_) => Err(DiaryError::Timeout {
                elapsed_ms: deadline.elapsed_ms(),
            }),
        };
        let result = match executed {
            Ok(executed) => self.commit(tx, executed).await,
            Err(e) => Err(e),
        };

        let elapsed = start.elapsed();
        self.record_outcome(tx, &result, elapsed).await;
        result
    }

    /// Loads, executes and checks, without touching the ledger.
    async fn execute(
        &self,
        tx: &Transaction,
        metas: &[AccountMeta],
        deadline: Deadline,
    ) -> Result<Executed, DiaryError> {
        let mut accounts = AccountSet::load(self.ledger.as_ref(), metas).await?;
        let signers = tx.signed_keys();
        let mut events = Vec::with_capacity(tx.message.instructions.len());
        let mut logs = Vec::new();

        for instruction in &tx.message.instructions {
            deadline.check()?;
            let event = self
                .processor
                .process(&mut accounts, instruction, &signers, &mut logs)?;
            events.push(event);
        }
        accounts.check_lamports_conserved()?;

        Ok(Executed {
            accounts,
            events,
            logs,
        })
    }

    async fn commit(
        &self,
        tx: &Transaction,
        executed: Executed,
    ) -> Result<TransactionReceipt, DiaryError> {
        let changes = executed.accounts.into_changes();
        debug!(changed = changes.len(), "Committing account set");
        self.ledger.commit(changes).await?;

        for event in &executed.events {
            info!(event = %event.to_json(), "Diary event");
        }
        Ok(TransactionReceipt {
            signature: tx.id(),
            events: executed.events,
            logs: executed.logs,
        })
    }

    async fn record_outcome(
        &self,
        tx: &Transaction,
        result: &Result<TransactionReceipt, DiaryError>,
        elapsed: Duration,
    ) {
        let elapsed_us = elapsed.as_micros() as u64;
        {
            let mut stats = self.stats.write().await;
            stats.transactions_processed += 1;
            match result {
                Ok(receipt) => {
                    stats.successful_transactions += 1;
                    for event in &receipt.events {
                        match event {
                            DiaryEvent::DiaryCreated { .. } => stats.diaries_created += 1,
                            DiaryEvent::RecordAdded { bytes, .. } => {
                                stats.records_added += 1;
                                stats.record_bytes_written += *bytes as u64;
                            }
                            DiaryEvent::RecordWritten { len, .. } => {
                                stats.record_bytes_written += *len as u64;
                            }
                            DiaryEvent::RecordRemoved { .. } => stats.records_removed += 1,
                        }
                    }
                }
                Err(_) => stats.failed_transactions += 1,
            }
            let total = stats.transactions_processed;
            stats.avg_execution_time_us =
                (stats.avg_execution_time_us * (total - 1) + elapsed_us) / total;
        }

        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => {
                error!(error = %e, kind = e.kind(), "Transaction failed");
                e.kind()
            }
        };

        #[cfg(feature = "metrics")]
        {
            let seconds = elapsed.as_secs_f64();
            for ix in &tx.message.instructions {
                let operation = DiaryInstruction::unpack(&ix.data)
                    .map(|i| i.name())
                    .unwrap_or("invalid");
                diary_telemetry::record_operation(operation, outcome, seconds);
            }
            if let Ok(receipt) = result {
                for event in &receipt.events {
                    match event {
                        DiaryEvent::RecordAdded { bytes, .. } => {
                            diary_telemetry::record_bytes_written(*bytes as u64);
                        }
                        DiaryEvent::RecordWritten { len, .. } => {
                            diary_telemetry::record_bytes_written(*len as u64);
                        }
                        _ => {}
                    }
                }
            }
        }

        #[cfg(not(feature = "metrics"))]
        {
            let operations: Vec<&str> = tx
                .message
                .instructions
                .iter()
                .filter_map(|ix| DiaryInstruction::unpack(&ix.data).ok().map(|i| i.name()))
                .collect();
            debug!(?operations, outcome, elapsed_us, "Transaction finished");
        }
    }
}

/// Create a default service with an in-memory ledger (for testing).
#[must_use]
pub fn create_test_service() -> DiaryService<InMemoryLedger> {
    DiaryService::new(Arc::new(InMemoryLedger::new()), ServiceConfig::default())
}

// =============================================================================
// DiaryApi Implementation
// =============================================================================

#[async_trait]
impl<L: Ledger> DiaryApi for DiaryService<L> {
    async fn process_transaction(
        &self,
        tx: &Transaction,
    ) -> Result<TransactionReceipt, DiaryError> {
        self.handle_transaction(tx).await
    }

    async fn get_diary(&self, address: &Pubkey) -> Result<Diary, DiaryError> {
        let accounts =
            AccountSet::load(self.ledger.as_ref(), &[AccountMeta::new_readonly(*address, false)])
                .await?;
        DiaryStore::new(self.config.program_id, self.config.max_records).load(&accounts, address)
    }

    async fn get_record(&self, address: &Pubkey) -> Result<Record, DiaryError> {
        let accounts =
            AccountSet::load(self.ledger.as_ref(), &[AccountMeta::new_readonly(*address, false)])
                .await?;
        RecordStore::new(self.config.program_id).read_record(&accounts, address)
    }
}

// =============================================================================
// TESTS
// =============================================================================
