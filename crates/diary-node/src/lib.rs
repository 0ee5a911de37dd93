//! # Diary Node
//!
//! Wires `DiaryService` to an in-memory ledger and replays the reference
//! diary lifecycle against it.
//!
//! ## Scenario
//!
//! ```text
//! airdrop ──▶ create_diary ──▶ fund record ──▶ add_record ──▶ remove_record
//!                  │                               │               │
//!                  ▼                               ▼               ▼
//!           diary.id == id                 record.text == text   record gone,
//!                                                               diary.id == id
//! ```

pub mod config;

pub use config::{NodeConfig, NodeConfigError};

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use diary_crypto::Ed25519KeyPair;
use diary_program::prelude::*;
use serde::Serialize;
use tracing::info;

/// What a scenario run committed.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Authority that owns the diary.
    pub authority: Pubkey,
    /// Derived diary address.
    pub diary: Pubkey,
    /// Record account that was added and removed.
    pub record: Pubkey,
    /// Receipts in submission order.
    pub receipts: Vec<TransactionReceipt>,
    /// Authority balance after the run.
    pub final_balance: Lamports,
}

/// The diary node runtime.
pub struct DiaryNode {
    config: NodeConfig,
    service: DiaryService<InMemoryLedger>,
    authority: Ed25519KeyPair,
}

impl DiaryNode {
    /// Build the service and fund the authority.
    pub fn bootstrap(config: NodeConfig) -> Result<Self> {
        config
            .service
            .validate()
            .context("Invalid service configuration")?;

        let authority = match config.authority_seed {
            Some(seed) => Ed25519KeyPair::from_seed(seed),
            None => Ed25519KeyPair::generate(),
        };

        let ledger = Arc::new(InMemoryLedger::new());
        ledger.airdrop(authority.public_key().into(), config.airdrop_lamports);
        let service = DiaryService::new(ledger, config.service.clone());

        info!(
            authority = %Pubkey::from(authority.public_key()),
            program_id = %config.service.program_id,
            lamports = config.airdrop_lamports,
            "Diary node bootstrapped"
        );

        Ok(Self {
            config,
            service,
            authority,
        })
    }

    /// The running service.
    pub fn service(&self) -> &DiaryService<InMemoryLedger> {
        &self.service
    }

    /// The authority's address.
    pub fn authority(&self) -> Pubkey {
        self.authority.public_key().into()
    }

    /// Create a diary, add a record, read it back, remove it.
    pub async fn run_scenario(&self) -> Result<ScenarioReport> {
        let program_id = self.config.service.program_id;
        let authority = self.authority();
        let id = self.config.diary_id;
        let mut receipts = Vec::with_capacity(3);

        // Step 1: create the diary
        let ix = instruction::create_diary(&program_id, &authority, id, &*self.config.diary_name)?;
        receipts.push(self.submit(ix, &[&self.authority]).await.context("create_diary failed")?);

        let diary = self.service.diary_address(&authority, id)?;
        let state = self.service.get_diary(&diary).await?;
        ensure!(state.id == id, "diary id {} != {}", state.id, id);
        ensure!(state.records.is_empty(), "new diary has records");
        info!(%diary, id, name = %state.name, "Diary created");

        // Step 2: fund a record account and add the record
        let record_key = Ed25519KeyPair::generate();
        let record = Pubkey::from(record_key.public_key());
        self.service
            .ledger()
            .create_account(
                &authority,
                &record,
                rent::minimum_balance(self.config.record_space),
                self.config.record_space,
                &program_id,
            )
            .context("Failed to fund record account")?;

        let ix = instruction::add_record(
            &program_id,
            &authority,
            &record,
            id,
            &*self.config.record_text,
        )?;
        receipts.push(
            self.submit(ix, &[&self.authority, &record_key])
                .await
                .context("add_record failed")?,
        );

        let stored = self.service.get_record(&record).await?;
        ensure!(
            stored.text == self.config.record_text,
            "record text {:?} != {:?}",
            stored.text,
            self.config.record_text
        );
        info!(%record, bytes = stored.encoded_len(), "Record added");

        // Step 3: remove it again
        let ix = instruction::remove_record(&program_id, &authority, &record, id)?;
        receipts.push(self.submit(ix, &[&self.authority]).await.context("remove_record failed")?);

        let state = self.service.get_diary(&diary).await?;
        ensure!(state.id == id, "diary id {} != {}", state.id, id);
        ensure!(!state.contains_record(&record), "record still referenced");
        ensure!(
            !self.service.ledger().account_exists(&record).await?,
            "record account still allocated"
        );
        info!(%record, "Record removed");

        Ok(ScenarioReport {
            authority,
            diary,
            record,
            receipts,
            final_balance: self.service.ledger().get_balance(&authority).await?,
        })
    }

    async fn submit(
        &self,
        ix: Instruction,
        signers: &[&Ed25519KeyPair],
    ) -> Result<TransactionReceipt, DiaryError> {
        let tx = Transaction::from_instruction(ix, signers)?;
        self.service.process_transaction(&tx).await
    }
}
