//! # Test Fixtures
//!
//! A diary service over a fresh in-memory ledger with a funded authority.

use std::sync::Arc;

use diary_crypto::Ed25519KeyPair;
use diary_program::prelude::*;

/// Lamports per SOL.
pub const SOL: Lamports = 1_000_000_000;

/// Service, ledger and one funded authority.
pub struct DiaryHarness {
    /// Service under test.
    pub service: Arc<DiaryService<InMemoryLedger>>,
    /// Diary owner.
    pub authority: Ed25519KeyPair,
}

impl DiaryHarness {
    /// Fresh ledger; the authority holds 100 SOL.
    pub fn new() -> Self {
        Self::with_config(ServiceConfig::default())
    }

    /// Fresh ledger with a custom service configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let service = Arc::new(DiaryService::new(Arc::new(InMemoryLedger::new()), config));
        let authority = Ed25519KeyPair::generate();
        service
            .ledger()
            .airdrop(authority.public_key().into(), 100 * SOL);
        Self { service, authority }
    }

    /// Second funded keypair on the same ledger.
    pub fn funded_keypair(&self, lamports: Lamports) -> Ed25519KeyPair {
        let keypair = Ed25519KeyPair::generate();
        self.service
            .ledger()
            .airdrop(keypair.public_key().into(), lamports);
        keypair
    }

    /// Authority address.
    pub fn authority(&self) -> Pubkey {
        self.authority.public_key().into()
    }

    /// Program id the service runs.
    pub fn program(&self) -> Pubkey {
        self.service.config().program_id
    }

    /// Derived diary address for the authority.
    pub fn diary_address(&self, id: u32) -> Pubkey {
        self.service
            .diary_address(&self.authority(), id)
            .expect("derivable diary address")
    }

    /// Allocates a rent-exempt, program-owned record account of `space` bytes.
    pub fn fund_record(&self, space: usize) -> Ed25519KeyPair {
        let record = Ed25519KeyPair::generate();
        self.service
            .ledger()
            .create_account(
                &self.authority(),
                &record.public_key().into(),
                rent::minimum_balance(space),
                space,
                &self.program(),
            )
            .expect("record account funded");
        record
    }

    /// Signs and submits one instruction.
    pub async fn submit(
        &self,
        ix: Instruction,
        signers: &[&Ed25519KeyPair],
    ) -> Result<TransactionReceipt, DiaryError> {
        let tx = Transaction::from_instruction(ix, signers)?;
        self.service.process_transaction(&tx).await
    }

    /// `create_diary` signed by the authority.
    pub async fn create_diary(&self, id: u32, name: &str) -> Result<TransactionReceipt, DiaryError> {
        let ix = instruction::create_diary(&self.program(), &self.authority(), id, name)?;
        self.submit(ix, &[&self.authority]).await
    }

    /// `add_record` signed by the authority and the record.
    pub async fn add_record(
        &self,
        record: &Ed25519KeyPair,
        id: u32,
        text: &str,
    ) -> Result<TransactionReceipt, DiaryError> {
        let ix = instruction::add_record(
            &self.program(),
            &self.authority(),
            &record.public_key().into(),
            id,
            text,
        )?;
        self.submit(ix, &[&self.authority, record]).await
    }

    /// `write_record` signed by the authority.
    pub async fn write_record(
        &self,
        record: &Pubkey,
        id: u32,
        offset: u32,
        text: &str,
    ) -> Result<TransactionReceipt, DiaryError> {
        let ix = instruction::write_record(
            &self.program(),
            &self.authority(),
            record,
            id,
            offset,
            text,
        )?;
        self.submit(ix, &[&self.authority]).await
    }

    /// `remove_record` signed by the authority.
    pub async fn remove_record(
        &self,
        record: &Pubkey,
        id: u32,
    ) -> Result<TransactionReceipt, DiaryError> {
        let ix = instruction::remove_record(&self.program(), &self.authority(), record, id)?;
        self.submit(ix, &[&self.authority]).await
    }

    /// Committed diary, panicking if absent.
    pub async fn diary(&self, id: u32) -> Diary {
        self.service
            .get_diary(&self.diary_address(id))
            .await
            .expect("diary committed")
    }

    /// Committed balance of `address`.
    pub async fn balance(&self, address: &Pubkey) -> Lamports {
        self.service
            .ledger()
            .get_balance(address)
            .await
            .expect("ledger readable")
    }
}

impl Default for DiaryHarness {
    fn default() -> Self {
        Self::new()
    }
}
