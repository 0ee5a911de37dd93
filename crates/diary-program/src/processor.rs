//! # Instruction Processor
//!
//! Synchronous state machine over a staged `AccountSet`.
//!
//! ```text
//! Absent ──create_diary──▶ Active ◀──add_record / write_record / remove_record──┐
//!                            └────────────────────────────────────────────────────┘
//! ```
//!
//! Every check runs before the first write to the staged set; a failing
//! instruction aborts the transaction and the service discards the set.

use crate::config::ServiceConfig;
use crate::domain::entities::{Diary, Record};
use crate::domain::services::{derive_diary_address, diary_address_with_bump};
use crate::domain::value_objects::Pubkey;
use crate::errors::DiaryError;
use crate::events::DiaryEvent;
use crate::instruction::{DiaryInstruction, Instruction};
use crate::store::{AccountSet, DiaryStore, RecordStore};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Executes diary instructions.
#[derive(Debug, Clone)]
pub struct Processor {
    program_id: Pubkey,
    max_name_length: usize,
    max_records: usize,
    diaries: DiaryStore,
    records: RecordStore,
}

impl Processor {
    /// Creates a processor bound to the configured program id and limits.
    #[must_use]
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            program_id: config.program_id,
            max_name_length: config.max_name_length,
            max_records: config.max_records,
            diaries: DiaryStore::new(config.program_id, config.max_records),
            records: RecordStore::new(config.program_id),
        }
    }

    /// Program this processor executes for.
    #[must_use]
    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// Decodes and executes one instruction against `accounts`.
    pub fn process(
        &self,
        accounts: &mut AccountSet,
        instruction: &Instruction,
        signers: &BTreeSet<Pubkey>,
        logs: &mut Vec<String>,
    ) -> Result<DiaryEvent, DiaryError> {
        if instruction.program_id != self.program_id {
            return Err(DiaryError::IncorrectProgramId(instruction.program_id));
        }
        let ix = DiaryInstruction::unpack(&instruction.data)?;

        let needed = match ix {
            DiaryInstruction::CreateDiary { .. } => 2,
            _ => 3,
        };
        if instruction.accounts.len() < needed {
            return Err(DiaryError::NotEnoughAccounts {
                expected: needed,
                actual: instruction.accounts.len(),
            });
        }
        let authority = instruction.accounts[0].pubkey;
        let diary = instruction.accounts[1].pubkey;

        logs.push(format!("Program {} invoke", self.program_id));
        logs.push(format!("Program log: Instruction: {}", ix.name()));

        let result = match ix {
            DiaryInstruction::CreateDiary { id, name } => {
                self.create_diary(accounts, signers, &authority, &diary, id, name)
            }
            DiaryInstruction::AddRecord { id, text } => {
                let record = instruction.accounts[2].pubkey;
                self.add_record(accounts, signers, &authority, &diary, &record, id, text)
            }
            DiaryInstruction::WriteRecord { id, offset, text } => {
                let record = instruction.accounts[2].pubkey;
                self.write_record(accounts, signers, &authority, &diary, &record, id, offset, &text)
            }
            DiaryInstruction::RemoveRecord { id } => {
                let record = instruction.accounts[2].pubkey;
                self.remove_record(accounts, signers, &authority, &diary, &record, id)
            }
        };

        match &result {
            Ok(_) => logs.push(format!("Program {} success", self.program_id)),
            Err(e) => logs.push(format!("Program {} failed: {e}", self.program_id)),
        }
        result
    }

    fn create_diary(
        &self,
        accounts: &mut AccountSet,
        signers: &BTreeSet<Pubkey>,
        authority: &Pubkey,
        address: &Pubkey,
        id: u32,
        name: String,
    ) -> Result<DiaryEvent, DiaryError> {
        if !signers.contains(authority) {
            return Err(DiaryError::MissingSigner(*authority));
        }
        if name.is_empty() {
            return Err(DiaryError::EmptyName);
        }
        if name.len() >= self.max_name_length {
            return Err(DiaryError::NameTooLong {
                len: name.len(),
                max: self.max_name_length,
            });
        }

        let (expected, bump) = derive_diary_address(authority, id, &self.program_id)?;
        if expected != *address {
            return Err(DiaryError::AddressMismatch {
                expected,
                actual: *address,
            });
        }

        let diary = Diary::new(id, *authority, name, bump);
        self.diaries.initialize(accounts, authority, address, &diary)?;

        debug!(%address, id, bump, "Diary created");
        Ok(DiaryEvent::DiaryCreated {
            diary: *address,
            authority: *authority,
            id,
            name: diary.name,
        })
    }

    /// Loads the diary and checks authority, signature and address.
    fn load_authorized(
        &self,
        accounts: &AccountSet,
        signers: &BTreeSet<Pubkey>,
        authority: &Pubkey,
        address: &Pubkey,
        id: u32,
    ) -> Result<Diary, DiaryError> {
        let diary = self.diaries.load(accounts, address)?;

        if diary.authority != *authority {
            warn!(%address, expected = %diary.authority, actual = %authority, "Unauthorized diary access");
            return Err(DiaryError::Unauthorized {
                expected: diary.authority,
                actual: *authority,
            });
        }
        if !signers.contains(authority) {
            return Err(DiaryError::MissingSigner(*authority));
        }

        let expected = match diary_address_with_bump(authority, id, diary.bump, &self.program_id) {
            Ok(expected) => expected,
            Err(_) => derive_diary_address(authority, id, &self.program_id)?.0,
        };
        if expected != *address {
            return Err(DiaryError::AddressMismatch {
                expected,
                actual: *address,
            });
        }
        Ok(diary)
    }

    #[allow(clippy::too_many_arguments)]
    fn add_record(
        &self,
        accounts: &mut AccountSet,
        signers: &BTreeSet<Pubkey>,
        authority: &Pubkey,
        address: &Pubkey,
        record: &Pubkey,
        id: u32,
        text: String,
    ) -> Result<DiaryEvent, DiaryError> {
        let mut diary = self.load_authorized(accounts, signers, authority, address, id)?;

        if !signers.contains(record) {
            return Err(DiaryError::MissingSigner(*record));
        }
        if diary.contains_record(record) {
            return Err(DiaryError::AlreadyExists(*record));
        }
        if diary.record_count() >= self.max_records {
            return Err(DiaryError::DiaryFull {
                max: self.max_records,
            });
        }

        let payload = Record::new(text);
        self.records.allocate(accounts, record, payload.encoded_len())?;
        let bytes = self.records.write_record(accounts, record, &payload)?;

        diary.records.push(*record);
        let index = diary.record_count() - 1;
        self.diaries.save(accounts, address, &diary)?;

        debug!(%address, %record, index, bytes, "Record added");
        Ok(DiaryEvent::RecordAdded {
            diary: *address,
            record: *record,
            index,
            bytes,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn write_record(
        &self,
        accounts: &mut AccountSet,
        signers: &BTreeSet<Pubkey>,
        authority: &Pubkey,
        address: &Pubkey,
        record: &Pubkey,
        id: u32,
        offset: u32,
        text: &str,
    ) -> Result<DiaryEvent, DiaryError> {
        let diary = self.load_authorized(accounts, signers, authority, address, id)?;
        if !diary.contains_record(record) {
            return Err(DiaryError::NotFound(*record));
        }

        self.records.splice(accounts, record, offset as usize, text)?;

        debug!(%address, %record, offset, len = text.len(), "Record written");
        Ok(DiaryEvent::RecordWritten {
            diary: *address,
            record: *record,
            offset,
            len: text.len(),
        })
    }

    fn remove_record(
        &self,
        accounts: &mut AccountSet,
        signers: &BTreeSet<Pubkey>,
        authority: &Pubkey,
        address: &Pubkey,
        record: &Pubkey,
        id: u32,
    ) -> Result<DiaryEvent, DiaryError> {
        let mut diary = self.load_authorized(accounts, signers, authority, address, id)?;
        let index = diary
            .record_index(record)
            .ok_or(DiaryError::NotFound(*record))?;

        let refunded = self.records.release(accounts, record, authority)?;
        diary.records.remove(index);
        self.diaries.save(accounts, address, &diary)?;

        debug!(%address, %record, refunded, "Record removed");
        Ok(DiaryEvent::RecordRemoved {
            diary: *address,
            record: *record,
            refunded,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
