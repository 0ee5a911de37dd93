//! Record payload accounts.
//!
//! A record account is created and funded by the caller, assigned to the
//! program, and handed to the service zero-filled. The store validates that
//! capability before writing into it.

use crate::codec::{Decode, Encode};
use crate::domain::entities::{Account, Record, RECORD_HEADER_LEN};
use crate::domain::value_objects::Pubkey;
use crate::errors::{CodecError, DiaryError};
use crate::store::AccountSet;
use tracing::debug;

/// Reads and writes record payloads.
#[derive(Debug, Clone, Copy)]
pub struct RecordStore {
    program_id: Pubkey,
}

impl RecordStore {
    /// Creates a store for records owned by `program_id`.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    fn owned<'a>(&self, address: &Pubkey, account: &'a Account) -> Result<&'a Account, DiaryError> {
        if account.owner != self.program_id {
            return Err(DiaryError::IllegalOwner {
                address: *address,
                owner: account.owner,
            });
        }
        Ok(account)
    }

    fn live<'a>(
        &self,
        accounts: &'a AccountSet,
        address: &Pubkey,
    ) -> Result<&'a Account, DiaryError> {
        let account = accounts
            .get(address)?
            .filter(|a| a.is_live())
            .ok_or(DiaryError::NotFound(*address))?;
        self.owned(address, account)
    }

    /// Checks that `address` is a fresh, program-owned unit of at least
    /// `required` bytes.
    pub fn allocate(
        &self,
        accounts: &AccountSet,
        address: &Pubkey,
        required: usize,
    ) -> Result<(), DiaryError> {
        let account = self.live(accounts, address)?;
        if !account.is_zeroed() {
            return Err(DiaryError::AlreadyExists(*address));
        }
        if account.data.len() < required {
            return Err(DiaryError::InsufficientSpace {
                address: *address,
                required,
                available: account.data.len(),
            });
        }
        Ok(())
    }

    /// Writes raw bytes at `offset`, leaving the rest of the data untouched.
    pub fn write_at(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        offset: usize,
        bytes: &[u8],
    ) -> Result<(), DiaryError> {
        self.live(accounts, address)?;
        let account = accounts.get_mut(address)?;
        let end = offset.checked_add(bytes.len()).unwrap_or(usize::MAX);
        if end > account.data.len() {
            return Err(DiaryError::InsufficientSpace {
                address: *address,
                required: end,
                available: account.data.len(),
            });
        }
        account.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Replaces the account contents with `bytes`, zero-filling the tail.
    pub fn write(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        bytes: &[u8],
    ) -> Result<(), DiaryError> {
        self.write_at(accounts, address, 0, bytes)?;
        let account = accounts.get_mut(address)?;
        account.data[bytes.len()..].fill(0);
        Ok(())
    }

    /// Encodes and stores `record`. Returns the encoded size.
    pub fn write_record(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        record: &Record,
    ) -> Result<usize, DiaryError> {
        let bytes = record.encode();
        self.write(accounts, address, &bytes)?;
        Ok(bytes.len())
    }

    /// Raw account data.
    pub fn read(&self, accounts: &AccountSet, address: &Pubkey) -> Result<Vec<u8>, DiaryError> {
        Ok(self.live(accounts, address)?.data.clone())
    }

    /// Decoded record payload.
    pub fn read_record(
        &self,
        accounts: &AccountSet,
        address: &Pubkey,
    ) -> Result<Record, DiaryError> {
        let account = self.live(accounts, address)?;
        Ok(Record::decode(&account.data)?)
    }

    /// Splices `text` into the stored text at byte `offset`.
    ///
    /// A gap between the current end and `offset` is zero-padded. The result
    /// must fit the account and still be valid UTF-8; capacity is checked
    /// before any buffer grows.
    pub fn splice(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        offset: usize,
        text: &str,
    ) -> Result<Record, DiaryError> {
        let current = self.read_record(accounts, address)?;
        let available = self.live(accounts, address)?.data.len();

        let required = offset
            .checked_add(text.len())
            .map(|end| end.max(current.text.len()))
            .and_then(|len| RECORD_HEADER_LEN.checked_add(len))
            .unwrap_or(usize::MAX);
        if required > available {
            return Err(DiaryError::InsufficientSpace {
                address: *address,
                required,
                available,
            });
        }
        let end = offset + text.len();

        let mut bytes = current.text.into_bytes();
        if bytes.len() < end {
            bytes.resize(end, 0);
        }
        bytes[offset..end].copy_from_slice(text.as_bytes());

        let spliced = Record::new(
            String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?,
        );
        self.write_record(accounts, address, &spliced)?;
        Ok(spliced)
    }

    /// Zero-fills the account and sends all its lamports to `beneficiary`.
    ///
    /// The drained account is dropped from the ledger at commit.
    pub fn release(
        &self,
        accounts: &mut AccountSet,
        address: &Pubkey,
        beneficiary: &Pubkey,
    ) -> Result<u64, DiaryError> {
        let lamports = self.live(accounts, address)?.lamports;
        accounts.get_mut(address)?.data.fill(0);
        accounts.transfer(address, beneficiary, lamports)?;
        debug!(%address, %beneficiary, lamports, "Record account released");
        Ok(lamports)
    }
}

// =============================================================================
// TESTS
// =============================================================================
