//! # Instructions
//!
//! Wire format: `discriminator[8] ‖ args`, where the discriminator is
//! `sha256("global:<snake_name>")[..8]` and args are little-endian, strings
//! length-prefixed.
//!
//! | Instruction | Args | Accounts |
//! |-------------|------|----------|
//! | `create_diary` | `id u32, name` | authority (s, w), diary (w) |
//! | `add_record` | `id u32, text` | authority (s, w), diary (w), record (s, w) |
//! | `write_record` | `id u32, offset u32, text` | authority (s, w), diary (w), record (w) |
//! | `remove_record` | `id u32` | authority (s, w), diary (w), record (w) |

use crate::codec::{Reader, Writer};
use crate::domain::services::{derive_diary_address, instruction_discriminator};
use crate::domain::value_objects::Pubkey;
use crate::errors::{CodecError, DerivationError, DiaryError};
use serde::{Deserialize, Serialize};

// =============================================================================
// INSTRUCTION DATA
// =============================================================================

/// Operations understood by the diary program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiaryInstruction {
    /// Create an empty diary at the derived address.
    CreateDiary {
        /// Derivation id.
        id: u32,
        /// Display name.
        name: String,
    },
    /// Write `text` into a fresh record account and reference it.
    AddRecord {
        /// Diary id.
        id: u32,
        /// Initial record text.
        text: String,
    },
    /// Splice `text` into a referenced record at byte `offset`.
    WriteRecord {
        /// Diary id.
        id: u32,
        /// Byte offset into the stored text.
        offset: u32,
        /// Bytes to splice in.
        text: String,
    },
    /// Release a referenced record and drop the reference.
    RemoveRecord {
        /// Diary id.
        id: u32,
    },
}

impl DiaryInstruction {
    /// Snake-case name, also the discriminator preimage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateDiary { .. } => "create_diary",
            Self::AddRecord { .. } => "add_record",
            Self::WriteRecord { .. } => "write_record",
            Self::RemoveRecord { .. } => "remove_record",
        }
    }

    /// Target diary id.
    #[must_use]
    pub fn diary_id(&self) -> u32 {
        match self {
            Self::CreateDiary { id, .. }
            | Self::AddRecord { id, .. }
            | Self::WriteRecord { id, .. }
            | Self::RemoveRecord { id } => *id,
        }
    }

    /// Serializes to instruction data.
    #[must_use]
    pub fn pack(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(32);
        w.put_raw(&instruction_discriminator(self.name()));
        match self {
            Self::CreateDiary { id, name } => {
                w.put_u32(*id).put_str(name);
            }
            Self::AddRecord { id, text } => {
                w.put_u32(*id).put_str(text);
            }
            Self::WriteRecord { id, offset, text } => {
                w.put_u32(*id).put_u32(*offset).put_str(text);
            }
            Self::RemoveRecord { id } => {
                w.put_u32(*id);
            }
        }
        w.into_inner()
    }

    /// Parses instruction data.
    pub fn unpack(data: &[u8]) -> Result<Self, DiaryError> {
        let mut r = Reader::new(data);
        let tag = r.take(8).map_err(invalid)?;

        let ix = if tag == instruction_discriminator("create_diary") {
            Self::CreateDiary {
                id: r.u32().map_err(invalid)?,
                name: r.string().map_err(invalid)?,
            }
        } else if tag == instruction_discriminator("add_record") {
            Self::AddRecord {
                id: r.u32().map_err(invalid)?,
                text: r.string().map_err(invalid)?,
            }
        } else if tag == instruction_discriminator("write_record") {
            Self::WriteRecord {
                id: r.u32().map_err(invalid)?,
                offset: r.u32().map_err(invalid)?,
                text: r.string().map_err(invalid)?,
            }
        } else if tag == instruction_discriminator("remove_record") {
            Self::RemoveRecord {
                id: r.u32().map_err(invalid)?,
            }
        } else {
            return Err(DiaryError::InvalidInstruction(format!(
                "unknown discriminator {}",
                hex::encode(tag)
            )));
        };

        if r.remaining() != 0 {
            return Err(DiaryError::InvalidInstruction(format!(
                "{} trailing bytes",
                r.remaining()
            )));
        }
        Ok(ix)
    }
}

fn invalid(e: CodecError) -> DiaryError {
    DiaryError::InvalidInstruction(e.to_string())
}

// =============================================================================
// INSTRUCTION ENVELOPE
// =============================================================================

/// An account referenced by an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    /// Account address.
    pub pubkey: Pubkey,
    /// The transaction must carry this account's signature.
    pub is_signer: bool,
    /// Instructions may modify the account; enforced while executing.
    pub is_writable: bool,
}

impl AccountMeta {
    /// Writable account.
    #[must_use]
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// Read-only account.
    #[must_use]
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A program invocation: target program, declared accounts, packed data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    /// Program that executes the instruction.
    pub program_id: Pubkey,
    /// Accounts in the order the program expects them.
    pub accounts: Vec<AccountMeta>,
    /// Packed `DiaryInstruction`.
    pub data: Vec<u8>,
}

impl Instruction {
    /// Packs `ix` for `program_id`.
    #[must_use]
    pub fn new(program_id: Pubkey, ix: &DiaryInstruction, accounts: Vec<AccountMeta>) -> Self {
        Self {
            program_id,
            accounts,
            data: ix.pack(),
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// `create_diary` against the derived diary address.
pub fn create_diary(
    program_id: &Pubkey,
    authority: &Pubkey,
    id: u32,
    name: impl Into<String>,
) -> Result<Instruction, DerivationError> {
    let (diary, _) = derive_diary_address(authority, id, program_id)?;
    Ok(Instruction::new(
        *program_id,
        &DiaryInstruction::CreateDiary {
            id,
            name: name.into(),
        },
        vec![AccountMeta::new(*authority, true), AccountMeta::new(diary, false)],
    ))
}

/// `add_record`; `record` must sign.
pub fn add_record(
    program_id: &Pubkey,
    authority: &Pubkey,
    record: &Pubkey,
    id: u32,
    text: impl Into<String>,
) -> Result<Instruction, DerivationError> {
    let (diary, _) = derive_diary_address(authority, id, program_id)?;
    Ok(Instruction::new(
        *program_id,
        &DiaryInstruction::AddRecord {
            id,
            text: text.into(),
        },
        vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(diary, false),
            AccountMeta::new(*record, true),
        ],
    ))
}

/// `write_record` at byte `offset`.
pub fn write_record(
    program_id: &Pubkey,
    authority: &Pubkey,
    record: &Pubkey,
    id: u32,
    offset: u32,
    text: impl Into<String>,
) -> Result<Instruction, DerivationError> {
    let (diary, _) = derive_diary_address(authority, id, program_id)?;
    Ok(Instruction::new(
        *program_id,
        &DiaryInstruction::WriteRecord {
            id,
            offset,
            text: text.into(),
        },
        vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(diary, false),
            AccountMeta::new(*record, false),
        ],
    ))
}

/// `remove_record`; lamports go back to `authority`.
pub fn remove_record(
    program_id: &Pubkey,
    authority: &Pubkey,
    record: &Pubkey,
    id: u32,
) -> Result<Instruction, DerivationError> {
    let (diary, _) = derive_diary_address(authority, id, program_id)?;
    Ok(Instruction::new(
        *program_id,
        &DiaryInstruction::RemoveRecord { id },
        vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new(diary, false),
            AccountMeta::new(*record, false),
        ],
    ))
}

// =============================================================================
// TESTS
// =============================================================================
