//! # Diary Events
//!
//! One event per successfully executed instruction, returned in the
//! transaction receipt and logged as JSON.

use crate::domain::value_objects::Pubkey;
use serde::{Deserialize, Serialize};

/// Effect of a committed instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiaryEvent {
    /// A diary was created.
    DiaryCreated {
        /// Derived diary address.
        diary: Pubkey,
        /// Stored authority.
        authority: Pubkey,
        /// Derivation id.
        id: u32,
        /// Display name.
        name: String,
    },
    /// A record was written and referenced.
    RecordAdded {
        /// Owning diary.
        diary: Pubkey,
        /// Record account.
        record: Pubkey,
        /// Position in the diary's record list.
        index: usize,
        /// Encoded bytes written.
        bytes: usize,
    },
    /// A referenced record was spliced.
    RecordWritten {
        /// Owning diary.
        diary: Pubkey,
        /// Record account.
        record: Pubkey,
        /// Byte offset into the text.
        offset: u32,
        /// Bytes spliced in.
        len: usize,
    },
    /// A record was released and unreferenced.
    RecordRemoved {
        /// Owning diary.
        diary: Pubkey,
        /// Released record account.
        record: Pubkey,
        /// Lamports returned to the authority.
        refunded: u64,
    },
}

impl DiaryEvent {
    /// Event name, also used as the metric operation label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DiaryCreated { .. } => "diary_created",
            Self::RecordAdded { .. } => "record_added",
            Self::RecordWritten { .. } => "record_written",
            Self::RecordRemoved { .. } => "record_removed",
        }
    }

    /// The diary this event belongs to.
    #[must_use]
    pub fn diary(&self) -> &Pubkey {
        match self {
            Self::DiaryCreated { diary, .. }
            | Self::RecordAdded { diary, .. }
            | Self::RecordWritten { diary, .. }
            | Self::RecordRemoved { diary, .. } => diary,
        }
    }

    /// JSON form for structured logs.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"type\":\"{}\"}}", self.kind()))
    }
}
