//! # Transactions
//!
//! A message is one fee payer plus a list of instructions. Its `bincode`
//! encoding is signed with Ed25519 by every account any instruction marks
//! as a signer.

use crate::domain::value_objects::Pubkey;
use crate::errors::LedgerError;
use crate::instruction::{AccountMeta, Instruction};
use diary_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unsigned transaction body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Pays for the transaction and always signs.
    pub fee_payer: Pubkey,
    /// Executed in order, committed together.
    pub instructions: Vec<Instruction>,
}

impl Message {
    /// Bundles `instructions` under `fee_payer`.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>, fee_payer: Pubkey) -> Self {
        Self {
            fee_payer,
            instructions,
        }
    }

    /// Bytes covered by the signatures.
    pub fn serialize(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Every account the transaction touches, fee payer first, deduplicated
    /// with signer and writable flags merged.
    #[must_use]
    pub fn account_keys(&self) -> Vec<AccountMeta> {
        let mut keys = vec![AccountMeta::new(self.fee_payer, true)];
        for meta in self.instructions.iter().flat_map(|ix| &ix.accounts) {
            match keys.iter_mut().find(|k| k.pubkey == meta.pubkey) {
                Some(existing) => {
                    existing.is_signer |= meta.is_signer;
                    existing.is_writable |= meta.is_writable;
                }
                None => keys.push(meta.clone()),
            }
        }
        keys
    }

    /// Accounts whose signature is required.
    #[must_use]
    pub fn signer_keys(&self) -> Vec<Pubkey> {
        self.account_keys()
            .into_iter()
            .filter(|k| k.is_signer)
            .map(|k| k.pubkey)
            .collect()
    }
}

/// A message plus signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Signed body.
    pub message: Message,
    /// One signature per signing key over the serialized message.
    pub signatures: Vec<(Pubkey, Ed25519Signature)>,
}

impl Transaction {
    /// Signs `message` with every keypair in `signers`.
    pub fn new_signed(message: Message, signers: &[&Ed25519KeyPair]) -> Result<Self, LedgerError> {
        let bytes = message.serialize()?;
        let signatures = signers
            .iter()
            .map(|kp| (Pubkey::from(kp.public_key()), kp.sign(&bytes)))
            .collect();
        Ok(Self {
            message,
            signatures,
        })
    }

    /// Single-instruction convenience, fee paid by the first signer.
    pub fn from_instruction(
        instruction: Instruction,
        signers: &[&Ed25519KeyPair],
    ) -> Result<Self, LedgerError> {
        let fee_payer = signers
            .first()
            .map(|kp| Pubkey::from(kp.public_key()))
            .ok_or(LedgerError::MissingSignature(Pubkey::ZERO))?;
        Self::new_signed(Message::new(vec![instruction], fee_payer), signers)
    }

    /// Checks that every required signer signed and every signature verifies.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let bytes = self.message.serialize()?;
        for (pubkey, signature) in &self.signatures {
            let key = Ed25519PublicKey::from_bytes(pubkey.0)
                .map_err(|_| LedgerError::SignatureVerificationFailed(*pubkey))?;
            key.verify(&bytes, signature)
                .map_err(|_| LedgerError::SignatureVerificationFailed(*pubkey))?;
        }

        let signed = self.signed_keys();
        if let Some(missing) = self
            .message
            .signer_keys()
            .into_iter()
            .find(|k| !signed.contains(k))
        {
            return Err(LedgerError::MissingSignature(missing));
        }
        Ok(())
    }

    /// Keys that attached a signature.
    #[must_use]
    pub fn signed_keys(&self) -> BTreeSet<Pubkey> {
        self.signatures.iter().map(|(k, _)| *k).collect()
    }

    /// Hex of the first signature; empty if unsigned.
    #[must_use]
    pub fn id(&self) -> String {
        self.signatures
            .first()
            .map(|(_, sig)| hex::encode(sig.as_bytes()))
            .unwrap_or_default()
    }
}

// =============================================================================
// TESTS
// =============================================================================
