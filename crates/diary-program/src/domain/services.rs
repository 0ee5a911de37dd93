//! # Domain Services
//!
//! Pure functions for the diary program: address derivation, rent and
//! type discriminators. Deterministic, no side effects.

use crate::domain::value_objects::{Lamports, Pubkey};
use crate::errors::DerivationError;
use diary_crypto::{hashv, sha256};

// =============================================================================
// PROGRAM ADDRESS DERIVATION
// =============================================================================

/// Domain tag mixed into every diary address.
pub const DIARY_SEED: &[u8] = b"diary";

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Canonical byte form of a diary id inside the derivation seeds.
///
/// The decimal numeral (`1 -> b"1"`). Every caller must go through this
/// function; any other encoding derives an unrelated address.
#[must_use]
pub fn diary_id_seed(id: u32) -> Vec<u8> {
    id.to_string().into_bytes()
}

/// Computes the program address for `seeds` plus an explicit `bump`.
///
/// Address = sha256(seeds ‖ \[bump\] ‖ `program_id` ‖ "ProgramDerivedAddress"),
/// rejected if it lies on the Ed25519 curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    if seeds.len() + 1 > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds {
            count: seeds.len() + 1,
            max: MAX_SEEDS,
        });
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(DerivationError::MaxSeedLengthExceeded {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    let bump = [bump];
    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 3);
    parts.extend_from_slice(seeds);
    parts.push(&bump);
    parts.push(program_id.as_bytes());
    parts.push(PDA_MARKER);

    let candidate = Pubkey::new(hashv(&parts));
    if candidate.is_on_curve() {
        return Err(DerivationError::InvalidSeeds);
    }
    Ok(candidate)
}

/// Finds the first off-curve program address, searching bumps from 255 down.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    for bump in (0..=u8::MAX).rev() {
        match create_program_address(seeds, bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(DerivationError::InvalidSeeds) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(DerivationError::NoViableBump)
}

/// Derives the diary address and bump for `(authority, id)`.
pub fn derive_diary_address(
    authority: &Pubkey,
    id: u32,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), DerivationError> {
    let id_seed = diary_id_seed(id);
    find_program_address(&[authority.as_bytes(), DIARY_SEED, &id_seed], program_id)
}

/// Re-derives a diary address from a stored bump in a single hash.
pub fn diary_address_with_bump(
    authority: &Pubkey,
    id: u32,
    bump: u8,
    program_id: &Pubkey,
) -> Result<Pubkey, DerivationError> {
    let id_seed = diary_id_seed(id);
    create_program_address(
        &[authority.as_bytes(), DIARY_SEED, &id_seed],
        bump,
        program_id,
    )
}

// =============================================================================
// DISCRIMINATORS
// =============================================================================

/// First 8 bytes of sha256("account:<name>").
#[must_use]
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account", name)
}

/// First 8 bytes of sha256("global:<name>").
#[must_use]
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = sha256(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

// =============================================================================
// RENT
// =============================================================================

/// Rent parameters for funding accounts.
pub mod rent {
    use super::Lamports;

    /// Bytes of per-account metadata charged on top of the data length.
    pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

    /// Lamports charged per byte-year.
    pub const LAMPORTS_PER_BYTE_YEAR: u64 = 3_480;

    /// Years of rent an account must hold to be exempt.
    pub const EXEMPTION_THRESHOLD_YEARS: u64 = 2;

    /// Minimum balance for an account of `data_len` bytes to be rent exempt.
    #[must_use]
    pub fn minimum_balance(data_len: usize) -> Lamports {
        (ACCOUNT_STORAGE_OVERHEAD + data_len as u64)
            * LAMPORTS_PER_BYTE_YEAR
            * EXEMPTION_THRESHOLD_YEARS
    }
}

// =============================================================================
// TESTS
// =============================================================================
