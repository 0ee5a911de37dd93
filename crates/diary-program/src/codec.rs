//! # Binary Codec
//!
//! Exact on-ledger byte layouts.
//!
//! | Type | Layout |
//! |------|--------|
//! | `Record` | `disc[8] ‖ u32 LE len ‖ UTF-8` |
//! | `Diary` | `disc[8] ‖ id u32 ‖ authority[32] ‖ name ‖ u32 count ‖ count × [32] ‖ bump u8` |
//!
//! Integers are fixed-width little-endian, strings are length-prefixed UTF-8.
//! Both layouts open with a non-zero discriminator, so a stored value never
//! reads back as an all-zero (unused) account.
//! Bytes after the encoded value are ignored: accounts are pre-sized and
//! zero padded.

use crate::domain::entities::{Diary, Record, DISCRIMINATOR_LEN, MAX_PERMITTED_DATA_LENGTH};
use crate::domain::services::account_discriminator;
use crate::domain::value_objects::Pubkey;
use crate::errors::CodecError;

// =============================================================================
// WRITER
// =============================================================================

/// Append-only byte writer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a writer with preallocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends one byte.
    pub fn put_u8(&mut self, v: u8) -> &mut Self {
        self.buf.push(v);
        self
    }

    /// Appends a little-endian `u32`.
    pub fn put_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Appends `bytes` verbatim.
    pub fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Appends the 32 key bytes.
    pub fn put_pubkey(&mut self, key: &Pubkey) -> &mut Self {
        self.put_raw(key.as_bytes())
    }

    /// Length-prefixed UTF-8.
    ///
    /// Callers bound string lengths well below `u32::MAX`.
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        self.put_u32(s.len() as u32);
        self.put_raw(s.as_bytes())
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

// =============================================================================
// READER
// =============================================================================

/// Bounds-checked cursor over a byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Starts reading at the beginning of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consumes the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads one byte.
    pub fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    /// Reads a little-endian `u32`.
    pub fn u32(&mut self) -> Result<u32, CodecError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a 32-byte key.
    pub fn pubkey(&mut self) -> Result<Pubkey, CodecError> {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(self.take(32)?);
        Ok(Pubkey::new(bytes))
    }

    /// Reads a length-prefixed UTF-8 string, bounded by the account size cap.
    pub fn string(&mut self) -> Result<String, CodecError> {
        let len = self.u32()? as usize;
        if len > MAX_PERMITTED_DATA_LENGTH {
            return Err(CodecError::LengthOverflow {
                len,
                max: MAX_PERMITTED_DATA_LENGTH,
            });
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Types with a fixed on-ledger layout.
pub trait Encode {
    /// Appends the encoding to `w`.
    fn encode_into(&self, w: &mut Writer);

    /// Exact size of the encoding.
    fn encoded_size(&self) -> usize;

    /// Encodes into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(self.encoded_size());
        self.encode_into(&mut w);
        w.into_inner()
    }
}

/// Types decodable from their on-ledger layout.
pub trait Decode: Sized {
    /// Reads one value at the cursor.
    fn decode_from(r: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Decodes from the start of `buf`, ignoring trailing bytes.
    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        Self::decode_from(&mut Reader::new(buf))
    }
}

/// Discriminator that prefixes every record account.
#[must_use]
pub fn record_discriminator() -> [u8; DISCRIMINATOR_LEN] {
    account_discriminator("Record")
}

fn expect_discriminator(
    r: &mut Reader<'_>,
    expected: [u8; DISCRIMINATOR_LEN],
) -> Result<(), CodecError> {
    let disc = r.take(DISCRIMINATOR_LEN)?;
    if disc != expected {
        let mut found = [0u8; DISCRIMINATOR_LEN];
        found.copy_from_slice(disc);
        return Err(CodecError::BadDiscriminator { found });
    }
    Ok(())
}

impl Encode for Record {
    fn encode_into(&self, w: &mut Writer) {
        w.put_raw(&record_discriminator()).put_str(&self.text);
    }

    fn encoded_size(&self) -> usize {
        self.encoded_len()
    }
}

impl Decode for Record {
    fn decode_from(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        expect_discriminator(r, record_discriminator())?;
        Ok(Self { text: r.string()? })
    }
}

/// Discriminator that prefixes every diary account.
#[must_use]
pub fn diary_discriminator() -> [u8; DISCRIMINATOR_LEN] {
    account_discriminator("Diary")
}

/// Returns true if `data` starts with the diary discriminator.
#[must_use]
pub fn is_diary_account(data: &[u8]) -> bool {
    data.len() >= DISCRIMINATOR_LEN && data[..DISCRIMINATOR_LEN] == diary_discriminator()
}

impl Encode for Diary {
    fn encode_into(&self, w: &mut Writer) {
        w.put_raw(&diary_discriminator())
            .put_u32(self.id)
            .put_pubkey(&self.authority)
            .put_str(&self.name)
            .put_u32(self.records.len() as u32);
        for record in &self.records {
            w.put_pubkey(record);
        }
        w.put_u8(self.bump);
    }

    fn encoded_size(&self) -> usize {
        self.encoded_len()
    }
}

impl Decode for Diary {
    fn decode_from(r: &mut Reader<'_>) -> Result<Self, CodecError> {
        expect_discriminator(r, diary_discriminator())?;

        let id = r.u32()?;
        let authority = r.pubkey()?;
        let name = r.string()?;

        let count = r.u32()? as usize;
        // Reject counts the buffer cannot possibly hold before allocating.
        if count > r.remaining() / 32 {
            return Err(CodecError::Truncated {
                offset: r.position(),
                needed: count * 32,
                available: r.remaining(),
            });
        }
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(r.pubkey()?);
        }

        let bump = r.u8()?;
        Ok(Self {
            id,
            authority,
            name,
            records,
            bump,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
