//! Common type definitions for the chain follower.

use serde::{Deserialize, Serialize};

/// 32-byte block identifier.
///
/// Equality is bytewise; the engine never interprets the contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Construct a hash from its raw bytes.
    pub const fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The all-zero hash, used as the previous-hash sentinel of genesis.
    pub const fn all_zeros() -> Self {
        Self([0u8; 32])
    }

    /// The raw bytes of this hash.
    pub const fn to_byte_array(self) -> [u8; 32] {
        self.0
    }

    /// Borrow the raw bytes of this hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockHash({})", self)
    }
}

/// Block header as seen by the follower.
///
/// The engine reads `hash`, `previous_hash` and `sequence`; everything else
/// is payload it carries through to subscribers untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Identifier of this header.
    pub hash: BlockHash,

    /// Identifier of the parent header (all zeros for genesis).
    pub previous_hash: BlockHash,

    /// Position on the chain. Genesis is 1.
    pub sequence: u64,

    /// Unix timestamp claimed by the producer.
    pub timestamp: u64,
}

impl Header {
    /// Whether this header is a direct child of `parent`.
    pub fn extends(&self, parent: &Header) -> bool {
        self.previous_hash == parent.hash && self.sequence == parent.sequence + 1
    }
}

/// The follower's recorded position on the canonical chain.
///
/// The processor holds `Option<Cursor>`; `None` means no events have been
/// emitted yet. Serializable so embedders can persist it across restarts
/// and hand it back at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Hash of the last fully acknowledged header.
    pub hash: BlockHash,

    /// Sequence of the last fully acknowledged header.
    pub sequence: u64,
}

impl Cursor {
    /// Create a cursor at the given position.
    pub fn new(hash: BlockHash, sequence: u64) -> Self {
        Self {
            hash,
            sequence,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.hash, self.sequence)
    }
}
