//! In-memory header store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::chain::ChainStore;
use crate::error::{StoreError, StoreResult};
use crate::types::{BlockHash, Header};

/// In-memory, branch-capable header store.
///
/// Keeps every inserted header in a tree keyed by hash and maintains a
/// canonical index for whichever branch the head currently points at. The
/// head can be re-pointed to any stored header, which is how tests and
/// embedders exercise reorganizations.
pub struct MemoryChainStore {
    genesis: Header,
    inner: RwLock<Inner>,
}

struct Inner {
    /// Every known header, canonical or not.
    headers: HashMap<BlockHash, Header>,
    /// Canonical branch, index = sequence - 1.
    canonical: Vec<BlockHash>,
    /// Hash of the canonical tip.
    head: BlockHash,
}

impl MemoryChainStore {
    /// Create a store containing only `genesis`, which is also the head.
    pub fn new(genesis: Header) -> Self {
        let mut headers = HashMap::new();
        headers.insert(genesis.hash, genesis);
        Self {
            genesis,
            inner: RwLock::new(Inner {
                headers,
                canonical: vec![genesis.hash],
                head: genesis.hash,
            }),
        }
    }

    /// Insert a header without moving the head.
    ///
    /// The parent must already be stored and the sequence must follow it.
    pub async fn insert(&self, header: Header) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let parent = inner.headers.get(&header.previous_hash).ok_or_else(|| {
            StoreError::Inconsistent(format!(
                "parent {} of {} not stored",
                header.previous_hash, header.hash
            ))
        })?;
        if !header.extends(parent) {
            return Err(StoreError::Inconsistent(format!(
                "header {} at sequence {} does not extend parent at sequence {}",
                header.hash, header.sequence, parent.sequence
            )));
        }
        inner.headers.insert(header.hash, header);
        Ok(())
    }

    /// Insert a header and make it the canonical head.
    pub async fn add_head(&self, header: Header) -> StoreResult<()> {
        self.insert(header).await?;
        self.set_head(&header.hash).await
    }

    /// Re-point the head at a stored header, rebuilding the canonical index
    /// by walking parent pointers back to genesis.
    pub async fn set_head(&self, hash: &BlockHash) -> StoreResult<()> {
        let mut inner = self.inner.write().await;

        let mut branch = Vec::new();
        let mut cursor = *hash;
        loop {
            let header = inner.headers.get(&cursor).ok_or_else(|| {
                StoreError::Inconsistent(format!("header {} not stored", cursor))
            })?;
            branch.push(header.hash);
            if header.hash == self.genesis.hash {
                break;
            }
            cursor = header.previous_hash;
        }
        branch.reverse();

        inner.canonical = branch;
        inner.head = *hash;
        Ok(())
    }

    /// Number of stored headers across all branches.
    pub async fn len(&self) -> usize {
        self.inner.read().await.headers.len()
    }

    /// Whether the store holds the given header on any branch.
    pub async fn contains(&self, hash: &BlockHash) -> bool {
        self.inner.read().await.headers.contains_key(hash)
    }
}

#[async_trait]
impl ChainStore for MemoryChainStore {
    fn genesis(&self) -> Header {
        self.genesis
    }

    async fn head(&self) -> StoreResult<Header> {
        let inner = self.inner.read().await;
        inner.headers.get(&inner.head).copied().ok_or_else(|| {
            StoreError::Inconsistent(format!("head {} not stored", inner.head))
        })
    }

    async fn header(&self, hash: &BlockHash) -> StoreResult<Option<Header>> {
        Ok(self.inner.read().await.headers.get(hash).copied())
    }

    async fn header_at(&self, sequence: u64) -> StoreResult<Option<Header>> {
        if sequence == 0 {
            return Ok(None);
        }
        let inner = self.inner.read().await;
        let Some(hash) = inner.canonical.get((sequence - 1) as usize) else {
            return Ok(None);
        };
        inner
            .headers
            .get(hash)
            .copied()
            .map(Some)
            .ok_or_else(|| StoreError::Inconsistent(format!("canonical header {} not stored", hash)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hash(branch: u8, sequence: u64) -> BlockHash {
        let mut bytes = [0u8; 32];
        bytes[0] = branch;
        bytes[1..9].copy_from_slice(&sequence.to_le_bytes());
        BlockHash::from_byte_array(bytes)
    }

    fn genesis_header() -> Header {
        Header {
            hash: test_hash(0, 1),
            previous_hash: BlockHash::all_zeros(),
            sequence: 1,
            timestamp: 1_700_000_000,
        }
    }

    fn child_header(parent: &Header, branch: u8) -> Header {
        Header {
            hash: test_hash(branch, parent.sequence + 1),
            previous_hash: parent.hash,
            sequence: parent.sequence + 1,
            timestamp: parent.timestamp + 75,
        }
    }

    #[tokio::test]
    async fn test_new_store_head_is_genesis() {
        let genesis = genesis_header();
        let store = MemoryChainStore::new(genesis);

        assert_eq!(store.head().await.unwrap(), genesis);
        assert_eq!(store.header_at(1).await.unwrap().unwrap(), genesis);
        assert_eq!(store.header_at(2).await.unwrap(), None);
        assert_eq!(store.header_at(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_requires_stored_parent() {
        let genesis = genesis_header();
        let store = MemoryChainStore::new(genesis);

        let orphan = Header {
            hash: test_hash(5, 3),
            previous_hash: test_hash(5, 2),
            sequence: 3,
            timestamp: 0,
        };
        assert!(store.insert(orphan).await.is_err());
    }

    #[tokio::test]
    async fn test_set_head_rebuilds_canonical_index() {
        let genesis = genesis_header();
        let store = MemoryChainStore::new(genesis);

        let a1 = child_header(&genesis, 1);
        let a2 = child_header(&a1, 1);
        let b1 = child_header(&genesis, 2);
        let b2 = child_header(&b1, 2);
        let b3 = child_header(&b2, 2);

        store.add_head(a1).await.unwrap();
        store.add_head(a2).await.unwrap();
        assert_eq!(store.header_at(2).await.unwrap().unwrap(), a1);

        for header in [b1, b2, b3] {
            store.insert(header).await.unwrap();
        }
        store.set_head(&b3.hash).await.unwrap();

        assert_eq!(store.head().await.unwrap(), b3);
        assert_eq!(store.header_at(2).await.unwrap().unwrap(), b1);
        assert_eq!(store.header_at(3).await.unwrap().unwrap(), b2);
        assert_eq!(store.header_at(4).await.unwrap().unwrap(), b3);

        // The abandoned branch is still stored and addressable by hash.
        assert!(store.contains(&a2.hash).await);
        assert_eq!(store.header(&a1.hash).await.unwrap().unwrap(), a1);
    }

    #[tokio::test]
    async fn test_set_head_rejects_unknown_hash() {
        let store = MemoryChainStore::new(genesis_header());
        assert!(store.set_head(&test_hash(9, 9)).await.is_err());
    }
}
