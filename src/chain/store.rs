//! Header-store abstraction consumed by the follower.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{BlockHash, Header};

/// Read access to a canonical header store.
///
/// The store is a header tree with one designated canonical tip. The tip may
/// move to any stored header between calls; each individual call must return
/// a self-consistent answer, but no consistency is promised across calls —
/// absorbing that movement is the processor's job.
///
/// Directional traversal between two headers is provided by
/// [`WalkBack`](crate::chain::WalkBack) and
/// [`WalkForward`](crate::chain::WalkForward), which drive these accessors
/// one call per step.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// The genesis header. Constant for the lifetime of the store.
    fn genesis(&self) -> Header;

    /// The currently canonical tip.
    async fn head(&self) -> StoreResult<Header>;

    /// Look up a header by hash, canonical or not.
    async fn header(&self, hash: &BlockHash) -> StoreResult<Option<Header>>;

    /// Look up the canonical header at the given sequence.
    async fn header_at(&self, sequence: u64) -> StoreResult<Option<Header>>;
}
