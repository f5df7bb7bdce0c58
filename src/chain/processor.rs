//! Cursor-driven reconciliation against a moving chain head.
//!
//! [`ChainProcessor`] owns a cursor marking the last header its subscribers
//! have fully acknowledged. Each [`advance`](ChainProcessor::advance) pass
//! diffs the cursor against the store's head and emits disconnects for the
//! abandoned branch followed by connects for the new one, waiting for every
//! subscriber before moving the cursor. Reorganizations of arbitrary depth
//! reduce to the same unwind-then-rewind pass.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chain::{find_fork, ChainStore, WalkBack, WalkForward};
use crate::error::{HandlerError, ProcessResult, StoreError};
use crate::events::EventSink;
use crate::types::{BlockHash, Cursor, Header};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Whether the cursor moved relative to its value when the pass began.
    pub cursor_changed: bool,
}

/// Follows the canonical chain of a [`ChainStore`], emitting acknowledged
/// add/remove events as the head moves.
///
/// The processor tracks exactly one position. `advance` is not reentrant;
/// `&mut self` serializes passes on a single instance, and callers wanting
/// parallel reconciliation create multiple processors.
pub struct ChainProcessor {
    store: Arc<dyn ChainStore>,
    cursor: Option<Cursor>,
    add_sink: EventSink<Header>,
    remove_sink: EventSink<Header>,
}

impl ChainProcessor {
    /// Create a processor over `store`.
    ///
    /// A supplied `head_hash` seeds the cursor: the caller asserts it has
    /// already observed every header from genesis up to and including that
    /// hash, so no bootstrap add events are emitted for them. The hash is
    /// resolved through the store; a hash the store does not contain is a
    /// [`StoreError::Inconsistent`].
    ///
    /// With no `head_hash` the cursor starts unseeded and the first
    /// `advance` begins by emitting the genesis header.
    pub async fn new(
        store: Arc<dyn ChainStore>,
        head_hash: Option<BlockHash>,
    ) -> ProcessResult<Self> {
        let cursor = match head_hash {
            Some(hash) => {
                let header = store.header(&hash).await?.ok_or_else(|| {
                    StoreError::Inconsistent(format!("initial cursor {} not in store", hash))
                })?;
                Some(Cursor::new(header.hash, header.sequence))
            }
            None => None,
        };

        Ok(Self {
            store,
            cursor,
            add_sink: EventSink::new(),
            remove_sink: EventSink::new(),
        })
    }

    /// Register a handler for headers connected to the canonical chain.
    pub fn on_add<F, Fut>(&mut self, handler: F)
    where
        F: Fn(Header) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.add_sink.subscribe(handler);
    }

    /// Register a handler for headers disconnected from the canonical chain.
    pub fn on_remove<F, Fut>(&mut self, handler: F)
    where
        F: Fn(Header) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.remove_sink.subscribe(handler);
    }

    /// Current cursor, or `None` before the first event.
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Hash of the current cursor position.
    pub fn cursor_hash(&self) -> Option<BlockHash> {
        self.cursor.map(|c| c.hash)
    }

    /// Sequence of the current cursor position.
    pub fn cursor_sequence(&self) -> Option<u64> {
        self.cursor.map(|c| c.sequence)
    }

    /// Run one reconciliation pass against the store's current head.
    ///
    /// Cancellation is cooperative and checked once per event, immediately
    /// before emission: a cancelled pass returns normally, the cursor
    /// reflecting the last fully acknowledged event, and the next call
    /// resumes from there. A handler failure propagates with the cursor
    /// still at its pre-emission position, so the retried pass re-emits
    /// the same event.
    pub async fn advance(
        &mut self,
        shutdown: &CancellationToken,
    ) -> ProcessResult<AdvanceOutcome> {
        let entry_hash = self.cursor_hash();

        let cursor = match self.cursor {
            Some(cursor) => cursor,
            None => match self.seed_genesis(shutdown).await? {
                Some(cursor) => cursor,
                // Cancelled before anything was emitted.
                None => return Ok(self.outcome(entry_hash)),
            },
        };

        // Sample the head exactly once and pin it for the whole pass.
        // Re-sampling would let the fork computation reference a branch the
        // rewind walk never reaches.
        let target = self.store.head().await?;
        if target.hash == cursor.hash {
            return Ok(self.outcome(entry_hash));
        }

        let current = self.store.header(&cursor.hash).await?.ok_or_else(|| {
            StoreError::Inconsistent(format!("cursor {} no longer in store", cursor.hash))
        })?;

        let fork_point = find_fork(self.store.as_ref(), &current, &target).await?;
        let Some(fork) = fork_point.fork else {
            tracing::warn!(
                "no common ancestor between cursor {} and head {}, retrying later",
                current.hash,
                target.hash
            );
            return Ok(self.outcome(entry_hash));
        };

        let reorganizing = !fork_point.is_linear;
        if reorganizing {
            let depth = current.sequence.saturating_sub(fork.sequence);
            tracing::info!(
                "reorganization started: unwinding {} headers from {} back to fork {} at sequence {}",
                depth,
                current.hash,
                fork.hash,
                fork.sequence
            );

            // Unwind: disconnect everything above the fork, newest first.
            // The fork header stays canonical and is not removed.
            let mut walk = WalkBack::new(self.store.as_ref(), current, fork.hash, false);
            while let Some(header) = walk.next().await? {
                if shutdown.is_cancelled() {
                    tracing::debug!("advance cancelled during unwind at {}", header.hash);
                    return Ok(self.outcome(entry_hash));
                }
                self.remove_sink.dispatch(&header).await?;
                self.cursor = Some(Cursor::new(header.previous_hash, header.sequence - 1));
            }
        }

        // Rewind: connect the new branch from the fork up to the pinned
        // target. The fork header is already on the chain and is skipped.
        let mut walk = WalkForward::new(self.store.as_ref(), fork, target, false);
        while let Some(header) = walk.next().await? {
            if shutdown.is_cancelled() {
                tracing::debug!("advance cancelled during rewind at {}", header.hash);
                return Ok(self.outcome(entry_hash));
            }
            self.add_sink.dispatch(&header).await?;
            self.cursor = Some(Cursor::new(header.hash, header.sequence));
        }

        if reorganizing {
            tracing::info!(
                "reorganization complete: cursor at {} (sequence {})",
                target.hash,
                target.sequence
            );
        } else {
            tracing::debug!(
                "extended to {} (sequence {})",
                target.hash,
                target.sequence
            );
        }

        Ok(self.outcome(entry_hash))
    }

    /// Emit the genesis header and seed the cursor with it.
    ///
    /// Returns `None` when cancellation was observed before emission.
    async fn seed_genesis(
        &mut self,
        shutdown: &CancellationToken,
    ) -> ProcessResult<Option<Cursor>> {
        if shutdown.is_cancelled() {
            return Ok(None);
        }
        let genesis = self.store.genesis();
        tracing::debug!("seeding cursor with genesis {}", genesis.hash);
        self.add_sink.dispatch(&genesis).await?;
        let cursor = Cursor::new(genesis.hash, genesis.sequence);
        self.cursor = Some(cursor);
        Ok(Some(cursor))
    }

    fn outcome(&self, entry_hash: Option<BlockHash>) -> AdvanceOutcome {
        AdvanceOutcome {
            cursor_changed: self.cursor_hash() != entry_hash,
        }
    }
}

impl std::fmt::Debug for ChainProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainProcessor")
            .field("cursor", &self.cursor)
            .field("add_subscribers", &self.add_sink.subscriber_count())
            .field("remove_subscribers", &self.remove_sink.subscriber_count())
            .finish()
    }
}
