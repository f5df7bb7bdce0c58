//! Lazy directional walks over a header store.
//!
//! Both walks fetch one header per `next` call, so every step is a
//! suspension point at which the caller can observe cancellation. Parent
//! linkage is verified as headers are yielded; a break means the store
//! mutated underneath the walk in a way that cannot be reconciled and is
//! reported as [`StoreError::Inconsistent`].

use crate::chain::ChainStore;
use crate::error::{StoreError, StoreResult};
use crate::types::{BlockHash, Header};

/// Walks backward along parent pointers from `start` toward `stop`.
///
/// Yields `start` first. `stop` must be an ancestor of `start`; when
/// `inclusive` is false the stop header itself is not yielded. Reaching
/// genesis without encountering `stop` is an inconsistency.
pub struct WalkBack<'a> {
    store: &'a dyn ChainStore,
    next: Option<Header>,
    stop: BlockHash,
    inclusive: bool,
}

impl<'a> WalkBack<'a> {
    /// Create a backward walk from `start` down to `stop`.
    pub fn new(store: &'a dyn ChainStore, start: Header, stop: BlockHash, inclusive: bool) -> Self {
        Self {
            store,
            next: Some(start),
            stop,
            inclusive,
        }
    }

    /// The next older header, or `None` once the walk is exhausted.
    pub async fn next(&mut self) -> StoreResult<Option<Header>> {
        let Some(current) = self.next.take() else {
            return Ok(None);
        };

        if current.hash == self.stop {
            // Walk ends at the stop header; yield it only when asked to.
            return Ok(if self.inclusive {
                Some(current)
            } else {
                None
            });
        }

        if current.sequence <= 1 {
            return Err(StoreError::Inconsistent(format!(
                "walk reached genesis {} without passing stop {}",
                current.hash, self.stop
            )));
        }

        let parent = self.store.header(&current.previous_hash).await?.ok_or_else(|| {
            StoreError::Inconsistent(format!(
                "parent {} of {} missing from store",
                current.previous_hash, current.hash
            ))
        })?;

        if !current.extends(&parent) {
            return Err(StoreError::Inconsistent(format!(
                "header {} at sequence {} does not extend its parent {} at sequence {}",
                current.hash, current.sequence, parent.hash, parent.sequence
            )));
        }

        self.next = Some(parent);
        Ok(Some(current))
    }
}

/// Walks forward along the canonical chain from `start` up to `stop`.
///
/// Yields `start` first (unless `inclusive` is false) and `stop` last.
/// `stop` must be a canonical descendant of `start` at the time of the
/// walk; if the head moves to another branch mid-walk, the linkage check
/// fails and the walk errors.
pub struct WalkForward<'a> {
    store: &'a dyn ChainStore,
    last: Header,
    stop: Header,
    inclusive: bool,
    started: bool,
    done: bool,
}

impl<'a> WalkForward<'a> {
    /// Create a forward walk from `start` up to `stop`.
    pub fn new(store: &'a dyn ChainStore, start: Header, stop: Header, inclusive: bool) -> Self {
        Self {
            store,
            last: start,
            stop,
            inclusive,
            started: false,
            done: false,
        }
    }

    /// The next newer header, or `None` once the walk is exhausted.
    pub async fn next(&mut self) -> StoreResult<Option<Header>> {
        if self.done {
            return Ok(None);
        }

        if !self.started {
            self.started = true;
            if self.last.hash == self.stop.hash {
                self.done = true;
                return Ok(if self.inclusive {
                    Some(self.last)
                } else {
                    None
                });
            }
            if self.inclusive {
                return Ok(Some(self.last));
            }
        }

        if self.last.hash == self.stop.hash {
            self.done = true;
            return Ok(None);
        }

        let sequence = self.last.sequence + 1;
        let header = self.store.header_at(sequence).await?.ok_or_else(|| {
            StoreError::Inconsistent(format!("no canonical header at sequence {}", sequence))
        })?;

        if !header.extends(&self.last) {
            return Err(StoreError::Inconsistent(format!(
                "canonical header {} at sequence {} does not extend {}",
                header.hash, sequence, self.last.hash
            )));
        }

        if sequence == self.stop.sequence && header.hash != self.stop.hash {
            // A sibling replaced the stop header on the canonical chain.
            return Err(StoreError::Inconsistent(format!(
                "canonical header {} at sequence {} is not the requested stop {}",
                header.hash, sequence, self.stop.hash
            )));
        }

        if header.hash == self.stop.hash {
            self.done = true;
        }
        self.last = header;
        Ok(Some(header))
    }
}
