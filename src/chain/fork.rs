//! Lowest-common-ancestor search between two chain positions.

use crate::chain::ChainStore;
use crate::error::StoreResult;
use crate::types::Header;

/// Result of a fork search between two headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPoint {
    /// The lowest header that is an ancestor of both positions, or `None`
    /// when the two positions belong to disjoint trees.
    pub fork: Option<Header>,

    /// True iff the fork equals one of the two positions, i.e. one is a
    /// direct ancestor of the other and no unwind is needed.
    pub is_linear: bool,
}

impl ForkPoint {
    fn disjoint() -> Self {
        Self {
            fork: None,
            is_linear: false,
        }
    }
}

/// Find the lowest common ancestor of `a` and `b`.
///
/// Levels the deeper position down to the shallower one's sequence, then
/// steps both back in lockstep until the hashes meet. A parent hash the
/// store cannot resolve means the positions cannot be joined and is
/// reported as disjoint rather than an error; the caller retries once the
/// store has converged.
pub async fn find_fork(store: &dyn ChainStore, a: &Header, b: &Header) -> StoreResult<ForkPoint> {
    let mut left = *a;
    let mut right = *b;

    while left.sequence > right.sequence {
        match store.header(&left.previous_hash).await? {
            Some(parent) => left = parent,
            None => return Ok(ForkPoint::disjoint()),
        }
    }
    while right.sequence > left.sequence {
        match store.header(&right.previous_hash).await? {
            Some(parent) => right = parent,
            None => return Ok(ForkPoint::disjoint()),
        }
    }

    loop {
        if left.hash == right.hash {
            let is_linear = left.hash == a.hash || left.hash == b.hash;
            return Ok(ForkPoint {
                fork: Some(left),
                is_linear,
            });
        }

        // Distinct headers at the lowest sequence: separate trees.
        if left.sequence <= 1 {
            return Ok(ForkPoint::disjoint());
        }

        left = match store.header(&left.previous_hash).await? {
            Some(parent) => parent,
            None => return Ok(ForkPoint::disjoint()),
        };
        right = match store.header(&right.previous_hash).await? {
            Some(parent) => parent,
            None => return Ok(ForkPoint::disjoint()),
        };
    }
}
