//! Chain following with reorganization support.
//!
//! This module contains the pieces that turn a mutable header store into a
//! linear event stream:
//! - the [`ChainStore`] read abstraction
//! - lazy directional walks between two headers
//! - lowest-common-ancestor search for fork handling
//! - the [`ChainProcessor`] that diffs a cursor against the head and emits
//!   acknowledged add/remove events

pub mod fork;
pub mod memory;
pub mod processor;
pub mod store;
pub mod walk;


pub use fork::{find_fork, ForkPoint};
pub use memory::MemoryChainStore;
pub use processor::{AdvanceOutcome, ChainProcessor};
pub use store::ChainStore;
pub use walk::{WalkBack, WalkForward};
