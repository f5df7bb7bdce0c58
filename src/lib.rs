//! Chain-following reorganization engine for the Umbra node.
//!
//! This library turns the raw state of a canonical header store — a header
//! tree whose head can jump to another branch at any time — into a
//! linearized, causally correct stream of add/remove events. Downstream
//! subsystems (wallet indexers, mempool, nullifier trees, RPC streams)
//! subscribe to the stream and keep their derived state consistent with
//! the active chain:
//!
//! - Reorganizations of arbitrary depth become an unwind of remove events
//!   followed by a rewind of add events, so every `remove` is preceded by
//!   the `add` that introduced it
//! - Delivery is acknowledged: the engine waits for every subscriber
//!   before moving its cursor, so transactional consumers are never raced
//! - Cancellation is cooperative and event-boundary atomic; a cancelled
//!   pass resumes cleanly on the next call
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use umbra_follower::{BlockHash, ChainProcessor, Header, MemoryChainStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let genesis = Header {
//!         hash: BlockHash::from_byte_array([1u8; 32]),
//!         previous_hash: BlockHash::all_zeros(),
//!         sequence: 1,
//!         timestamp: 1_700_000_000,
//!     };
//!     let store = Arc::new(MemoryChainStore::new(genesis));
//!
//!     // No initial cursor: the first pass starts from genesis.
//!     let mut processor = ChainProcessor::new(store, None).await?;
//!
//!     processor.on_add(|header| async move {
//!         println!("connected {} at {}", header.hash, header.sequence);
//!         Ok(())
//!     });
//!     processor.on_remove(|header| async move {
//!         println!("disconnected {} at {}", header.hash, header.sequence);
//!         Ok(())
//!     });
//!
//!     let shutdown = CancellationToken::new();
//!     while !shutdown.is_cancelled() {
//!         processor.advance(&shutdown).await?;
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod error;
pub mod events;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use chain::{
    find_fork, AdvanceOutcome, ChainProcessor, ChainStore, ForkPoint, MemoryChainStore, WalkBack,
    WalkForward,
};
pub use error::{
    FollowerError, HandlerError, LoggingError, LoggingResult, ProcessError, ProcessResult,
    StoreError, StoreResult,
};
pub use events::EventSink;
pub use logging::{init_console_logging, init_logging, LogFileConfig, LoggingConfig, LoggingGuard};
pub use tracing::level_filters::LevelFilter;
pub use types::{BlockHash, Cursor, Header};

/// Current version of the umbra-follower library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
