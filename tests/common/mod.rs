//! Shared helpers for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use umbra_follower::{BlockHash, ChainProcessor, Header, MemoryChainStore};

/// Deterministic hash for a (branch, sequence) pair.
pub fn test_hash(branch: u8, sequence: u64) -> BlockHash {
    let mut bytes = [0u8; 32];
    bytes[0] = branch;
    bytes[1..9].copy_from_slice(&sequence.to_le_bytes());
    BlockHash::from_byte_array(bytes)
}

pub fn genesis_header() -> Header {
    Header {
        hash: test_hash(0, 1),
        previous_hash: BlockHash::all_zeros(),
        sequence: 1,
        timestamp: 1_700_000_000,
    }
}

pub fn child_header(parent: &Header, branch: u8) -> Header {
    Header {
        hash: test_hash(branch, parent.sequence + 1),
        previous_hash: parent.hash,
        sequence: parent.sequence + 1,
        timestamp: parent.timestamp + 75,
    }
}

/// Insert `len` headers extending `parent` on `branch`, making the last one
/// the head, and return them.
pub async fn grow_branch(
    store: &MemoryChainStore,
    parent: &Header,
    branch: u8,
    len: usize,
) -> Vec<Header> {
    let mut headers = Vec::with_capacity(len);
    let mut tip = *parent;
    for _ in 0..len {
        tip = child_header(&tip, branch);
        store.insert(tip).await.unwrap();
        headers.push(tip);
    }
    store.set_head(&tip.hash).await.unwrap();
    headers
}

/// Every event a processor emitted, in order.
pub type EventLog = Arc<Mutex<Vec<(&'static str, Header)>>>;

/// Subscribe recording handlers on both sinks.
pub fn record_events(processor: &mut ChainProcessor) -> EventLog {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));

    let adds = Arc::clone(&log);
    processor.on_add(move |header| {
        let adds = Arc::clone(&adds);
        async move {
            adds.lock().unwrap().push(("add", header));
            Ok(())
        }
    });

    let removes = Arc::clone(&log);
    processor.on_remove(move |header| {
        let removes = Arc::clone(&removes);
        async move {
            removes.lock().unwrap().push(("remove", header));
            Ok(())
        }
    });

    log
}

/// Replay an event log onto an empty set of headers.
///
/// Panics when a remove has no matching prior add, which is exactly the
/// causal ordering the engine guarantees.
pub fn replay(log: &EventLog) -> Vec<Header> {
    let mut on_chain: Vec<Header> = Vec::new();
    for (kind, header) in log.lock().unwrap().iter() {
        match *kind {
            "add" => {
                assert!(
                    !on_chain.iter().any(|h| h.hash == header.hash),
                    "add of {} while already on chain",
                    header.hash
                );
                on_chain.push(*header);
            }
            "remove" => {
                let position = on_chain
                    .iter()
                    .position(|h| h.hash == header.hash)
                    .unwrap_or_else(|| panic!("remove of {} before its add", header.hash));
                on_chain.remove(position);
            }
            other => panic!("unknown event kind {}", other),
        }
    }
    on_chain
}
