//! Event delivery for chain follower subscribers.
//!
//! Downstream consumers (wallet indexers, mempool, nullifier trees) register
//! handlers on an `EventSink`. Dispatch is acknowledged and ordered: handlers
//! run in registration order and each must complete before the next starts,
//! so a subscriber maintaining transactional state is never raced past.

use std::future::Future;

use futures::future::BoxFuture;

use crate::error::HandlerError;

type Handler<T> = Box<dyn Fn(T) -> BoxFuture<'static, std::result::Result<(), HandlerError>> + Send + Sync>;

/// Ordered, acknowledged event dispatch to registered handlers.
///
/// Unlike a broadcast channel, `dispatch` does not return until every
/// handler has acknowledged the event. The first handler failure
/// short-circuits the rest.
pub struct EventSink<T> {
    handlers: Vec<Handler<T>>,
}

impl<T: Clone + Send + 'static> EventSink<T> {
    /// Create a sink with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler. Handlers are invoked in registration order.
    pub fn subscribe<F, Fut>(&mut self, handler: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        self.handlers.push(Box::new(move |event| Box::pin(handler(event))));
    }

    /// Deliver an event to every handler, awaiting each acknowledgment.
    ///
    /// Returns the first handler failure; handlers registered after the
    /// failing one are not invoked for this event.
    pub async fn dispatch(&self, event: &T) -> std::result::Result<(), HandlerError> {
        for handler in &self.handlers {
            handler(event.clone()).await?;
        }
        Ok(())
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl<T: Clone + Send + 'static> Default for EventSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventSink<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink").field("handlers", &self.handlers.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_dispatch_without_subscribers() {
        let sink: EventSink<u32> = EventSink::new();
        sink.dispatch(&7).await.unwrap();
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let mut sink: EventSink<u32> = EventSink::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            sink.subscribe(move |event| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().unwrap().push((tag, event));
                    Ok(())
                }
            });
        }

        sink.dispatch(&1).await.unwrap();
        sink.dispatch(&2).await.unwrap();

        let seen = order.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                ("first", 1),
                ("second", 1),
                ("third", 1),
                ("first", 2),
                ("second", 2),
                ("third", 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_short_circuits_later_handlers() {
        let mut sink: EventSink<u32> = EventSink::new();
        let later_calls = Arc::new(AtomicUsize::new(0));

        sink.subscribe(|_| async { Err(HandlerError::failed("index full")) });

        let later = Arc::clone(&later_calls);
        sink.subscribe(move |_| {
            let later = Arc::clone(&later);
            async move {
                later.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = sink.dispatch(&9).await.unwrap_err();
        assert!(err.to_string().contains("index full"));
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }
}
