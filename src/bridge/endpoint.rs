use crate::bridge::accept_query;
use crate::bridge::bus::MessageBus;
use crate::bridge::message::{BridgeMessage, Envelope};
use crate::fiber::{QueryResult, Resolver};
use headless_chrome::Tab;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Answers a coordinate query; runs on a blocking thread
pub trait QueryHandler: Send + Sync + 'static {
    fn handle(&self, x: f64, y: f64) -> QueryResult;
}

/// [`QueryHandler`] that resolves against a live tab
pub struct TabResolver {
    tab: Arc<Tab>,
    resolver: Resolver,
}

impl TabResolver {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab, resolver: Resolver::new() }
    }
}

impl QueryHandler for TabResolver {
    fn handle(&self, x: f64, y: f64) -> QueryResult {
        self.resolver.resolve(&self.tab, x, y)
    }
}

/// Resolver side of the bridge: answers each trusted query with one result
pub struct ResolverEndpoint<H: QueryHandler> {
    bus: MessageBus,
    receiver: broadcast::Receiver<Envelope>,
    handler: Arc<H>,
}

impl<H: QueryHandler> ResolverEndpoint<H> {
    /// Subscribes immediately, so queries posted before [`run`](Self::run) is polled are kept
    pub fn new(bus: MessageBus, handler: H) -> Self {
        let receiver = bus.subscribe();
        Self { bus, receiver, handler: Arc::new(handler) }
    }

    /// Serve queries until the task is aborted
    ///
    /// The endpoint keeps its own bus handle for replies, so the bus stays open while this runs
    /// and the loop only ends when its task is dropped. Queries are handled one at a time in
    /// arrival order.
    pub async fn run(mut self) {
        loop {
            let envelope = match self.receiver.recv().await {
                Ok(envelope) => envelope,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Resolver endpoint skipped {} messages", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    log::debug!("Resolver endpoint stopped");
                    return;
                }
            };

            let Some((x, y)) = accept_query(&envelope) else {
                continue;
            };

            let handler = Arc::clone(&self.handler);
            let result = match tokio::task::spawn_blocking(move || handler.handle(x, y)).await {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Resolver task failed: {}", e);
                    QueryResult::empty()
                }
            };

            self.bus.post_local(&BridgeMessage::Result(result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::accept_result;
    use crate::fiber::ComponentInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EchoHandler {
        calls: Arc<AtomicUsize>,
    }

    impl QueryHandler for EchoHandler {
        fn handle(&self, x: f64, y: f64) -> QueryResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            QueryResult { components: vec![ComponentInfo::new(format!("At{}x{}", x, y))], ..QueryResult::empty() }
        }
    }

    async fn next_result(receiver: &mut tokio::sync::broadcast::Receiver<Envelope>) -> QueryResult {
        loop {
            let envelope = receiver.recv().await.unwrap();
            if let Some(result) = accept_result(&envelope) {
                return result;
            }
        }
    }

    #[tokio::test]
    async fn test_endpoint_answers_local_query() {
        let bus = MessageBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let endpoint = ResolverEndpoint::new(bus.clone(), EchoHandler { calls: calls.clone() });
        let mut receiver = bus.subscribe();
        tokio::spawn(endpoint.run());

        bus.post_local(&BridgeMessage::Query { x: 3.0, y: 4.0 });

        let result = tokio::time::timeout(Duration::from_secs(5), next_result(&mut receiver)).await.unwrap();
        assert_eq!(result.components[0].name, "At3x4");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_endpoint_ignores_page_queries() {
        let bus = MessageBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let endpoint = ResolverEndpoint::new(bus.clone(), EchoHandler { calls: calls.clone() });
        let mut receiver = bus.subscribe();
        tokio::spawn(endpoint.run());

        bus.post(Envelope::from_page("http://localhost:3000", serde_json::json!({"type": "RCP_QUERY", "x": 1, "y": 1})));
        bus.post_local(&BridgeMessage::Query { x: 5.0, y: 6.0 });

        let result = tokio::time::timeout(Duration::from_secs(5), next_result(&mut receiver)).await.unwrap();
        assert_eq!(result.components[0].name, "At5x6");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_endpoint_runs_until_aborted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let endpoint = ResolverEndpoint::new(MessageBus::new(), EchoHandler { calls: calls.clone() });
        let task = tokio::spawn(endpoint.run());

        // The endpoint owns the only bus handle and still keeps serving
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
