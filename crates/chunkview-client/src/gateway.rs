//! Fetch gateway: one page request in, one normalized outcome out.
//!
//! Nothing past this point sees a transport error. Failures are logged here
//! and reduced to [`FetchOutcome`], which the cursor treats as "no data".

use crate::models::Chunk;
use crate::source::ChunkSource;
use crate::utils::metrics::{GatewayMetrics, Timer};
use chunkview_proto::{ChunksRequest, DocumentId, ProtoError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Result of fetching one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Non-empty window for the requested page.
    Ok(Vec<Chunk>),
    /// The page lies beyond the end of the collection.
    Empty,
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn into_window(self) -> Option<Vec<Chunk>> {
        match self {
            Self::Ok(window) => Some(window),
            Self::Empty | Self::Failed(_) => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error("network failure: {0}")]
    Network(String),

    #[error("server reported error: {0}")]
    ServerReported(String),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ProtoError),
}

/// Shared, read-only view of the gateway's in-flight flag.
///
/// Set for the duration of each source call, so a renderer holding a clone
/// can show a loading indicator while a cursor operation awaits.
#[derive(Clone, Debug, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// Clears the flag even if the fetch future is dropped mid-flight.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FetchGateway {
    source: Arc<dyn ChunkSource>,
    loading: LoadingFlag,
    metrics: GatewayMetrics,
}

impl FetchGateway {
    pub fn new(source: Arc<dyn ChunkSource>) -> Self {
        Self {
            source,
            loading: LoadingFlag::default(),
            metrics: GatewayMetrics::new(),
        }
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.loading.is_set()
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Fetch `page` (1-based) of `document`, `page_size` chunks per page.
    ///
    /// Exactly one source call when the arguments are valid, none otherwise.
    /// Overlapping calls are not cancelled.
    pub async fn fetch_page(&self, document: &DocumentId, page: u32, page_size: u32) -> FetchOutcome {
        let request = match ChunksRequest::new(document, page, page_size) {
            Ok(request) => request,
            Err(e) => {
                error!(document = %document, page, page_size, "Rejected chunk request: {}", e);
                self.metrics.increment_failed();
                return FetchOutcome::Failed(e.into());
            }
        };

        self.metrics.increment_requests();
        let timer = Timer::new();
        let result = {
            let _in_flight = InFlight::begin(&self.loading.0);
            self.source.list_chunks(&request).await
        };
        self.metrics.add_fetch_time(timer.elapsed());

        let outcome = match result {
            Err(e) => {
                warn!(document = %document, page, "Failed to fetch chunks: {}", e);
                FetchOutcome::Failed(FetchFailure::Network(e.to_string()))
            }
            Ok(payload) if payload.is_error() => {
                warn!(document = %document, page, "Chunk service error: {}", payload.error);
                FetchOutcome::Failed(FetchFailure::ServerReported(payload.error))
            }
            Ok(payload) if payload.chunks.is_empty() => {
                debug!(document = %document, page, "No chunks on page (end of collection)");
                FetchOutcome::Empty
            }
            Ok(payload) => {
                debug!(
                    document = %document,
                    page,
                    count = payload.chunks.len(),
                    elapsed_ms = timer.elapsed().as_millis() as u64,
                    "Fetched chunk page"
                );
                FetchOutcome::Ok(payload.chunks.into_iter().map(Chunk::from).collect())
            }
        };

        match &outcome {
            FetchOutcome::Ok(_) => self.metrics.increment_ok(),
            FetchOutcome::Empty => self.metrics.increment_empty(),
            FetchOutcome::Failed(_) => self.metrics.increment_failed(),
        }

        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::MockChunkSource;
    use crate::utils::error::FetchError;
    use async_trait::async_trait;
    use chunkview_proto::{ChunkRecord, ChunksPayload};
    use tokio::sync::Notify;

    fn doc() -> DocumentId {
        DocumentId::new("doc-1").unwrap()
    }

    fn record(id: i64) -> ChunkRecord {
        ChunkRecord {
            chunk_id: id,
            content: format!("chunk {}", id),
        }
    }

    /// Source that holds every request until `release()` is called.
    pub(crate) struct GatedSource {
        gate: Notify,
        count: i64,
    }

    impl GatedSource {
        pub(crate) fn new(count: i64) -> Self {
            Self {
                gate: Notify::new(),
                count,
            }
        }

        pub(crate) fn release(&self) {
            self.gate.notify_one();
        }
    }

    #[async_trait]
    impl ChunkSource for GatedSource {
        async fn list_chunks(&self, _request: &ChunksRequest) -> Result<ChunksPayload, FetchError> {
            self.gate.notified().await;
            Ok(ChunksPayload::ok((0..self.count).map(record).collect()))
        }
    }

    fn gateway_with(source: MockChunkSource) -> FetchGateway {
        FetchGateway::new(Arc::new(source))
    }

    #[tokio::test]
    async fn test_ok_page_is_converted() {
        let mut source = MockChunkSource::new();
        source
            .expect_list_chunks()
            .withf(|req| req.uuid == "doc-1" && req.page == 2 && req.page_size == 10)
            .times(1)
            .returning(|_| Ok(ChunksPayload::ok(vec![record(10), record(11)])));

        let gateway = gateway_with(source);
        let outcome = gateway.fetch_page(&doc(), 2, 10).await;

        let window = outcome.into_window().unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].chunk_id, 10);
        assert_eq!(window[1].content, "chunk 11");
        assert!(!gateway.is_fetching());
    }

    #[tokio::test]
    async fn test_empty_page_means_end_of_collection() {
        let mut source = MockChunkSource::new();
        source
            .expect_list_chunks()
            .returning(|_| Ok(ChunksPayload::ok(vec![])));

        let gateway = gateway_with(source);
        assert_eq!(gateway.fetch_page(&doc(), 4, 10).await, FetchOutcome::Empty);
        assert_eq!(gateway.metrics().snapshot().pages_empty, 1);
    }

    #[tokio::test]
    async fn test_server_error_ignores_chunks() {
        let mut source = MockChunkSource::new();
        source.expect_list_chunks().returning(|_| {
            Ok(ChunksPayload {
                error: "Couldn't retrieve chunks".into(),
                chunks: vec![record(1)],
            })
        });

        let gateway = gateway_with(source);
        assert_eq!(
            gateway.fetch_page(&doc(), 1, 10).await,
            FetchOutcome::Failed(FetchFailure::ServerReported(
                "Couldn't retrieve chunks".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_network_failure() {
        let mut source = MockChunkSource::new();
        source.expect_list_chunks().returning(|_| {
            Err(FetchError::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        });

        let gateway = gateway_with(source);
        match gateway.fetch_page(&doc(), 1, 10).await {
            FetchOutcome::Failed(FetchFailure::Network(msg)) => assert!(msg.contains("502")),
            other => panic!("Expected network failure, got {:?}", other),
        }
        assert!(!gateway.is_fetching());
        assert_eq!(gateway.metrics().snapshot().pages_failed, 1);
    }

    #[tokio::test]
    async fn test_invalid_request_skips_source() {
        let mut source = MockChunkSource::new();
        source.expect_list_chunks().times(0);

        let gateway = gateway_with(source);
        assert_eq!(
            gateway.fetch_page(&doc(), 0, 10).await,
            FetchOutcome::Failed(FetchFailure::InvalidRequest(ProtoError::InvalidPage(0)))
        );
        assert_eq!(
            gateway.fetch_page(&doc(), 1, 0).await,
            FetchOutcome::Failed(FetchFailure::InvalidRequest(ProtoError::InvalidPageSize(0)))
        );
        assert_eq!(gateway.metrics().requests(), 0);
    }

    #[tokio::test]
    async fn test_metrics_count_every_request() {
        let mut source = MockChunkSource::new();
        source.expect_list_chunks().returning(|req| {
            if req.page == 1 {
                Ok(ChunksPayload::ok(vec![record(0)]))
            } else {
                Ok(ChunksPayload::ok(vec![]))
            }
        });

        let gateway = gateway_with(source);
        gateway.fetch_page(&doc(), 1, 10).await;
        gateway.fetch_page(&doc(), 2, 10).await;
        gateway.fetch_page(&doc(), 1, 10).await;

        let snapshot = gateway.metrics().snapshot();
        assert_eq!(snapshot.requests, 3);
        assert_eq!(snapshot.pages_ok, 2);
        assert_eq!(snapshot.pages_empty, 1);
    }

    #[tokio::test]
    async fn test_loading_flag_set_while_fetch_in_flight() {
        let source = Arc::new(GatedSource::new(2));
        let gateway = Arc::new(FetchGateway::new(source.clone()));
        let flag = gateway.loading_flag();
        assert!(!flag.is_set());

        let task = tokio::spawn({
            let gateway = gateway.clone();
            async move { gateway.fetch_page(&doc(), 1, 10).await }
        });
        while !flag.is_set() {
            tokio::task::yield_now().await;
        }
        assert!(gateway.is_fetching());

        source.release();
        let outcome = task.await.unwrap();

        assert_eq!(outcome.into_window().map(|w| w.len()), Some(2));
        assert!(!flag.is_set());
    }

    #[tokio::test]
    async fn test_loading_flag_cleared_when_fetch_is_dropped() {
        let source = Arc::new(GatedSource::new(1));
        let gateway = Arc::new(FetchGateway::new(source));
        let flag = gateway.loading_flag();

        let task = tokio::spawn({
            let gateway = gateway.clone();
            async move { gateway.fetch_page(&doc(), 1, 10).await }
        });
        while !flag.is_set() {
            tokio::task::yield_now().await;
        }

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(!flag.is_set());
    }
}
