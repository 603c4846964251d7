//! Cursor over a server-paged chunk collection.
//!
//! Only one page is buffered. Moves inside the window are pure index
//! updates; crossing a page boundary fetches the neighbouring page, and
//! running off either end of the collection wraps around to the other end.
//! The total number of chunks is never known, so wrapping backwards finds
//! the last page by probing forward from page 1.

use crate::gateway::{FetchGateway, FetchOutcome};
use crate::models::Chunk;
use chunkview_proto::DocumentId;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No document selected.
    Unselected,
    /// Window populated, index valid.
    Idle,
    /// A fetch is in flight. Held only while an operation is suspended on
    /// the gateway; other tasks watch [`FetchGateway::loading_flag`] instead.
    Loading,
    /// Nothing to show for the current document.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    pub document: DocumentId,
    pub page: u32,
    pub index: usize,
}

pub struct ChunkCursor {
    gateway: Arc<FetchGateway>,
    page_size: u32,
    document: Option<DocumentId>,
    page: u32,
    index: usize,
    window: Vec<Chunk>,
    state: CursorState,
}

impl ChunkCursor {
    /// `page_size` of 0 is treated as 1.
    pub fn new(gateway: Arc<FetchGateway>, page_size: u32) -> Self {
        Self {
            gateway,
            page_size: page_size.max(1),
            document: None,
            page: 1,
            index: 0,
            window: Vec::new(),
            state: CursorState::Unselected,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn document(&self) -> Option<&DocumentId> {
        self.document.as_ref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn window(&self) -> &[Chunk] {
        &self.window
    }

    /// Chunk under the cursor, if any.
    pub fn current(&self) -> Option<&Chunk> {
        self.window.get(self.index)
    }

    pub fn position(&self) -> Option<CursorPosition> {
        self.document.as_ref().map(|document| CursorPosition {
            document: document.clone(),
            page: self.page,
            index: self.index,
        })
    }

    /// UI hint only; `previous()` is valid from every state.
    pub fn can_go_previous(&self) -> bool {
        !(self.page == 1 && self.index == 0)
    }

    /// Navigation controls are only worth showing with more than one chunk buffered.
    pub fn shows_navigation(&self) -> bool {
        self.window.len() > 1
    }

    /// Same flag as [`FetchGateway::loading_flag`], read through the cursor.
    pub fn is_loading(&self) -> bool {
        self.gateway.is_fetching()
    }

    pub fn gateway(&self) -> &FetchGateway {
        &self.gateway
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Select `document` and load its first page. Prior state is discarded.
    pub async fn reset(&mut self, document: DocumentId) {
        info!(document = %document, "Selecting document");

        self.document = Some(document);
        self.page = 1;
        self.index = 0;
        self.window.clear();

        match self.fetch(1).await {
            FetchOutcome::Ok(window) => self.commit(1, window, 0),
            _ => self.enter_empty(),
        }
    }

    /// Drop the selection and the buffered window.
    pub fn clear(&mut self) {
        if let Some(document) = self.document.take() {
            debug!(document = %document, "Clearing cursor");
        }
        self.page = 1;
        self.index = 0;
        self.window.clear();
        self.state = CursorState::Unselected;
    }

    /// Step to the next chunk, crossing into the next page or wrapping to
    /// the first chunk of the collection.
    pub async fn next(&mut self) {
        if self.document.is_none() {
            debug!("next() without a selected document");
            return;
        }
        if self.window.is_empty() {
            self.reload().await;
            return;
        }

        if self.index + 1 < self.window.len() {
            self.index += 1;
            return;
        }

        if let Some(next_page) = self.page.checked_add(1) {
            if let FetchOutcome::Ok(window) = self.fetch(next_page).await {
                self.commit(next_page, window, 0);
                return;
            }
        }

        debug!(page = self.page, "End of collection, wrapping to first page");
        match self.fetch(1).await {
            FetchOutcome::Ok(window) => self.commit(1, window, 0),
            _ => self.enter_empty(),
        }
    }

    /// Step to the previous chunk, crossing into the previous page or
    /// wrapping to the last chunk of the collection.
    pub async fn previous(&mut self) {
        if self.document.is_none() {
            debug!("previous() without a selected document");
            return;
        }
        if self.window.is_empty() {
            self.reload().await;
            return;
        }

        if self.index > 0 {
            self.index -= 1;
            return;
        }

        if self.page > 1 {
            let previous_page = self.page - 1;
            match self.fetch(previous_page).await {
                FetchOutcome::Ok(window) => {
                    // Interior pages are expected to be full.
                    if window.len() < self.page_size as usize {
                        warn!(
                            page = previous_page,
                            len = window.len(),
                            page_size = self.page_size,
                            "Short interior page; clamping to its last chunk"
                        );
                    }
                    let index = (self.page_size as usize - 1).min(window.len() - 1);
                    self.commit(previous_page, window, index);
                }
                _ => self.enter_empty(),
            }
            return;
        }

        let last_page = self.find_last_page().await;
        debug!(last_page, "Wrapping to last page");
        match self.fetch(last_page).await {
            FetchOutcome::Ok(window) => {
                let index = window.len() - 1;
                self.commit(last_page, window, index);
            }
            _ => self.enter_empty(),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Walk pages 2, 3, ... until one comes back without chunks.
    async fn find_last_page(&mut self) -> u32 {
        let mut last_page: u32 = 1;
        while let Some(candidate) = last_page.checked_add(1) {
            match self.fetch(candidate).await {
                FetchOutcome::Ok(_) => last_page = candidate,
                _ => break,
            }
        }
        last_page
    }

    /// Retry the current page after the window was cleared by a failure.
    async fn reload(&mut self) {
        let page = self.page;
        debug!(page, "Reloading page");
        match self.fetch(page).await {
            FetchOutcome::Ok(window) => self.commit(page, window, 0),
            _ => self.enter_empty(),
        }
    }

    async fn fetch(&mut self, page: u32) -> FetchOutcome {
        let Some(document) = self.document.clone() else {
            return FetchOutcome::Empty;
        };

        let settled = self.state;
        self.state = CursorState::Loading;
        let outcome = self.gateway.fetch_page(&document, page, self.page_size).await;
        self.state = settled;

        outcome
    }

    fn commit(&mut self, page: u32, window: Vec<Chunk>, index: usize) {
        debug_assert!(index < window.len());
        self.page = page;
        self.index = index;
        self.window = window;
        self.state = CursorState::Idle;
    }

    fn enter_empty(&mut self) {
        self.index = 0;
        self.window.clear();
        self.state = CursorState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::GatedSource;
    use crate::source::{MemoryChunkSource, MockChunkSource};
    use chunkview_proto::{ChunkRecord, ChunksPayload};

    const PAGE_SIZE: u32 = 10;

    fn doc(id: &str) -> DocumentId {
        DocumentId::new(id).unwrap()
    }

    fn cursor_over(source: Arc<MemoryChunkSource>) -> ChunkCursor {
        let gateway = Arc::new(FetchGateway::new(source));
        ChunkCursor::new(gateway, PAGE_SIZE)
    }

    async fn cursor_with_chunks(count: usize) -> (ChunkCursor, Arc<MemoryChunkSource>) {
        let source = Arc::new(MemoryChunkSource::new().with_synthetic_document("doc", count));
        let mut cursor = cursor_over(source.clone());
        cursor.reset(doc("doc")).await;
        (cursor, source)
    }

    fn current_id(cursor: &ChunkCursor) -> i64 {
        cursor.current().expect("cursor should point at a chunk").chunk_id
    }

    fn at(cursor: &ChunkCursor) -> (u32, usize) {
        (cursor.page(), cursor.index())
    }

    #[tokio::test]
    async fn test_reset_loads_first_page() {
        let (cursor, source) = cursor_with_chunks(25).await;

        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(at(&cursor), (1, 0));
        assert_eq!(cursor.window().len(), 10);
        assert_eq!(current_id(&cursor), 0);
        assert!(!cursor.can_go_previous());
        assert!(cursor.shows_navigation());
        assert_eq!(source.requested_pages(), vec![1]);
    }

    #[tokio::test]
    async fn test_next_visits_every_chunk_and_wraps() {
        for total in [1usize, 5, 10, 20, 25, 31] {
            let (mut cursor, _) = cursor_with_chunks(total).await;

            let mut seen = vec![current_id(&cursor)];
            for _ in 0..total {
                cursor.next().await;
                seen.push(current_id(&cursor));
            }

            let mut expected: Vec<i64> = (0..total as i64).collect();
            expected.push(0);
            assert_eq!(seen, expected, "walk over {} chunks", total);
            assert_eq!(at(&cursor), (1, 0), "wrap over {} chunks", total);
        }
    }

    #[tokio::test]
    async fn test_previous_from_first_chunk_wraps_to_last() {
        let (mut cursor, source) = cursor_with_chunks(25).await;
        source.clear_requests();

        cursor.previous().await;

        assert_eq!(at(&cursor), (3, 4));
        assert_eq!(current_id(&cursor), 24);
        // Scan 2, 3, 4 (empty), then re-fetch 3.
        assert_eq!(source.requested_pages(), vec![2, 3, 4, 3]);
        assert!(cursor.can_go_previous());
    }

    #[tokio::test]
    async fn test_previous_wrap_on_single_page() {
        let (mut cursor, _) = cursor_with_chunks(4).await;

        cursor.previous().await;

        assert_eq!(at(&cursor), (1, 3));
        assert_eq!(current_id(&cursor), 3);
    }

    #[tokio::test]
    async fn test_previous_walks_backwards_through_everything() {
        let total = 25usize;
        let (mut cursor, _) = cursor_with_chunks(total).await;

        let mut seen = Vec::new();
        for _ in 0..total {
            cursor.previous().await;
            seen.push(current_id(&cursor));
        }

        let expected: Vec<i64> = (0..total as i64).rev().collect();
        assert_eq!(seen, expected);
        assert_eq!(at(&cursor), (1, 0));
    }

    #[tokio::test]
    async fn test_next_then_previous_returns_to_same_chunk() {
        let total = 25usize;
        for start in 0..total {
            let (mut cursor, _) = cursor_with_chunks(total).await;
            for _ in 0..start {
                cursor.next().await;
            }
            let before = (at(&cursor), current_id(&cursor));

            cursor.next().await;
            cursor.previous().await;

            assert_eq!((at(&cursor), current_id(&cursor)), before, "start {}", start);
        }
    }

    #[tokio::test]
    async fn test_next_past_end_fetches_beyond_then_first_page() {
        let (mut cursor, source) = cursor_with_chunks(25).await;
        for _ in 0..24 {
            cursor.next().await;
        }
        assert_eq!(at(&cursor), (3, 4));
        source.clear_requests();

        cursor.next().await;

        assert_eq!(source.requested_pages(), vec![4, 1]);
        assert_eq!(at(&cursor), (1, 0));
        assert_eq!(current_id(&cursor), 0);
    }

    #[tokio::test]
    async fn test_moves_inside_window_do_not_fetch() {
        let (mut cursor, _) = cursor_with_chunks(25).await;
        let requests = cursor.gateway().metrics().requests();

        for _ in 0..9 {
            cursor.next().await;
        }
        for _ in 0..5 {
            cursor.previous().await;
        }

        assert_eq!(at(&cursor), (1, 4));
        assert_eq!(cursor.gateway().metrics().requests(), requests);
    }

    #[tokio::test]
    async fn test_document_without_chunks() {
        let source = Arc::new(MemoryChunkSource::new().with_document("empty", vec![]));
        let mut cursor = cursor_over(source);

        cursor.reset(doc("empty")).await;

        assert_eq!(cursor.state(), CursorState::Empty);
        assert!(cursor.current().is_none());
        assert!(cursor.window().is_empty());
        assert!(!cursor.shows_navigation());

        cursor.next().await;
        cursor.previous().await;
        assert_eq!(cursor.state(), CursorState::Empty);
    }

    #[tokio::test]
    async fn test_single_chunk_hides_navigation_and_stays_put() {
        let (mut cursor, _) = cursor_with_chunks(1).await;
        assert!(!cursor.shows_navigation());

        cursor.next().await;
        assert_eq!((at(&cursor), current_id(&cursor)), ((1, 0), 0));

        cursor.previous().await;
        assert_eq!((at(&cursor), current_id(&cursor)), ((1, 0), 0));
    }

    #[tokio::test]
    async fn test_server_error_enters_no_data_state() {
        let source = Arc::new(MemoryChunkSource::new().with_synthetic_document("doc", 25));
        source.fail_page(1, "Couldn't connect to Weaviate");
        let mut cursor = cursor_over(source.clone());

        cursor.reset(doc("doc")).await;
        assert_eq!(cursor.state(), CursorState::Empty);
        assert!(cursor.window().is_empty());

        // Navigating again retries the same page.
        cursor.next().await;
        assert_eq!(cursor.state(), CursorState::Empty);

        source.heal_page(1);
        cursor.next().await;
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(at(&cursor), (1, 0));
    }

    #[tokio::test]
    async fn test_failed_previous_page_clears_window_then_recovers() {
        let (mut cursor, source) = cursor_with_chunks(25).await;
        for _ in 0..10 {
            cursor.next().await;
        }
        assert_eq!(at(&cursor), (2, 0));

        source.fail_page(1, "timeout");
        cursor.previous().await;
        assert_eq!(cursor.state(), CursorState::Empty);
        assert!(cursor.current().is_none());
        assert_eq!(cursor.page(), 2);

        source.heal_page(1);
        cursor.previous().await;
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(at(&cursor), (2, 0));
        assert_eq!(current_id(&cursor), 10);
    }

    #[tokio::test]
    async fn test_failed_next_page_counts_as_end_of_collection() {
        let (mut cursor, source) = cursor_with_chunks(25).await;
        for _ in 0..9 {
            cursor.next().await;
        }
        source.fail_page(2, "boom");

        cursor.next().await;

        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(at(&cursor), (1, 0));
    }

    #[tokio::test]
    async fn test_switching_document_resets_position() {
        let source = Arc::new(
            MemoryChunkSource::new()
                .with_synthetic_document("a", 25)
                .with_synthetic_document("b", 3),
        );
        let mut cursor = cursor_over(source);

        cursor.reset(doc("a")).await;
        for _ in 0..13 {
            cursor.next().await;
        }
        assert_eq!(at(&cursor), (2, 3));

        cursor.reset(doc("b")).await;

        let position = cursor.position().unwrap();
        assert_eq!(position.document, doc("b"));
        assert_eq!((position.page, position.index), (1, 0));
        assert_eq!(cursor.window().len(), 3);
    }

    #[tokio::test]
    async fn test_navigation_without_document_is_a_no_op() {
        let source = Arc::new(MemoryChunkSource::new().with_synthetic_document("doc", 5));
        let mut cursor = cursor_over(source.clone());

        cursor.next().await;
        cursor.previous().await;

        assert_eq!(cursor.state(), CursorState::Unselected);
        assert!(cursor.position().is_none());
        assert!(source.requested_pages().is_empty());
    }

    #[tokio::test]
    async fn test_clear_discards_state() {
        let (mut cursor, _) = cursor_with_chunks(12).await;
        cursor.next().await;

        cursor.clear();

        assert_eq!(cursor.state(), CursorState::Unselected);
        assert!(cursor.document().is_none());
        assert!(cursor.window().is_empty());
        assert_eq!(at(&cursor), (1, 0));
    }

    #[tokio::test]
    async fn test_short_previous_page_clamps_index() {
        let record = |id: i64| ChunkRecord {
            chunk_id: id,
            content: String::new(),
        };

        let mut source = MockChunkSource::new();
        source.expect_list_chunks().returning(move |req| {
            let chunks = match req.page {
                1 => (0..3).map(record).collect(),
                2 => (100..110).map(record).collect(),
                _ => vec![],
            };
            Ok(ChunksPayload::ok(chunks))
        });

        let gateway = Arc::new(FetchGateway::new(Arc::new(source)));
        let mut cursor = ChunkCursor::new(gateway, PAGE_SIZE);
        cursor.reset(doc("sparse")).await;
        for _ in 0..3 {
            cursor.next().await;
        }
        assert_eq!((at(&cursor), current_id(&cursor)), ((2, 0), 100));

        cursor.previous().await;

        assert_eq!((at(&cursor), current_id(&cursor)), ((1, 2), 2));
    }

    #[tokio::test]
    async fn test_loading_flag_is_clear_between_operations() {
        let (mut cursor, _) = cursor_with_chunks(25).await;
        let flag = cursor.gateway().loading_flag();

        cursor.previous().await;

        assert!(!flag.is_set());
        assert!(!cursor.is_loading());
        assert_eq!(cursor.state(), CursorState::Idle);
    }

    #[tokio::test]
    async fn test_loading_flag_visible_while_reset_waits() {
        let source = Arc::new(GatedSource::new(3));
        let gateway = Arc::new(FetchGateway::new(source.clone()));
        let flag = gateway.loading_flag();
        let mut cursor = ChunkCursor::new(gateway, PAGE_SIZE);

        let task = tokio::spawn(async move {
            cursor.reset(doc("doc")).await;
            cursor
        });
        while !flag.is_set() {
            tokio::task::yield_now().await;
        }

        source.release();
        let cursor = task.await.unwrap();

        assert!(!flag.is_set());
        assert_eq!(cursor.state(), CursorState::Idle);
        assert_eq!(cursor.window().len(), 3);
    }
}
