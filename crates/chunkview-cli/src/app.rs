use chunkview_client::{ChunkCursor, DisplayMode, DocumentId};
use tracing::info;

use crate::markdown::ChunkRenderer;

/// Screen states for the TUI state machine
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Viewer,
    OpenDocument,          // Prompt for a document id
    Message(String, bool), // Message, is_error
}

/// Work that needs the network; run by the main loop after a redraw.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Next,
    Previous,
    First,
    Last,
    NextDocument,
    PreviousDocument,
    Open(DocumentId),
}

/// Application state
pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub cursor: ChunkCursor,
    pub display_mode: DisplayMode,
    pub renderer: ChunkRenderer,

    // Documents the user can cycle through
    pub documents: Vec<DocumentId>,
    pub selected: Option<usize>,

    // Set while an action is being performed, drives the loading indicator
    pub pending: Option<Action>,

    // Document id prompt
    pub input: String,
}

impl App {
    pub fn new(cursor: ChunkCursor, documents: Vec<DocumentId>, display_mode: DisplayMode) -> Self {
        Self {
            screen: Screen::Viewer,
            should_quit: false,
            cursor,
            display_mode,
            renderer: ChunkRenderer::new(),
            documents,
            selected: None,
            pending: None,
            input: String::new(),
        }
    }

    pub fn selected_document(&self) -> Option<&DocumentId> {
        self.selected.and_then(|i| self.documents.get(i))
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some() || self.cursor.is_loading()
    }

    /// Load the first document given on the command line, if any.
    pub async fn start(&mut self) {
        if !self.documents.is_empty() {
            self.select(0).await;
        }
    }

    async fn select(&mut self, index: usize) {
        let Some(document) = self.documents.get(index).cloned() else {
            return;
        };
        info!(document = %document, "Switching document");
        self.selected = Some(index);
        self.cursor.reset(document).await;
    }

    pub async fn perform(&mut self, action: Action) {
        self.pending = Some(action.clone());

        match action {
            Action::Next => self.cursor.next().await,
            Action::Previous => self.cursor.previous().await,
            Action::First => {
                if let Some(index) = self.selected {
                    self.select(index).await;
                }
            }
            Action::Last => {
                if let Some(index) = self.selected {
                    if self.cursor.can_go_previous() {
                        self.select(index).await;
                    }
                    // From the first chunk, previous() wraps to the last one.
                    self.cursor.previous().await;
                }
            }
            Action::NextDocument => {
                if let Some(index) = self.selected {
                    self.select((index + 1) % self.documents.len()).await;
                }
            }
            Action::PreviousDocument => {
                if let Some(index) = self.selected {
                    let count = self.documents.len();
                    self.select((index + count - 1) % count).await;
                }
            }
            Action::Open(document) => {
                let index = match self.documents.iter().position(|d| *d == document) {
                    Some(index) => index,
                    None => {
                        self.documents.push(document);
                        self.documents.len() - 1
                    }
                };
                self.select(index).await;
            }
        }

        self.pending = None;
    }

    pub fn open_prompt(&mut self) {
        self.input.clear();
        self.screen = Screen::OpenDocument;
    }

    /// Parse the prompt into an `Open` action, or show why it can't be used.
    pub fn submit_prompt(&mut self) -> Option<Action> {
        match DocumentId::new(self.input.as_str()) {
            Ok(document) => {
                self.input.clear();
                self.screen = Screen::Viewer;
                Some(Action::Open(document))
            }
            Err(e) => {
                self.screen = Screen::Message(e.to_string(), true);
                None
            }
        }
    }

    pub fn toggle_display_mode(&mut self) {
        self.display_mode = self.display_mode.toggled();
    }

    pub fn go_back(&mut self) {
        match &self.screen {
            Screen::OpenDocument | Screen::Message(_, _) => {
                self.screen = Screen::Viewer;
                self.input.clear();
            }
            Screen::Viewer => {}
        }
    }
}
