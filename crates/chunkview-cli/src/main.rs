mod app;
mod dump;
mod event;
mod markdown;
mod theme;
mod ui;

use app::App;
use chunkview_client::utils::logger::init_logger;
use chunkview_client::{
    ChunkCursor, ChunkSource, DisplayMode, DocumentId, FetchGateway, HttpChunkSource,
    MemoryChunkSource, Settings,
};
use clap::{Parser, Subcommand};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "chunkview")]
#[command(about = "Page through the chunks of a document served by a chunk service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the chunk service
    #[arg(long, global = true, env = "CHUNKVIEW_API_HOST")]
    host: Option<String>,

    /// Chunks fetched per page
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Display mode (light or dark)
    #[arg(long, global = true)]
    mode: Option<DisplayMode>,

    /// Serve N synthetic chunks per document from memory instead of HTTP
    #[arg(long, global = true, value_name = "N")]
    demo: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the full-screen viewer - Default
    View {
        /// Document ids to cycle through with Tab
        documents: Vec<String>,
    },
    /// Print a document's chunks in order
    Dump {
        document: String,

        /// Stop after N chunks
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    color_eyre::install().ok();
    let cli = Cli::parse();

    let settings = resolve_settings(&cli)?;
    let _guard = init_logger(&settings.logging)?;

    match cli.command.unwrap_or(Commands::View { documents: vec![] }) {
        Commands::View { documents } => {
            let mut documents = parse_documents(documents)?;
            if documents.is_empty() && cli.demo.is_some() {
                documents.push(DocumentId::new("demo")?);
            }
            let source = build_source(&settings, cli.demo, &documents)?;
            let cursor = ChunkCursor::new(Arc::new(FetchGateway::new(source)), settings.viewer.page_size);
            start_tui(App::new(cursor, documents, settings.viewer.display_mode)).await?
        }
        Commands::Dump { document, limit } => {
            let document = DocumentId::new(document)?;
            let source = build_source(&settings, cli.demo, std::slice::from_ref(&document))?;
            let mut cursor = ChunkCursor::new(Arc::new(FetchGateway::new(source)), settings.viewer.page_size);
            dump::dump(&mut cursor, document, limit, &mut std::io::stdout().lock()).await?;
        }
    }

    Ok(())
}

/// Config file and env first, then command-line overrides, then validation.
fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::read_from(cli.config.as_deref())?;
    if let Some(host) = &cli.host {
        settings.api.host = host.clone();
    }
    if let Some(page_size) = cli.page_size {
        settings.viewer.page_size = page_size;
    }
    if let Some(mode) = cli.mode {
        settings.viewer.display_mode = mode;
    }
    settings.validate()?;

    Ok(settings)
}

fn parse_documents(ids: Vec<String>) -> anyhow::Result<Vec<DocumentId>> {
    ids.into_iter()
        .map(|id| DocumentId::new(id).map_err(anyhow::Error::from))
        .collect()
}

fn build_source(
    settings: &Settings,
    demo: Option<usize>,
    documents: &[DocumentId],
) -> anyhow::Result<Arc<dyn ChunkSource>> {
    match demo {
        Some(count) => {
            info!(count, documents = documents.len(), "Using in-memory demo source");
            let source = documents.iter().fold(MemoryChunkSource::new(), |source, document| {
                source.with_synthetic_document(document.as_str(), count)
            });
            Ok(Arc::new(source))
        }
        None => {
            let source = HttpChunkSource::new(&settings.api)?;
            info!(endpoint = %source.endpoint(), "Using chunk service");
            Ok(Arc::new(source))
        }
    }
}

async fn start_tui(app: App) -> anyhow::Result<()> {
    // Initialize terminal (ratatui::init handles raw mode + alternate screen)
    let terminal = ratatui::init();

    let result = run_app(terminal, app).await;

    // Restore terminal (always, even on error)
    ratatui::restore();

    result
}

async fn run_app(mut terminal: DefaultTerminal, mut app: App) -> anyhow::Result<()> {
    app.start().await;

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        if app.should_quit {
            break;
        }

        // Poll events (non-blocking with 100ms timeout)
        if let Some(evt) = event::poll_event(100)? {
            if let Some(action) = event::handle_event(&mut app, evt) {
                // Show the loading state before the fetch blocks the loop
                app.pending = Some(action.clone());
                terminal.draw(|frame| ui::render(frame, &app))?;
                app.perform(action).await;
            }
        }
    }
    Ok(())
}
