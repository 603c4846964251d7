use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::theme::Theme;
use chunkview_client::{Chunk, CursorState};

pub fn render(frame: &mut Frame, app: &App) {
    let theme = Theme::for_mode(app.display_mode);

    render_viewer(frame, app, &theme);

    match &app.screen {
        Screen::Viewer => {}
        Screen::OpenDocument => render_open_document(frame, app, &theme),
        Screen::Message(msg, is_error) => render_message(frame, msg, *is_error, &theme),
    }
}

fn render_viewer(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = frame.area();

    let title = match app.selected_document() {
        Some(document) => format!(
            " Chunks: {} ({}/{}) ",
            document,
            app.selected.map_or(0, |i| i + 1),
            app.documents.len()
        ),
        None => " Chunks ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(title)
        .title_style(theme.title);

    frame.render_widget(block, area);

    let inner = Layout::default()
        .constraints([
            Constraint::Length(1), // Badge + position
            Constraint::Length(1), // Padding
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Status
            Constraint::Length(1), // Footer
        ])
        .split(inner_rect(area, 1));

    match (app.is_loading(), app.cursor.current()) {
        (false, Some(chunk)) => {
            render_header(frame, app, chunk, theme, inner[0]);
            let lines = app.renderer.render(&chunk.content, app.display_mode, theme);
            let content = Paragraph::new(lines)
                .wrap(Wrap { trim: false });
            frame.render_widget(content, inner[2]);
        }
        (loading, _) => {
            let msg = if loading {
                "Loading Chunks"
            } else {
                match app.cursor.state() {
                    CursorState::Unselected => "No document selected. Press o to open one.",
                    _ => "(No chunks)",
                }
            };
            let p = Paragraph::new(msg)
                .style(theme.muted)
                .alignment(Alignment::Center);
            frame.render_widget(p, inner[2]);
        }
    }

    render_status(frame, app, theme, inner[3]);
    render_footer(frame, app, theme, inner[4]);
}

fn render_header(frame: &mut Frame, app: &App, chunk: &Chunk, theme: &Theme, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" Chunk {} ", chunk.chunk_id), theme.badge),
        Span::raw("  "),
        Span::styled(
            format!(
                "page {} · {}/{}",
                app.cursor.page(),
                app.cursor.index() + 1,
                app.cursor.window().len()
            ),
            theme.muted,
        ),
    ]));

    frame.render_widget(header, area);
}

fn render_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let stats = app.cursor.gateway().metrics().snapshot();
    let status = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(
                "requests {} · empty {} · failed {} · avg {:.0}ms",
                stats.requests,
                stats.pages_empty,
                stats.pages_failed,
                stats.average_fetch_time_ms()
            ),
            theme.muted,
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} ({})", app.display_mode, app.display_mode.code_theme()),
            theme.muted,
        ),
    ]))
    .alignment(Alignment::Right);

    frame.render_widget(status, area);
}

fn render_footer(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans = Vec::new();

    if app.cursor.shows_navigation() && !app.is_loading() {
        let previous = if app.cursor.can_go_previous() {
            theme.key_hint
        } else {
            theme.muted
        };
        spans.extend([
            Span::styled(" ← ", previous),
            Span::styled("Previous", theme.muted),
            Span::raw("  "),
            Span::styled(" → ", theme.key_hint),
            Span::styled("Next", theme.muted),
            Span::raw("  "),
            Span::styled(" g/G ", theme.key_hint),
            Span::styled("First/Last", theme.muted),
            Span::raw("  "),
        ]);
    }
    if app.documents.len() > 1 {
        spans.extend([
            Span::styled(" Tab ", theme.key_hint),
            Span::styled("Document", theme.muted),
            Span::raw("  "),
        ]);
    }
    spans.extend([
        Span::styled(" o ", theme.key_hint),
        Span::styled("Open", theme.muted),
        Span::raw("  "),
        Span::styled(" m ", theme.key_hint),
        Span::styled("Mode", theme.muted),
        Span::raw("  "),
        Span::styled(" q ", theme.key_hint),
        Span::styled("Quit", theme.muted),
    ]);

    let footer = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn render_open_document(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = center_rect(frame.area(), 50, 7);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.title)
        .title(" Open Document ")
        .title_style(theme.title);

    frame.render_widget(block, area);

    let inner = inner_rect(area, 2);

    let text = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Document id: ", theme.normal),
            Span::styled(format!("{}_", app.input), theme.key_hint),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled(" Enter ", theme.key_hint),
            Span::styled("Open", theme.muted),
            Span::raw("  "),
            Span::styled(" Esc ", theme.key_hint),
            Span::styled("Cancel", theme.muted),
        ]),
    ]);

    frame.render_widget(text, inner);
}

fn render_message(frame: &mut Frame, msg: &str, is_error: bool, theme: &Theme) {
    let area = center_rect(frame.area(), 50, 6);

    frame.render_widget(Clear, area);

    let (style, title) = if is_error {
        (theme.danger, " Error ")
    } else {
        (theme.success, " Info ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
        .title_style(style);

    frame.render_widget(block, area);

    let text = Paragraph::new(vec![
        Line::raw(msg),
        Line::raw(""),
        Line::from(Span::styled("Press any key to continue", theme.muted)),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(text, inner_rect(area, 1));
}

// Helper: shrink rect by margin
fn inner_rect(area: Rect, margin: u16) -> Rect {
    Rect {
        x: area.x + margin,
        y: area.y + margin,
        width: area.width.saturating_sub(margin * 2),
        height: area.height.saturating_sub(margin * 2),
    }
}

// Helper: center a popup, clipped to the frame
fn center_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
