use chunkview_client::DisplayMode;
use ratatui::style::{Color, Modifier, Style};

/// Style tokens for the viewer, one palette per display mode
pub struct Theme {
    pub title: Style,
    pub border: Style,
    pub badge: Style,
    pub normal: Style,
    pub heading: Style,
    pub code: Style,
    pub muted: Style,
    pub danger: Style,
    pub success: Style,
    pub key_hint: Style,
}

impl Theme {
    pub fn for_mode(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Dark => Self::dark(),
            DisplayMode::Light => Self::light(),
        }
    }

    fn dark() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            badge: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            normal: Style::default().fg(Color::White),
            heading: Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::LightGreen).bg(Color::Rgb(40, 44, 52)),
            muted: Style::default().fg(Color::DarkGray),
            danger: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            success: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::Gray),
            badge: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            normal: Style::default().fg(Color::Black),
            heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Rgb(80, 161, 79)).bg(Color::Rgb(250, 250, 250)),
            muted: Style::default().fg(Color::Gray),
            danger: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            success: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            key_hint: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        }
    }
}
