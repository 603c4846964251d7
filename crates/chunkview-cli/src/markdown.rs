//! Chunk content to ratatui lines: markdown via pulldown-cmark, fenced code
//! highlighted with syntect in the display mode's code theme.

use chunkview_client::DisplayMode;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as CodeTheme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::theme::Theme;

/// Syntax and theme sets are loaded once and reused for every chunk.
pub struct ChunkRenderer {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl ChunkRenderer {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    pub fn render(&self, source: &str, mode: DisplayMode, theme: &Theme) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut builder = LineBuilder {
            theme,
            syntaxes: &self.syntaxes,
            code_theme: self.themes.themes.get(mode.code_theme()),
            lines: Vec::new(),
            spans: Vec::new(),
            heading: false,
            strong: 0,
            emphasis: 0,
            strikethrough: 0,
            lists: Vec::new(),
            code_block: None,
        };

        for event in Parser::new_ext(source, options) {
            match event {
                Event::Start(tag) => builder.start(tag),
                Event::End(tag) => builder.end(tag),
                Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                    builder.text(&text)
                }
                Event::Code(code) => builder.push(code.to_string(), theme.code),
                Event::SoftBreak => builder.soft_break(),
                Event::HardBreak => builder.flush(),
                Event::Rule => {
                    builder.flush();
                    builder.push("─".repeat(40), theme.muted);
                    builder.flush();
                    builder.blank();
                }
                Event::TaskListMarker(done) => {
                    builder.push(if done { "[x] " } else { "[ ] " }.to_string(), theme.muted)
                }
                _ => {}
            }
        }

        builder.finish()
    }
}

impl Default for ChunkRenderer {
    fn default() -> Self {
        Self::new()
    }
}

struct LineBuilder<'r> {
    theme: &'r Theme,
    syntaxes: &'r SyntaxSet,
    code_theme: Option<&'r CodeTheme>,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    heading: bool,
    strong: u8,
    emphasis: u8,
    strikethrough: u8,
    // Next number for ordered lists, None for bullets
    lists: Vec<Option<u64>>,
    // (language, buffered source) while inside a fenced or indented block
    code_block: Option<(String, String)>,
}

impl LineBuilder<'_> {
    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.heading = true;
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((lang, String::new()));
            }
            Tag::List(start) => self.lists.push(start),
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let bullet = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let bullet = format!("{}{}. ", indent, n);
                        *n += 1;
                        bullet
                    }
                    _ => format!("{}- ", indent),
                };
                self.push(bullet, self.theme.muted);
            }
            Tag::Strong => self.strong = self.strong.saturating_add(1),
            Tag::Emphasis => self.emphasis = self.emphasis.saturating_add(1),
            Tag::Strikethrough => self.strikethrough = self.strikethrough.saturating_add(1),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = false;
                self.blank();
            }
            TagEnd::CodeBlock => {
                if let Some((lang, code)) = self.code_block.take() {
                    self.code(&lang, &code);
                }
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Strikethrough => self.strikethrough = self.strikethrough.saturating_sub(1),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some((_, code)) = self.code_block.as_mut() {
            code.push_str(text);
            return;
        }
        self.push(text.to_string(), self.inline_style());
    }

    fn soft_break(&mut self) {
        if let Some((_, code)) = self.code_block.as_mut() {
            code.push('\n');
            return;
        }
        self.push(" ".to_string(), self.inline_style());
    }

    fn inline_style(&self) -> Style {
        let mut style = if self.heading {
            self.theme.heading
        } else {
            self.theme.normal
        };
        if self.strong > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.emphasis > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.strikethrough > 0 {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        style
    }

    fn code(&mut self, lang: &str, code: &str) {
        let syntaxes = self.syntaxes;
        let syntax = syntaxes
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
        let mut highlighter = self.code_theme.map(|theme| HighlightLines::new(syntax, theme));

        for line in LinesWithEndings::from(code) {
            let tokens = highlighter
                .as_mut()
                .and_then(|h| h.highlight_line(line, syntaxes).ok());

            match tokens {
                Some(tokens) if !tokens.is_empty() => {
                    for (style, token) in tokens {
                        let token = token.trim_end_matches(['\n', '\r']);
                        if token.is_empty() {
                            continue;
                        }
                        let fg = style.foreground;
                        let bg = style.background;
                        self.push(
                            token.to_string(),
                            Style::default()
                                .fg(Color::Rgb(fg.r, fg.g, fg.b))
                                .bg(Color::Rgb(bg.r, bg.g, bg.b)),
                        );
                    }
                }
                _ => self.push(
                    line.trim_end_matches(['\n', '\r']).to_string(),
                    self.theme.code,
                ),
            }
            self.flush_line(true);
        }
    }

    fn push(&mut self, text: String, style: Style) {
        self.spans.push(Span::styled(text, style));
    }

    fn flush(&mut self) {
        self.flush_line(false);
    }

    fn flush_line(&mut self, force: bool) {
        if self.spans.is_empty() && !force {
            return;
        }
        self.lines.push(Line::from(std::mem::take(&mut self.spans)));
    }

    // At most one blank line between blocks, none at the top
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn render(source: &str, mode: DisplayMode) -> (Vec<Line<'static>>, Theme) {
        let theme = Theme::for_mode(mode);
        (ChunkRenderer::new().render(source, mode, &theme), theme)
    }

    #[test]
    fn test_heading_and_paragraph() {
        let (lines, theme) = render("## Chunk 4\n\nParagraph text.", DisplayMode::Dark);

        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(text, vec!["Chunk 4", "", "Paragraph text."]);
        assert_eq!(lines[0].spans[0].style, theme.heading);
        assert_eq!(lines[2].spans[0].style, theme.normal);
    }

    #[test]
    fn test_hash_inside_code_block_is_not_a_heading() {
        let (lines, theme) = render("~~~python\n# compute total\nx = 1\n~~~", DisplayMode::Dark);

        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(text, vec!["# compute total", "x = 1"]);
        for line in &lines {
            for span in &line.spans {
                assert_ne!(span.style, theme.heading);
                assert!(matches!(span.style.fg, Some(Color::Rgb(..))));
            }
        }
    }

    #[test]
    fn test_code_colors_follow_display_mode() {
        let source = "```rust\nfn main() {}\n```";
        let (dark, _) = render(source, DisplayMode::Dark);
        let (light, _) = render(source, DisplayMode::Light);

        assert_eq!(plain(&dark[0]), "fn main() {}");
        assert_eq!(plain(&light[0]), "fn main() {}");
        assert_ne!(dark[0].spans[0].style.bg, light[0].spans[0].style.bg);
    }

    #[test]
    fn test_inline_markup() {
        let (lines, theme) = render("Use **bold** and `code` here.", DisplayMode::Dark);

        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "Use bold and code here.");

        let bold = lines[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));

        let code = lines[0].spans.iter().find(|s| s.content == "code").unwrap();
        assert_eq!(code.style, theme.code);
    }

    #[test]
    fn test_lists() {
        let (lines, _) = render("- one\n- two\n\n1. first\n2. second", DisplayMode::Light);

        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(text, vec!["- one", "- two", "", "1. first", "2. second"]);
    }

    #[test]
    fn test_unknown_language_still_renders() {
        let (lines, _) = render("```nosuchlang\nplain words\n```", DisplayMode::Dark);
        assert_eq!(plain(&lines[0]), "plain words");
    }
}
