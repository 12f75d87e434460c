use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize, style};
use tracing::info;

use crate::document::{Block, ReportDocument, Span, Tone};

/// File flavours: `--export` writes HTML, `--output` writes plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Html,
}

pub trait Renderer {
    fn render(&self, doc: &ReportDocument) -> String;
}

/// ANSI styled output for a terminal
pub struct ConsoleRenderer {
    color: bool,
}

impl ConsoleRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn print(&self, doc: &ReportDocument) {
        print!("{}", self.render(doc));
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&self, doc: &ReportDocument) -> String {
        render_lines(doc, |seg| {
            if self.color {
                paint(&seg.text, seg.tone)
            } else {
                seg.text.clone()
            }
        })
    }
}

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, doc: &ReportDocument) -> String {
        render_lines(doc, |seg| seg.text.clone())
    }
}

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, doc: &ReportDocument) -> String {
        let body = render_lines(doc, |seg| match css_class(seg.tone) {
            Some(class) => format!("<span class=\"{}\">{}</span>", class, escape_html(&seg.text)),
            None => escape_html(&seg.text),
        });

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>fwdelta report</title>\n<style>\n{}</style>\n</head>\n<body>\n<pre>\n{}</pre>\n</body>\n</html>\n",
            HTML_STYLE, body
        )
    }
}

const HTML_STYLE: &str = "body { background: #1e1e1e; color: #d4d4d4; }
pre { font-family: monospace; font-size: 14px; }
.dim { color: #808080; }
.strong { font-weight: bold; }
.title { color: #00bcd4; font-weight: bold; }
.heading { color: #e040fb; font-weight: bold; }
.hunk { color: #00bcd4; }
.added { color: #4caf50; }
.removed { color: #f44336; }
.danger { color: #f44336; font-weight: bold; }
.warning { color: #ffc107; font-weight: bold; }
.success { color: #4caf50; font-weight: bold; }
.info { color: #2196f3; font-weight: bold; }
";

pub fn export(doc: &ReportDocument, path: &Path, format: ExportFormat) -> Result<()> {
    let contents = match format {
        ExportFormat::Html => HtmlRenderer.render(doc),
        ExportFormat::Text => TextRenderer.render(doc),
    };

    fs::write(path, contents)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    info!(path = %path.display(), ?format, "exported report");
    Ok(())
}

/// A run of text with a single tone, already laid out
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    tone: Tone,
}

impl Segment {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

fn render_lines(doc: &ReportDocument, mut style_segment: impl FnMut(&Segment) -> String) -> String {
    let mut out = String::new();
    for line in layout(doc) {
        for seg in &line {
            out.push_str(&style_segment(seg));
        }
        out.push('\n');
    }
    out
}

fn layout(doc: &ReportDocument) -> Vec<Vec<Segment>> {
    let mut lines = Vec::new();

    for block in doc.blocks() {
        match block {
            Block::Panel { text, tone } => layout_panel(&mut lines, text, *tone),
            Block::Table { headers, rows } => layout_table(&mut lines, headers, rows),
            Block::Line(spans) => lines.push(
                spans
                    .iter()
                    .map(|s| Segment::new(s.text.clone(), s.tone))
                    .collect(),
            ),
            Block::Blank => lines.push(Vec::new()),
        }
    }

    lines
}

fn layout_panel(lines: &mut Vec<Vec<Segment>>, text: &str, tone: Tone) {
    let rule = "─".repeat(width(text) + 2);
    lines.push(vec![Segment::new(format!("╭{}╮", rule), Tone::Dim)]);
    lines.push(vec![
        Segment::new("│ ", Tone::Dim),
        Segment::new(text, tone),
        Segment::new(" │", Tone::Dim),
    ]);
    lines.push(vec![Segment::new(format!("╰{}╯", rule), Tone::Dim)]);
}

fn layout_table(lines: &mut Vec<Vec<Segment>>, headers: &[String], rows: &[Vec<Span>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(width(&cell.text));
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        vec![Segment::new(
            format!("{}{}{}", left, inner.join(mid), right),
            Tone::Dim,
        )]
    };

    let row_line = |cells: Vec<Segment>| {
        let mut line = vec![Segment::new("│", Tone::Dim)];
        for (cell, w) in cells.into_iter().zip(&widths) {
            let pad = w - width(&cell.text);
            line.push(Segment::new(" ", Tone::Plain));
            line.push(cell);
            line.push(Segment::new(format!("{} ", " ".repeat(pad)), Tone::Plain));
            line.push(Segment::new("│", Tone::Dim));
        }
        line
    };

    lines.push(border("┌", "┬", "┐"));
    lines.push(row_line(
        headers
            .iter()
            .map(|h| Segment::new(h.clone(), Tone::Heading))
            .collect(),
    ));
    lines.push(border("├", "┼", "┤"));
    for row in rows {
        let mut cells: Vec<Segment> = row
            .iter()
            .take(widths.len())
            .map(|s| Segment::new(s.text.clone(), s.tone))
            .collect();
        cells.resize(widths.len(), Segment::new("", Tone::Plain));
        lines.push(row_line(cells));
    }
    lines.push(border("└", "┴", "┘"));
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn paint(text: &str, tone: Tone) -> String {
    let styled = style(text);
    let styled = match tone {
        Tone::Plain => return text.to_string(),
        Tone::Dim => styled.dim(),
        Tone::Strong => styled.bold(),
        Tone::Title => styled.cyan().bold(),
        Tone::Heading => styled.magenta().bold(),
        Tone::Hunk => styled.cyan(),
        Tone::Added => styled.green(),
        Tone::Removed => styled.red(),
        Tone::Danger => styled.red().bold(),
        Tone::Warning => styled.yellow().bold(),
        Tone::Success => styled.green().bold(),
        Tone::Info => styled.with(Color::Blue).bold(),
    };
    styled.to_string()
}

fn css_class(tone: Tone) -> Option<&'static str> {
    match tone {
        Tone::Plain => None,
        Tone::Dim => Some("dim"),
        Tone::Strong => Some("strong"),
        Tone::Title => Some("title"),
        Tone::Heading => Some("heading"),
        Tone::Hunk => Some("hunk"),
        Tone::Added => Some("added"),
        Tone::Removed => Some("removed"),
        Tone::Danger => Some("danger"),
        Tone::Warning => Some("warning"),
        Tone::Success => Some("success"),
        Tone::Info => Some("info"),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
