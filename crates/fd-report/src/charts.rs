use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use fd_core::{ChaosBand, ImpactMetrics};
use ratatui::{
    Frame, Terminal, TerminalOptions, Viewport,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
};

use crate::document::format_score;

/// Rows the inline dashboard occupies
pub const DASHBOARD_HEIGHT: u16 = 18;

const BANDS: [ChaosBand; 4] = [
    ChaosBand::Low,
    ChaosBand::Moderate,
    ChaosBand::High,
    ChaosBand::Extreme,
];

const ADDITION_COLOR: Color = Color::Rgb(0x4C, 0xAF, 0x50);
const REMOVAL_COLOR: Color = Color::Rgb(0xF4, 0x43, 0x36);
const INPUT_COLOR: Color = Color::Rgb(0x21, 0x96, 0xF3);
const OUTPUT_COLOR: Color = Color::Rgb(0xFF, 0x98, 0x00);
const FORWARD_COLOR: Color = Color::Rgb(0x9C, 0x27, 0xB0);

/// Draw the charts inline below the report on the real terminal
pub fn show_dashboard(metrics: &ImpactMetrics) -> Result<()> {
    if !io::stdout().is_terminal() {
        bail!("stdout is not a terminal");
    }

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(DASHBOARD_HEIGHT),
        },
    )?;

    terminal.draw(|f| {
        let area = f.area();
        draw_dashboard(f, area, metrics);
    })?;
    println!();

    Ok(())
}

pub fn draw_dashboard(f: &mut Frame, area: Rect, metrics: &ImpactMetrics) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(6)])
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let changes = [
        bar("Additions", metrics.additions, ADDITION_COLOR),
        bar("Removals", metrics.removals, REMOVAL_COLOR),
    ];
    f.render_widget(bar_chart("Rule Changes", &changes), charts[0]);

    let chains = [
        bar("INPUT", metrics.input_changes, INPUT_COLOR),
        bar("OUTPUT", metrics.output_changes, OUTPUT_COLOR),
        bar("FORWARD", metrics.forward_changes, FORWARD_COLOR),
    ];
    f.render_widget(bar_chart("Changes by Chain", &chains), charts[1]);

    render_chaos_gauge(f, rows[1], metrics);
}

fn bar(label: &'static str, value: usize, color: Color) -> Bar<'static> {
    Bar::default()
        .label(label.into())
        .value(value as u64)
        .style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
}

fn bar_chart<'a>(title: &'a str, bars: &'a [Bar<'a>]) -> BarChart<'a> {
    BarChart::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .data(BarGroup::default().bars(bars))
        .bar_width(9)
        .bar_gap(2)
}

fn render_chaos_gauge(f: &mut Frame, area: Rect, metrics: &ImpactMetrics) {
    let (r, g, b) = metrics.band.rgb();
    let color = Color::Rgb(r, g, b);

    let block = Block::default()
        .title("Chaos Index (Impact Assessment)")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::DarkGray))
        .ratio((metrics.chaos_score / 100.0).clamp(0.0, 1.0))
        .label(format!("{}/100", format_score(metrics.chaos_score)));
    f.render_widget(gauge, lines[0]);

    f.render_widget(
        Paragraph::new(threshold_ruler(lines[1].width)).style(Style::default().fg(Color::Gray)),
        lines[1],
    );
    f.render_widget(Paragraph::new(band_labels(lines[2].width)), lines[2]);

    let assessment = Line::from(vec![
        Span::styled(
            format!("{} impact: ", metrics.band.label()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(metrics.band.description()),
    ]);
    f.render_widget(Paragraph::new(assessment), lines[3]);
}

/// Horizontal rule with a tick under each band threshold
pub fn threshold_ruler(width: u16) -> String {
    let width = width as usize;
    let mut cells = vec!['─'; width];
    for threshold in ChaosBand::THRESHOLDS {
        let idx = (width as f64 * threshold / 100.0) as usize;
        if idx < width {
            cells[idx] = '┼';
        }
    }
    cells.into_iter().collect()
}

/// Band names centred in their quarter of the ruler
pub fn band_labels(width: u16) -> String {
    let width = width as usize;
    let mut cells = vec![' '; width];
    for (i, band) in BANDS.iter().enumerate() {
        let label: Vec<char> = band.label().chars().collect();
        let center = width * (2 * i + 1) / 8;
        let start = center.saturating_sub(label.len() / 2);
        for (offset, c) in label.into_iter().enumerate() {
            if let Some(cell) = cells.get_mut(start + offset) {
                *cell = c;
            }
        }
    }
    cells.into_iter().collect::<String>().trim_end().to_string()
}
