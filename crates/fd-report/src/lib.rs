pub mod charts;
pub mod document;
pub mod render;

pub use charts::{DASHBOARD_HEIGHT, draw_dashboard, show_dashboard};
pub use document::{Block, REPORT_TITLE, ReportDocument, Span, Tone, format_score};
pub use render::{ConsoleRenderer, ExportFormat, HtmlRenderer, Renderer, TextRenderer, export};
