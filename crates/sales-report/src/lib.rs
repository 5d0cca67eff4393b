//! Presentation layer for the sales dashboard.
//!
//! Renders a computed snapshot three ways: an ANSI-free terminal view, a
//! plain-text executive summary and a PDF of the same summary.

pub mod pdf;
pub mod render;
pub mod text;

pub use pdf::render_pdf_report;
pub use render::render_dashboard;
pub use text::render_text_report;
