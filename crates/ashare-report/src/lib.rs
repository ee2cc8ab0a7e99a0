//! Report rendering: Markdown body to PDF with HTML fallback
//!
//! PDF generation shells out to whichever external engine is installed
//! (`weasyprint`, then `wkhtmltopdf`); when neither works the styled HTML
//! document is kept instead, and the raw Markdown is always written as a
//! sidecar file.

pub mod error;
pub mod renderer;

pub use error::{ReportError, Result};
pub use renderer::{DocumentFormat, PdfEngine, RenderedReport, ReportRenderer};
