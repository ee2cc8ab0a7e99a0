//! Markdown report rendering with PDF engine fallback
//!
//! The agent produces Markdown; this module turns it into a styled HTML
//! document and tries each configured external PDF engine in order. When no
//! engine succeeds the HTML itself becomes the deliverable. A Markdown
//! sidecar is always written next to the document so the raw report text
//! survives regardless of the rendering outcome.

use crate::error::Result;
use chrono::Local;
use pulldown_cmark::{Options, Parser, html};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

const HTML_SHELL: &str = include_str!("../templates/report.html.j2");

/// External HTML-to-PDF engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfEngine {
    WeasyPrint,
    WkHtmlToPdf,
}

impl PdfEngine {
    /// Executable name looked up on PATH
    pub fn command(self) -> &'static str {
        match self {
            Self::WeasyPrint => "weasyprint",
            Self::WkHtmlToPdf => "wkhtmltopdf",
        }
    }

    fn args(self, input: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::new();
        if self == Self::WkHtmlToPdf {
            args.push("--quiet".into());
        }
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Parse an engine name as it appears in config files
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "weasyprint" => Some(Self::WeasyPrint),
            "wkhtmltopdf" => Some(Self::WkHtmlToPdf),
            _ => None,
        }
    }
}

/// Output format actually produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Html,
}

/// Paths produced by one render call
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Main document (`.pdf` or `.html`)
    pub document: PathBuf,

    /// Markdown sidecar, always written
    pub markdown: PathBuf,

    /// Format of the main document
    pub format: DocumentFormat,
}

/// Renders analyst reports into an output directory
pub struct ReportRenderer {
    output_dir: PathBuf,
    engines: Vec<PdfEngine>,
}

impl ReportRenderer {
    /// Create a renderer trying `engines` in order before the HTML fallback
    pub fn new(output_dir: impl Into<PathBuf>, engines: Vec<PdfEngine>) -> Self {
        Self {
            output_dir: output_dir.into(),
            engines,
        }
    }

    /// Renderer with the default engine order
    pub fn with_defaults(output_dir: impl Into<PathBuf>) -> Self {
        Self::new(output_dir, vec![PdfEngine::WeasyPrint, PdfEngine::WkHtmlToPdf])
    }

    /// Render one report; file names follow `Report_{symbol}_{YYYYMMDD}`
    pub async fn render(&self, symbol: &str, markdown: &str) -> Result<RenderedReport> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let stem = format!("Report_{symbol}_{}", Local::now().format("%Y%m%d"));

        let markdown_path = self.output_dir.join(format!("{stem}.md"));
        tokio::fs::write(&markdown_path, markdown).await?;
        debug!(path = %markdown_path.display(), "markdown sidecar written");

        let html_document = render_html_document(symbol, markdown)?;

        if let Some(pdf_path) = self.try_pdf_engines(&stem, &html_document).await? {
            info!(path = %pdf_path.display(), "report rendered as PDF");
            return Ok(RenderedReport {
                document: pdf_path,
                markdown: markdown_path,
                format: DocumentFormat::Pdf,
            });
        }

        let html_path = self.output_dir.join(format!("{stem}.html"));
        tokio::fs::write(&html_path, &html_document).await?;
        info!(path = %html_path.display(), "report rendered as HTML (no PDF engine succeeded)");

        Ok(RenderedReport {
            document: html_path,
            markdown: markdown_path,
            format: DocumentFormat::Html,
        })
    }

    /// Run each engine against a temp copy of the HTML; first success wins
    async fn try_pdf_engines(&self, stem: &str, html_document: &str) -> Result<Option<PathBuf>> {
        if self.engines.is_empty() {
            return Ok(None);
        }

        let input = tempfile::Builder::new().suffix(".html").tempfile()?;
        std::fs::write(input.path(), html_document)?;

        let pdf_path = self.output_dir.join(format!("{stem}.pdf"));

        for engine in &self.engines {
            debug!(engine = engine.command(), "trying PDF engine");

            let status = Command::new(engine.command())
                .args(engine.args(input.path(), &pdf_path))
                .status()
                .await;

            match status {
                Ok(status) if status.success() && pdf_path.exists() => {
                    return Ok(Some(pdf_path));
                }
                Ok(status) => {
                    warn!(engine = engine.command(), %status, "PDF engine failed");
                }
                Err(e) => {
                    warn!(engine = engine.command(), error = %e, "PDF engine not runnable");
                }
            }
        }

        Ok(None)
    }
}

/// Convert the Markdown body and wrap it in the styled HTML shell
fn render_html_document(symbol: &str, markdown: &str) -> Result<String> {
    let mut env = minijinja::Environment::new();
    env.add_template("report.html", HTML_SHELL)?;

    let body = markdown_to_html(markdown);
    let rendered = env.get_template("report.html")?.render(minijinja::context! {
        title => format!("Stock Analysis Report {symbol}"),
        symbol => symbol,
        generated => Local::now().format("%Y-%m-%d %H:%M").to_string(),
        body => body,
    })?;

    Ok(rendered)
}

/// Markdown to HTML with table support
fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
