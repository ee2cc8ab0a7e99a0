//! Command-line interface for the A-share analyst
//!
//! `ashare-analyst 600519` gathers market data through the tool layer,
//! asks the model for a structured report, and renders it to PDF (or HTML
//! when no PDF engine is installed).

mod config;

use anyhow::{Context, Result, bail};
use ashare_agent::{AgentExecutor, OpenAiConfig, OpenAiProvider, prompt};
use ashare_market::tools::register_market_tools;
use ashare_market::{CategoryResult, MarketData};
use ashare_report::{DocumentFormat, PdfEngine, ReportRenderer};
use ashare_tools::ToolRegistry;
use clap::Parser;
use config::AppConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ashare-analyst")]
#[command(about = "Generate an analyst report for a China A-share stock", long_about = None)]
struct Args {
    /// 6-digit A-share stock code, e.g. 600519
    symbol: String,

    /// Config file path
    #[arg(short, long, default_value = "ashare.toml")]
    config: PathBuf,

    /// Override the report output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Override the model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Fetch and print the category records as JSON instead of writing a
    /// report
    #[arg(long)]
    data_only: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.len() != 6 || !symbol.bytes().all(|b| b.is_ascii_digit()) {
        bail!("'{symbol}' is not a valid A-share code; expected 6 digits like 600519");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    validate_symbol(&args.symbol)?;

    let mut config = AppConfig::load(&args.config)?;
    if let Some(model) = args.model {
        config.model.model_name = model;
    }
    if let Some(output_dir) = &args.output_dir {
        config.report.output_dir = output_dir.display().to_string();
    }

    let market_config = config.market_config()?;
    let market = Arc::new(MarketData::new(&market_config)?);

    if args.data_only {
        return dump_categories(&market, &args.symbol).await;
    }

    let registry = Arc::new(ToolRegistry::new());
    register_market_tools(&registry, &market);
    info!(tool_count = registry.len(), "market tools registered");

    let api_key = std::env::var(&config.model.api_key_env).with_context(|| {
        format!(
            "API key environment variable {} is not set",
            config.model.api_key_env
        )
    })?;

    let provider = OpenAiProvider::with_config(
        OpenAiConfig::new(api_key).with_api_base(config.model.base_url.clone()),
    )?;

    let executor = AgentExecutor::builder()
        .provider(Arc::new(provider))
        .tool_registry(Arc::clone(&registry))
        .model(config.model.model_name.clone())
        .system_prompt(prompt::SYSTEM_PROMPT)
        .max_tokens(config.model.max_tokens)
        .temperature(config.model.temperature)
        .build()?;

    info!(symbol = %args.symbol, model = %config.model.model_name, "generating report");
    let task = prompt::report_task(&args.symbol)?;
    let report_text = executor.run(task).await?;

    if report_text.trim().is_empty() {
        bail!("model returned an empty report for {}", args.symbol);
    }

    let engines: Vec<PdfEngine> = config
        .report
        .engines
        .iter()
        .filter_map(|name| {
            let engine = PdfEngine::parse(name);
            if engine.is_none() {
                warn!(engine = %name, "unknown PDF engine in config, skipping");
            }
            engine
        })
        .collect();

    let renderer = ReportRenderer::new(&config.report.output_dir, engines);
    let rendered = renderer.render(&args.symbol, &report_text).await?;

    match rendered.format {
        DocumentFormat::Pdf => {
            println!("PDF report saved to {}", rendered.document.display());
        }
        DocumentFormat::Html => {
            println!(
                "No PDF engine available; HTML report saved to {}",
                rendered.document.display()
            );
        }
    }
    println!("Markdown source saved to {}", rendered.markdown.display());

    Ok(())
}

/// Print every category record as pretty JSON, skipping the agent entirely
async fn dump_categories(market: &MarketData, symbol: &str) -> Result<()> {
    fn print_record<T: serde::Serialize>(name: &str, result: &CategoryResult<T>) {
        println!("=== {name} ===");
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_value()).unwrap_or_default()
        );
    }

    print_record("valuation", &market.valuation(symbol).await);
    print_record("company_info", &market.company_info(symbol).await);
    print_record(
        "financial_indicators",
        &market.financial_indicators(symbol).await,
    );
    print_record("price_history", &market.price_history(symbol).await);
    print_record("live_quote", &market.live_quote(symbol).await);
    print_record("risk_indicators", &market.risk_indicators(symbol).await);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_validation() {
        assert!(validate_symbol("600519").is_ok());
        assert!(validate_symbol("000001").is_ok());
        assert!(validate_symbol("60051").is_err());
        assert!(validate_symbol("6005190").is_err());
        assert!(validate_symbol("ABCDEF").is_err());
        assert!(validate_symbol("600.19").is_err());
    }
}
