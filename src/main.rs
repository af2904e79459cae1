use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use findings_bridge::logging::{LogConfig, init_logging};
use findings_bridge::replay::{load_findings, load_uri_map, replay};
use findings_bridge::session::{Session, hover_capabilities};
use findings_bridge::{SessionConfig, SessionConfigBuilder};
use lsp_types::MarkupKind;
use tracing::info;

/// Replay recorded analysis findings and print the resulting protocol state
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Findings JSON file, or a directory searched for *.json files
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// JSON file of {"server": ..., "client": ...} URI mappings
    #[arg(long, value_name = "FILE")]
    uri_map: Option<PathBuf>,

    /// Pretend the client renders markdown hovers
    #[arg(long)]
    markdown_hover: bool,

    /// Offer "report as false alarm" actions (overrides BRIDGE_REPORT_FALSE_POSITIVE)
    #[arg(long)]
    report_false_positive: bool,

    /// Offer "I don't understand" actions (overrides BRIDGE_REPORT_CONFUSION)
    #[arg(long)]
    report_confusion: bool,

    /// Diagnostic source label (overrides BRIDGE_SOURCE)
    #[arg(long, value_name = "NAME")]
    source: Option<String>,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log file path (overrides BRIDGE_LOG_FILE env var)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Environment configuration with CLI flags applied on top
fn session_config(args: &Args) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let env_config = SessionConfig::from_env();
    let report_false_positive =
        args.report_false_positive || env_config.feedback.report_false_positive;
    let report_confusion = args.report_confusion || env_config.feedback.report_confusion;

    let mut builder = SessionConfigBuilder::from_config(env_config)
        .report_false_positive(report_false_positive)
        .report_confusion(report_confusion);
    if let Some(source) = &args.source {
        builder = builder.source_label(source.clone());
    }
    Ok(builder.build()?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_config =
        LogConfig::from_env().with_overrides(args.log_level.clone(), args.log_file.clone());
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = session_config(&args)?;
    let hover_formats = if args.markdown_hover {
        vec![MarkupKind::Markdown, MarkupKind::PlainText]
    } else {
        vec![MarkupKind::PlainText]
    };
    let session = Arc::new(Session::new(config, hover_capabilities(hover_formats)));
    info!("Session ready: {:?}", session);

    if let Some(uri_map) = &args.uri_map {
        let count = load_uri_map(uri_map, session.uri_map())?;
        info!("Registered {} URI mappings from {}", count, uri_map.display());
    }

    let findings = load_findings(&args.input)?;
    let snapshot = replay(&session, &findings);

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
