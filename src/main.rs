use clap::{Parser, Subcommand};
use cost_analyzer::api::{create_router, AppState};
use cost_analyzer::config::{config_path, ensure_initialized, load_config};
use cost_analyzer::currency::format_for;
use cost_analyzer::error::AppError;
use cost_analyzer::models::{CostQuery, CostReport, ExportFormat, ExportRequest};
use cost_analyzer::render::{self, column_headers, table_rows, SymbolSet};
use cost_analyzer::validate::{parse_date_range, validate_credentials};
use cost_analyzer::AppConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "cost-analyzer")]
#[command(about = "AWS cost breakdown with currency conversion, alerts and exports")]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the default config file if none exists.
    Init,
    /// Run the web interface.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch one report using AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY.
    Report {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        region: Option<String>,
        /// Also export the report: xlsx or pdf.
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_export_format(input: Option<&str>) -> Result<Option<ExportFormat>, AppError> {
    match input {
        None => Ok(None),
        Some(raw) => ExportFormat::parse(raw).map(Some).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported export format '{raw}'. Use xlsx or pdf."
            ))
        }),
    }
}

fn print_report(report: &CostReport, cfg: &AppConfig) {
    let currency = &cfg.currency;
    let [service, primary, secondary] = column_headers(currency);
    println!("AWS cost report {} ({})", report.range, report.region);
    println!("{service:<50} {primary:>16} {secondary:>18}");
    for row in table_rows(&report.line_items, currency, SymbolSet::Unicode) {
        println!("{:<50} {:>16} {:>18}", row.service, row.primary, row.secondary);
    }
    println!(
        "Total: {} ({})",
        format_for(report.total_secondary, &currency.secondary),
        format_for(report.total_primary, &currency.primary)
    );
    println!(
        "Status: {}",
        if report.alert_triggered {
            "ALERT, above threshold"
        } else {
            "within threshold"
        }
    );
    println!(
        "Notification: {}",
        if report.notification.sent { "sent" } else { "not sent" }
    );
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "cost_analyzer=debug,tower_http=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            let path = ensure_initialized()?;
            println!("Initialized cost-analyzer config at {}", path.display());
        }
        Commands::Serve { host, port } => {
            let mut cfg = load_config()?;
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if !cfg.alerts.topic_configured() {
                let path = config_path()?;
                tracing::warn!(
                    config = %path.display(),
                    "alerts.topic_arn is still the placeholder; notifications are disabled"
                );
            }

            let addr = cfg.server_address();
            let app = create_router(AppState::with_aws(cfg));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Commands::Report {
            start,
            end,
            region,
            format,
            output,
        } => {
            let range = parse_date_range(Some(&start), Some(&end))?;
            let export_format = parse_export_format(format.as_deref())?;
            let cfg = load_config()?;

            let key_id = std::env::var("AWS_ACCESS_KEY_ID").ok();
            let secret = std::env::var("AWS_SECRET_ACCESS_KEY").ok();
            let region = region.unwrap_or_else(|| cfg.default_region.clone());
            let (credentials, region) =
                validate_credentials(key_id.as_deref(), secret.as_deref(), Some(&region))?;

            let state = AppState::with_aws(cfg);
            let report = state
                .service
                .fetch(&CostQuery {
                    credentials,
                    region,
                    range,
                })
                .await?;
            print_report(&report, &state.config);

            if let Some(export_format) = export_format {
                let request = ExportRequest {
                    line_items: report.line_items.clone(),
                    range: report.range,
                    total_secondary: report.total_secondary,
                };
                let file = render::export(export_format, &request, &state.config.currency)?;
                let path = output.unwrap_or_else(|| PathBuf::from(&file.filename));
                std::fs::write(&path, &file.bytes)?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_export_format_accepts_known_values() {
        assert_eq!(
            parse_export_format(Some("xlsx")).expect("xlsx"),
            Some(ExportFormat::Spreadsheet)
        );
        assert_eq!(
            parse_export_format(Some("pdf")).expect("pdf"),
            Some(ExportFormat::Document)
        );
        assert_eq!(parse_export_format(None).expect("none"), None);
    }

    #[test]
    fn parse_export_format_rejects_unknown_values() {
        let err = parse_export_format(Some("csv")).expect_err("expected format error");
        assert!(err.to_string().contains("Unsupported export format"));
    }
}
