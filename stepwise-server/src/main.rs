//! stepwise-server - submit endpoint for the builtin survey.
//!
//! Reads config from env vars (`.env.local` and `.env` are loaded first):
//!   GOOGLE_SHEET_ID, GOOGLE_CLIENT_EMAIL, GOOGLE_PRIVATE_KEY - sheet credentials
//!   STEPWISE_SHEET_TAB - target tab (default: Sheet1)
//!   STEPWISE_BIND_ADDR - listen address (default: 0.0.0.0:3000)
//!   RUST_LOG           - log filter (default: info,stepwise=debug)

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stepwise::Survey;
use stepwise_server::{AppState, build_router};
use stepwise_sheets::{SubmissionService, sync_headers, verify};
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Serve the stepwise survey and manage its response sheet"
)]
struct Cli {
    /// Listen address
    #[arg(
        long,
        global = true,
        env = "STEPWISE_BIND_ADDR",
        default_value = "0.0.0.0:3000"
    )]
    bind: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Overwrite row 1 of the sheet with the expected headers
    SyncHeaders,

    /// Submit a sample answer set and check that it lands in the sheet
    Verify,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stepwise=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let survey = Arc::new(Survey::builtin().context("builtin catalog is invalid")?);
    let service = SubmissionService::from_env(&survey);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let bind = cli.bind;
            let app = build_router(AppState::new(survey, service));
            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("failed to bind to {bind}"))?;
            tracing::info!("stepwise-server listening on {bind}");
            axum::serve(listener, app).await.context("server error")?;
        }
        Command::SyncHeaders => {
            let sink = service
                .sink()
                .map_err(|err| anyhow::anyhow!("Google Sheets is not configured: {err}"))?;
            sync_headers(sink.as_ref(), service.layout()).await?;
            println!("Headers updated ({} columns)", service.layout().width());
        }
        Command::Verify => {
            let report = verify(&service, &survey).await?;
            println!(
                "Row count increased from {} to {}. Submission pipeline is working.",
                report.rows_before, report.rows_after
            );
        }
    }

    Ok(())
}
