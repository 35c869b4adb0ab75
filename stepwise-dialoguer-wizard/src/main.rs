//! stepwise-wizard - answer the builtin survey in the terminal.
//!
//! Submits to a running `stepwise-server` with `--server`, or straight to
//! Google Sheets using the same environment variables as the server.

use clap::Parser;
use dialoguer::Confirm;
use stepwise::{Session, SubmitError, Submitter, Survey, run};
use stepwise_dialoguer_wizard::{DialoguerBackend, HttpSubmitter};
use stepwise_sheets::SubmissionService;

#[derive(Debug, Parser)]
#[command(version, about = "Answer the survey one question at a time")]
struct Args {
    /// Base URL of a stepwise-server; submits to Google Sheets directly if omitted
    #[arg(long, env = "STEPWISE_SERVER_URL")]
    server: Option<String>,

    /// Disable colors
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();
    let survey = Survey::builtin()?;
    let submitter: Box<dyn Submitter> = match &args.server {
        Some(url) => Box::new(HttpSubmitter::new(url)),
        None => Box::new(SubmissionService::from_env(&survey)),
    };

    let mut backend = if args.plain {
        DialoguerBackend::plain()
    } else {
        DialoguerBackend::new()
    };
    let mut session = Session::new(&survey);

    match run(&mut session, &mut backend) {
        Ok(()) => {}
        Err(err) if err.is_cancelled() => {
            println!("Survey cancelled.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }

    loop {
        println!("Submitting...");
        match session.submit(submitter.as_ref()).await {
            Ok(()) => {
                if let Some(epilogue) = &survey.epilogue {
                    println!();
                    println!("{epilogue}");
                }
                return Ok(());
            }
            Err(SubmitError::Validation(errors)) => {
                for (id, message) in errors.iter() {
                    eprintln!("  {id}: {message}");
                }
                anyhow::bail!("the answers were rejected");
            }
            Err(err) if err.is_retryable() => {
                eprintln!("Submission failed: {err}");
                let again = Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !again {
                    anyhow::bail!("submission abandoned");
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
}
