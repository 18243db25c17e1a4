mod config;
mod error;
mod input;
mod transport;

use clap::{Parser, Subcommand};
use error::CliError;
use shared::{ClientConfig, DetectionResult, FileValidator, SubmissionController, SubmissionState};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use transport::{ReqwestTransport, TokioTimer};

#[derive(Parser)]
#[command(name = "leafscan", version, about = "Mango leaf disease and deficiency detection client")]
struct Cli {
    /// Service base URL
    #[arg(long, global = true, env = "LEAFSCAN_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a leaf image and print the diagnosis
    Analyze {
        path: PathBuf,
        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,
        /// Do not draw the progress bar
        #[arg(long, short)]
        quiet: bool,
    },
    /// Check that the service is up and its model is loaded
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let cli = Cli::parse();

    let outcome = match resolve_config(cli.base_url) {
        Ok(config) => match cli.command {
            Command::Analyze { path, json, quiet } => analyze(config, path, json, quiet).await,
            Command::Health => health(config).await,
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(base_url: Option<String>) -> Result<ClientConfig, CliError> {
    let mut config = config::load()?;
    if let Some(base_url) = base_url {
        config.submission.base_url = base_url;
        config.validate()?;
    }
    Ok(config)
}

async fn analyze(
    config: ClientConfig,
    path: PathBuf,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let validator = FileValidator::new(config.upload);
    let candidate = input::load_candidate(&path, &validator).await?;
    let file = validator.validate(candidate).into_result()?;

    let transport = ReqwestTransport::new(&config.submission)?;
    let controller = SubmissionController::new(transport, TokioTimer, config.submission);
    if !quiet {
        controller.subscribe(draw_progress);
    }

    let result = controller.submit(&file).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn draw_progress(state: &SubmissionState) {
    let mut stderr = std::io::stderr();
    match state {
        SubmissionState::Submitting { progress } => {
            let filled = usize::from(*progress) / 5;
            let _ = write!(
                stderr,
                "\rAnalyzing [{:<20}] {:>3}%",
                "#".repeat(filled),
                progress
            );
        }
        SubmissionState::Succeeded(_) | SubmissionState::Failed(_) => {
            let _ = writeln!(stderr);
        }
        _ => {}
    }
    let _ = stderr.flush();
}

fn print_result(result: &DetectionResult) {
    println!("{}", result.to_report());
    if !result.top_predictions.is_empty() {
        println!();
        println!("Top Predictions:");
        for (rank, prediction) in result.top_predictions.iter().enumerate() {
            println!(
                "  {}. {} ({}%, {})",
                rank + 1,
                prediction.class_name,
                prediction.confidence_percent,
                prediction.category
            );
        }
    }
}

async fn health(config: ClientConfig) -> Result<(), CliError> {
    let url = config.submission.health_endpoint();
    let transport = ReqwestTransport::new(&config.submission)?;
    let health = transport::fetch_health(transport.http_client(), &url).await?;

    match health.classes {
        Some(classes) => println!(
            "{}: model loaded = {}, classes = {}",
            url, health.model_loaded, classes
        ),
        None => println!("{}: model loaded = {}", url, health.model_loaded),
    }
    if health.model_loaded {
        Ok(())
    } else {
        Err(CliError::ModelNotLoaded(url))
    }
}
