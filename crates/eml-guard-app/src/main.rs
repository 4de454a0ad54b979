#![warn(missing_docs)]
//! # eml-guard binary
//!
//! Terminal shell for eml-guard. Each subcommand plays one or both pages.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use eml_guard_analysis_contract::AnalysisOutcome;
use eml_guard_app::config::parse_timeout_secs;
use eml_guard_app::pages::{LoadOutcome, Page, ResultPage, SourcePage, SubmitOutcome};
use eml_guard_app::{
    APP_VERSION, AppConfig, AppError, build_client, in_memory_store, init_logging,
    open_session_store, unix_timestamp_millis,
};
use eml_guard_handoff::CrossPageStore;
use serde_json::json;

const EXIT_ERROR_VIEW: u8 = 1;
const EXIT_NOT_SUBMITTED: u8 = 2;
const EXIT_NOTHING_PENDING: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "eml-guard", version = APP_VERSION, about = "Check .eml files for phishing")]
struct Cli {
    /// Analysis endpoint URL (overrides EML_GUARD_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Session (tab) id for upload/result/reset (overrides EML_GUARD_SESSION).
    #[arg(long, global = true)]
    session: Option<String>,
    /// Directory of tab stores (overrides EML_GUARD_STORE_DIR).
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
    /// HTTP timeout in seconds (overrides EML_GUARD_HTTP_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload and analyze a file in one go.
    Analyze {
        /// Path to the .eml file.
        file: PathBuf,
    },
    /// Validate and store a file for the session's result page.
    Upload {
        /// Path to the .eml file.
        file: PathBuf,
    },
    /// Analyze the file pending in the session.
    Result,
    /// Discard the session's pending file ("analyze another").
    Reset,
    /// Probe the analysis service health endpoint.
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// CLI entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("eml-guard: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = resolve_config(&cli)?;
    tracing::debug!(stage = "startup", action = "config", ?config, "eml-guard {APP_VERSION}");

    match &cli.command {
        Command::Analyze { file } => {
            // One process plays both pages of a private tab.
            let store = in_memory_store();
            let submitted = run_source_page(&store, file, cli.format);
            if submitted != Some(Page::Result) {
                return Ok(ExitCode::from(EXIT_NOT_SUBMITTED));
            }
            run_result_page(store, &config, cli.format)
        }
        Command::Upload { file } => {
            let store = open_session_store(&config)?;
            match run_source_page(&store, file, cli.format) {
                Some(page) => {
                    match cli.format {
                        OutputFormat::Text => {
                            println!("-> {} (session {})", page.path(), config.session_id);
                        }
                        OutputFormat::Json => println!(
                            "{}",
                            json!({ "navigate": page.path(), "session": config.session_id })
                        ),
                    }
                    Ok(ExitCode::SUCCESS)
                }
                None => Ok(ExitCode::from(EXIT_NOT_SUBMITTED)),
            }
        }
        Command::Result => run_result_page(open_session_store(&config)?, &config, cli.format),
        Command::Reset => {
            let mut page = ResultPage::new(open_session_store(&config)?, build_client(&config)?);
            let target = page.analyze_another()?;
            match cli.format {
                OutputFormat::Text => println!("-> {}", target.path()),
                OutputFormat::Json => println!("{}", json!({ "navigate": target.path() })),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let health = build_client(&config)?.check_health()?;
            match cli.format {
                OutputFormat::Text => {
                    println!("gateway: {}", health.gateway);
                    for (service, status) in &health.services {
                        println!("  {service}: {status}");
                    }
                    println!("overall: {}", health.overall_status);
                }
                OutputFormat::Json => println!("{}", json!(health)),
            }
            Ok(if health.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::from_env()?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(session) = &cli.session {
        config.session_id = session.clone();
    }
    if let Some(dir) = &cli.store_dir {
        config.store_dir = dir.clone();
    }
    if let Some(raw) = &cli.timeout_secs {
        config.http_timeout = Some(parse_timeout_secs(raw)?);
    }
    config.validate()?;
    Ok(config)
}

/// Returns the navigation target when the file was stored.
fn run_source_page(
    store: &CrossPageStore,
    path: &Path,
    format: OutputFormat,
) -> Option<Page> {
    let mut page = SourcePage::new(store.clone());
    match page.submit_path(path, unix_timestamp_millis()) {
        SubmitOutcome::Navigate(target) => Some(target),
        SubmitOutcome::Rejected(rejection) => {
            report_not_submitted(&page, "rejected", &rejection.to_string(), format);
            None
        }
        SubmitOutcome::Failed(message) => {
            report_not_submitted(&page, "failed", &message, format);
            None
        }
    }
}

fn report_not_submitted(page: &SourcePage, outcome: &str, message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", page.form().render_text()),
        OutputFormat::Json => println!("{}", json!({ "outcome": outcome, "message": message })),
    }
}

fn run_result_page(
    store: CrossPageStore,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<ExitCode, AppError> {
    let mut page = ResultPage::new(store, build_client(config)?);
    let outcome = match page.load()? {
        LoadOutcome::Redirect(target) => {
            match format {
                OutputFormat::Text => println!("Nothing to analyze. -> {}", target.path()),
                OutputFormat::Json => println!("{}", json!({ "navigate": target.path() })),
            }
            return Ok(ExitCode::from(EXIT_NOTHING_PENDING));
        }
        LoadOutcome::Rendered(outcome) => outcome,
    };

    match format {
        OutputFormat::Text => println!("{}", page.screen().render_text()),
        OutputFormat::Json => {
            let body = match &outcome {
                AnalysisOutcome::Success(result) => {
                    json!({ "outcome": outcome.kind(), "result": result })
                }
                AnalysisOutcome::ServiceError(message)
                | AnalysisOutcome::TransportError(message) => {
                    json!({ "outcome": outcome.kind(), "message": message })
                }
            };
            println!("{body}");
        }
    }

    Ok(match outcome {
        AnalysisOutcome::Success(_) => ExitCode::SUCCESS,
        AnalysisOutcome::ServiceError(_) | AnalysisOutcome::TransportError(_) => {
            ExitCode::from(EXIT_ERROR_VIEW)
        }
    })
}
