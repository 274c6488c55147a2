use clap::{Parser, Subcommand, ValueEnum};
use daily_post::caption::{Clock, SystemClock, render_caption};
use daily_post::config::{self, AppConfig};
use daily_post::credentials::Credentials;
use daily_post::imaging::RustBackend;
use daily_post::ledger::UploadLedger;
use daily_post::output;
use daily_post::pacing::ThreadPacer;
use daily_post::pipeline::Pipeline;
use daily_post::schedule::DailySchedule;
use daily_post::select::{self, SelectError};
use daily_post::service::HttpService;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup; called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Parser)]
#[command(name = "daily-post")]
#[command(about = "Post one new photo a day from a watched folder")]
#[command(long_about = "\
Post one new photo a day from a watched folder

Each run picks the newest image in the watch folder that has not been posted
yet, normalizes it (PNG → JPEG, center-crop into the 4:5 to 1.91:1 aspect
range), posts it with a dated caption and records the original filename in
the ledger so it is never posted twice.

Working directory layout (defaults):

  daily-post.toml       # Optional config (see 'daily-post gen-config')
  login.txt             # username=... and password=... lines
  uploadedFiles.txt     # Ledger of posted filenames, one per line
  UPLOADS/              # Drop photos here (.jpg, .jpeg, .png)
  config/               # Session scratch space, wiped before every run

Generated files (converted or cropped copies) are deleted after every run;
the photos you dropped in are never touched.

Run 'daily-post gen-config' to generate a documented daily-post.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post one photo now
    Run,
    /// Post one photo every day at the configured time
    Daemon,
    /// Show what a run would post, without posting anything
    Check,
    /// Print a stock daily-post.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Run => {
            let config = config::load_config(&cli.config)?;
            let pipeline = build_pipeline(&config)?;
            let report = pipeline.run_once();
            output::print_run_report(&report);
            if report.outcome.is_failure() {
                std::process::exit(1);
            }
        }
        Command::Daemon => {
            let config = config::load_config(&cli.config)?;
            let pipeline = build_pipeline(&config)?;
            let schedule =
                DailySchedule::new(config.schedule.time()?, config.schedule.poll_interval());
            println!("==> Posting daily at {}", schedule.at.format("%H:%M"));
            schedule.run_daily(&SystemClock, &ThreadPacer, || {
                let report = pipeline.run_once();
                output::print_run_report(&report);
                report.outcome.is_failure()
            });
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            let folder = &config.paths.watch_folder;
            let ledger = UploadLedger::new(&config.paths.ledger);
            let caption = render_caption(
                &config.caption.template,
                SystemClock.today(),
                &config.caption.date_format,
            )?;
            match select::survey(folder, &ledger) {
                Ok(entries) => output::print_check_output(folder, &entries, &caption),
                Err(SelectError::FolderMissing(path)) => {
                    println!(
                        "Watch folder {} does not exist; a run would create it",
                        path.display()
                    );
                }
                Err(e) => return Err(e.into()),
            }
            if !config.paths.credentials.exists() {
                println!(
                    "Warning: credentials file {} not found",
                    config.paths.credentials.display()
                );
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scope debug to this crate so dependencies stay quiet; logs go to stderr.
fn init_logging(level: LogLevel) {
    let filter = match level {
        LogLevel::Debug => "daily_post=debug,info",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Wire the production backend, HTTP client, pacer and clock.
///
/// Missing or malformed credentials stop here, before any run.
fn build_pipeline(
    config: &AppConfig,
) -> Result<Pipeline<RustBackend, HttpService, ThreadPacer, SystemClock>, Box<dyn std::error::Error>>
{
    let credentials = Credentials::load(&config.paths.credentials)?;
    let service = HttpService::new(
        config.service.base_url.clone(),
        config.service.timeout(),
        config.paths.session_dir.clone(),
    )?;
    Ok(Pipeline::new(
        config.pipeline_settings(),
        credentials,
        RustBackend::new(),
        service,
        ThreadPacer,
        SystemClock,
    ))
}
