use crate::{
    config::{Config, Format},
    probe::{HttpProber, ProbeRequest, Prober, MAX_TIMEOUT_SECONDS},
    report::{render_result, render_survey},
    survey::{select, Survey},
    util::ensure_dir,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_CONFIG: &str = "adsb-probe.toml";

#[derive(Parser, Debug)]
#[command(name = "adsb-probe")]
#[command(about = "Probe aircraft-tracking HTTP/JSON endpoints and report their shape")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./adsb-probe.toml if present, else built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe a single URL.
    Probe {
        #[arg(long)]
        url: String,
        /// JSON field holding the records to sample (e.g. aircraft, ac, states).
        #[arg(long)]
        list_field: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECONDS))]
        timeout_seconds: Option<u64>,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Probe the configured endpoints one after another.
    Survey {
        /// Only probe the named endpoint; may be repeated.
        #[arg(long)]
        only: Vec<String>,
        #[arg(long)]
        pause_millis: Option<u64>,
        #[arg(long, value_enum)]
        format: Option<Format>,
    },
    /// Print the configured endpoints.
    Endpoints {},
}

/// Returns the process exit code: 0 when every probe succeeded, 1 otherwise.
/// Errors raised after logging is up are logged here, while the file writer
/// is still alive.
pub fn dispatch(args: Args) -> Result<i32> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let _guard = init_logging(&args, &cfg)?;

    let res = run(&args, &cfg);
    if let Err(err) = &res {
        error!("{:#}", err);
    }
    res
}

fn run(args: &Args, cfg: &Config) -> Result<i32> {
    match &args.cmd {
        Command::Probe {
            url,
            list_field,
            timeout_seconds,
            format,
        } => {
            let mut req = ProbeRequest::new(
                url.as_str(),
                timeout_seconds.unwrap_or(cfg.probe.timeout_seconds),
            );
            req.list_field = list_field.clone();
            probe_one(cfg, &req, format.unwrap_or(cfg.report.format))
        }
        Command::Survey {
            only,
            pause_millis,
            format,
        } => survey(cfg, only, *pause_millis, format.unwrap_or(cfg.report.format)),
        Command::Endpoints {} => {
            println!("{}", serde_json::to_string_pretty(&cfg.survey.endpoints)?);
            Ok(0)
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG);
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the report, logs go to stderr
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match resolve_log_path(cfg) {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            ensure_dir(parent)?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("adsb-probe.log"))
}

fn probe_one(cfg: &Config, req: &ProbeRequest, format: Format) -> Result<i32> {
    let prober = HttpProber::from_config(cfg)?;
    let result = prober.probe(req);

    match format {
        Format::Text => {
            println!("Probing {}\n", req.url);
            print!(
                "{}",
                render_result(&result, req.list_field.as_deref(), &cfg.report.route_fields)
            );
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(if result.is_success() { 0 } else { 1 })
}

fn survey(cfg: &Config, only: &[String], pause_millis: Option<u64>, format: Format) -> Result<i32> {
    let endpoints = select(&cfg.survey.endpoints, only)?;
    if endpoints.is_empty() {
        return Err(anyhow!("no endpoints configured"));
    }

    let prober = HttpProber::from_config(cfg)?;
    let mut survey = Survey::new(cfg, prober);
    if let Some(ms) = pause_millis {
        survey = survey.with_pause(Duration::from_millis(ms));
    }

    let report = survey.run(&endpoints);
    info!(
        "survey done endpoints={} failed={}",
        report.entries.len(),
        report.failures()
    );

    match format {
        Format::Text => print!("{}", render_survey(&report, &cfg.report.route_fields)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.failures() == 0 { 0 } else { 1 })
}
