use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::classifier::{BaselineMode, SuccessPredicate, DEFAULT_LEN_THRESHOLD_PCT};
use crate::cli::commands::CommonArgs;
use crate::cli::progress::ScanProgress;
use crate::config::{
    self, duration_from_secs, ProbeKitConfig, DEFAULT_BACKOFF_SECS, DEFAULT_CONCURRENCY,
    DEFAULT_DELAY_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use crate::engine::{ScanConfig, ScanEvent, ScanSession};
use crate::errors::{ProbeKitError, RetryPolicy};
use crate::generator::{CandidatePlan, RequestTemplate};
use crate::models::ScanReport;
use crate::reporting::{format_hits_table, format_summary, parse_formats, FileSink, OutputFormat};
use crate::transport::{HttpSettings, HttpTransport};

/// Options that apply to every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub quiet: bool,
}

/// Per-subcommand starting point before flags and config are applied.
#[derive(Debug, Clone)]
pub struct ScanDefaults {
    pub prefix: String,
    pub baseline: BaselineMode,
    pub predicate: SuccessPredicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputTarget {
    pub directory: PathBuf,
    pub prefix: String,
    pub formats: Vec<OutputFormat>,
}

#[derive(Debug, Clone)]
pub struct ResolvedScan {
    pub scan: ScanConfig,
    pub http: HttpSettings,
    /// `None` when saving is disabled.
    pub output: Option<OutputTarget>,
}

pub async fn load_file_config(global: &GlobalOptions) -> Result<ProbeKitConfig, ProbeKitError> {
    match &global.config {
        Some(path) => config::parse_config(path).await,
        None => Ok(ProbeKitConfig::default()),
    }
}

/// Absolute http(s) URL with a host.
pub fn parse_target(raw: &str) -> Result<Url, ProbeKitError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ProbeKitError::InvalidTarget(format!("{}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProbeKitError::InvalidTarget(format!(
            "{}: only http and https URLs are supported",
            raw
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProbeKitError::InvalidTarget(format!("{}: missing host", raw)));
    }
    Ok(url)
}

/// Merge CLI flags over the config file over built-in defaults.
pub fn resolve(
    args: &CommonArgs,
    file: &ProbeKitConfig,
    defaults: ScanDefaults,
) -> Result<ResolvedScan, ProbeKitError> {
    let engine = file.engine();

    let concurrency = args.concurrency.or(engine.concurrency).unwrap_or(DEFAULT_CONCURRENCY);
    let timeout = duration_from_secs(
        "timeout",
        args.timeout.or(engine.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
    )?;
    let retries = args.retries.or(engine.retries).unwrap_or(DEFAULT_RETRIES);
    let backoff = duration_from_secs(
        "backoff",
        args.backoff.or(engine.backoff_secs).unwrap_or(DEFAULT_BACKOFF_SECS),
    )?;
    let delay_between = duration_from_secs(
        "delay",
        args.delay.or(engine.delay_secs).unwrap_or(DEFAULT_DELAY_SECS),
    )?;

    let baseline = if args.no_baseline {
        BaselineMode::Off
    } else if let Some(mode) = &args.baseline {
        mode.parse()?
    } else {
        defaults.baseline
    };

    let mut predicate = defaults.predicate;
    for keyword in &args.keywords {
        predicate = predicate.with_keyword(keyword.as_str());
    }
    predicate.allow_redirect |= args.allow_redirect;
    predicate.len_threshold_pct = args
        .threshold
        .or(file.detection().len_threshold_pct)
        .unwrap_or(DEFAULT_LEN_THRESHOLD_PCT);

    let http_file = file.http();
    let mut http = HttpSettings::default();
    if let Some(user_agent) = http_file.user_agent {
        http.user_agent = user_agent;
    }
    if let Some(headers) = http_file.headers {
        http.headers = headers;
    }
    if let Some(max_redirects) = http_file.max_redirects {
        http.max_redirects = max_redirects;
    }
    http.danger_accept_invalid_certs = http_file.danger_accept_invalid_certs.unwrap_or(false);

    let output = if args.no_save {
        None
    } else {
        let output_file = file.output();
        let formats = match &args.format {
            Some(list) => parse_formats(list)?,
            None => output_file
                .formats
                .unwrap_or_else(|| vec![OutputFormat::Json, OutputFormat::Csv]),
        };
        let directory = args
            .output
            .clone()
            .or(output_file.directory)
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
        Some(OutputTarget {
            directory: PathBuf::from(directory),
            prefix: defaults.prefix,
            formats,
        })
    };

    let scan = ScanConfig {
        concurrency,
        timeout,
        retry: RetryPolicy::new(retries, backoff),
        delay_between,
        baseline,
        predicate,
    };
    scan.validate()?;

    Ok(ResolvedScan { scan, http, output })
}

/// Run a scan with progress output and Ctrl-C handling, then print the results.
pub async fn execute(
    global: &GlobalOptions,
    resolved: ResolvedScan,
    template: RequestTemplate,
    plan: CandidatePlan,
) -> Result<ScanReport, ProbeKitError> {
    let transport = Arc::new(HttpTransport::new(&resolved.http)?);

    let cancel_token = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ScanEvent>();

    let mut session = ScanSession::new(resolved.scan, transport, template, plan)
        .with_cancel_token(cancel_token.clone())
        .with_event_channel(event_tx);

    if let Some(output) = &resolved.output {
        tokio::fs::create_dir_all(&output.directory).await?;
        let sink = FileSink::new(&output.directory, output.prefix.clone())
            .with_formats(output.formats.clone());
        session = session.with_sink(Box::new(sink));
    }

    let quiet = global.quiet;
    let render_task = tokio::spawn(async move {
        let mut progress = ScanProgress::new(quiet);
        while let Some(event) = event_rx.recv().await {
            progress.handle_event(&event);
        }
    });

    let interrupt_token = cancel_token.clone();
    let interrupt_task = tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if interrupt_token.is_cancelled() {
                warn!("Second interrupt, exiting without waiting for in-flight probes");
                std::process::exit(130);
            }
            info!("Interrupt received, finishing in-flight probes (press Ctrl-C again to force exit)");
            interrupt_token.cancel();
        }
    });

    let result = session.run().await;
    interrupt_task.abort();
    let _ = render_task.await;

    let report = result?;
    print_report(&report, quiet);
    Ok(report)
}

fn print_report(report: &ScanReport, quiet: bool) {
    if !quiet && report.counts.completed > 0 {
        println!();
        print!("{}", format_hits_table(report));
    }
    let summary = format_summary(report);
    if report.counts.hits > 0 {
        println!("{}", style(summary).green().bold());
    } else {
        println!("{}", summary);
    }
    for path in &report.saved_to {
        println!("{} {}", style("Results saved to:").green(), path.display());
    }
}
