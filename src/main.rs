use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::ValueEnum;
use eyre::{Result, bail};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use ytgist::gemini::{self, GeminiSettings};
use ytgist::output::{render_json, render_links, render_text};
use ytgist::state::{AnalysisState, Session};
use ytgist::{VideoAnalysis, VideoId};

mod cli;

use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytgist.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytgist")
        .join("logs")
}

fn build_after_help(settings: &GeminiSettings) -> String {
    let key_line = if settings.api_key.is_some() {
        "  \x1b[32m✅\x1b[0m API key    configured".to_string()
    } else {
        "  \x1b[31m❌\x1b[0m API key    (not found, set GEMINI_API_KEY or api_key in config)".to_string()
    };

    format!(
        "\nCREDENTIALS:\n{key_line}\n\nInteractive mode: one URL per line, `retry` re-runs the last one.\n\nConfig: {}\nLogs are written to: {}",
        ytgist::config::config_path().display(),
        log_dir().join("ytgist.log").display()
    )
}

#[derive(Debug, Clone)]
struct Options {
    format: OutputFormat,
    links_only: bool,
    verbose: bool,
}

fn render(video_id: &VideoId, analysis: &VideoAnalysis, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("{}\n\n{}", render_links(video_id), render_text(analysis))),
        OutputFormat::Json => render_json(video_id, analysis),
    }
}

fn report(state: &AnalysisState, video_id: &VideoId, format: OutputFormat) -> Result<()> {
    match state {
        AnalysisState::Success(analysis) => match format {
            OutputFormat::Text => println!("{}\n", render_text(analysis)),
            OutputFormat::Json => println!("{}", render_json(video_id, analysis)?),
        },
        AnalysisState::Failure(err) => {
            eprintln!("Signal interrupt: {}", err.user_message());
            if err.is_retryable() {
                eprintln!("Type `retry` to run the analysis again.");
            }
        }
        AnalysisState::Idle | AnalysisState::Loading => {}
    }
    Ok(())
}

async fn run_once(
    client: &reqwest::Client,
    settings: &GeminiSettings,
    url: &str,
    output: Option<&PathBuf>,
    opts: &Options,
) -> Result<()> {
    let video_id = match ytgist::resolve(url) {
        Ok(id) => id,
        Err(e) => bail!("{}", e.user_message()),
    };

    if opts.verbose {
        eprintln!("Resolved video ID: {video_id}");
    }

    let rendered = if opts.links_only {
        render_links(&video_id)
    } else {
        if opts.verbose {
            eprintln!("Analysing with {} (temperature {})...", settings.model, settings.temperature);
        }
        match gemini::analyze(client, url, settings).await {
            Ok(analysis) => render(&video_id, &analysis, opts.format)?,
            Err(e) => bail!("{}", e.user_message()),
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &rendered)?;
        if opts.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }

    Ok(())
}

/// Read references from stdin; each line supersedes the request before it.
async fn run_session(client: reqwest::Client, settings: GeminiSettings, opts: Options) -> Result<()> {
    let session = Arc::new(Mutex::new(Session::new()));
    let settings = Arc::new(settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_reference: Option<String> = None;
    let mut in_flight = None;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reference = if line.eq_ignore_ascii_case("retry") {
            match &last_reference {
                Some(r) => r.clone(),
                None => {
                    eprintln!("Nothing to retry yet.");
                    continue;
                }
            }
        } else {
            line.to_string()
        };

        let video_id = match ytgist::resolve(&reference) {
            Ok(id) => id,
            Err(e) => {
                debug!("{e}");
                eprintln!("{}", e.user_message());
                continue;
            }
        };
        last_reference = Some(reference.clone());

        if opts.format == OutputFormat::Text || opts.links_only {
            println!("{}\n", render_links(&video_id));
        }
        if opts.links_only {
            continue;
        }

        let token = session.lock().map_err(|_| eyre::eyre!("session lock poisoned"))?.begin();
        if opts.verbose {
            eprintln!("Analysing {video_id} ({token:?})...");
        }

        let client = client.clone();
        let settings = Arc::clone(&settings);
        let session = Arc::clone(&session);
        let format = opts.format;
        in_flight = Some(tokio::spawn(async move {
            let result = gemini::analyze(&client, &reference, &settings).await;
            let Ok(mut session) = session.lock() else {
                return;
            };
            if !session.finish(token, result) {
                return;
            }
            if let Err(e) = report(session.state(), &video_id, format) {
                warn!("Failed to render analysis: {e}");
            }
        }));
    }

    // Only the newest request can still change the session state
    if let Some(handle) = in_flight {
        handle.await?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytgist::config::Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        Default::default()
    });

    let base_settings = config.gemini_settings(None, None);
    let cmd = <Cli as clap::CommandFactory>::command().after_help(build_after_help(&base_settings));
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // CLI flags take priority over config
    let settings = config.gemini_settings(cli.model.as_deref(), cli.temperature);
    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
        })
        .unwrap_or(OutputFormat::Text);

    if cli.verbose {
        let config_path = ytgist::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        debug!("Model: {}, temperature: {}", settings.model, settings.temperature);
    }

    let opts = Options {
        format,
        links_only: cli.links_only,
        verbose: cli.verbose,
    };

    let client = gemini::build_client(&settings)?;

    match cli.url {
        Some(ref url) => run_once(&client, &settings, url, cli.output.as_ref(), &opts).await,
        None => run_session(client, settings, opts).await,
    }
}
