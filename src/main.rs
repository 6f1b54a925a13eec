//! SpaceScope — client for a remote storage scan engine.
//!
//! Thin binary entry point: a terminal frontend over `spacescope-app`. All
//! decision logic lives in the `spacescope-core` and `spacescope-app` crates.

mod text_chart;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use spacescope_app::{AppState, MessageLevel};
use spacescope_core::export;
use spacescope_core::model::format_size;
use spacescope_core::protocol::PathCategory;
use spacescope_core::remote::HttpBackend;
use spacescope_core::render::RenderOutcome;
use spacescope_core::resolver::DropPayload;
use spacescope_core::session::SessionPhase;
use spacescope_core::ClientConfig;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use text_chart::TextChart;
use tracing_subscriber::EnvFilter;

/// Delay between frames of the terminal event loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "spacescope", about = "Drive remote storage scans and explore the results")]
struct Args {
    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Scan engine base URL (overrides config and environment)
    #[arg(long)]
    server: Option<String>,

    /// Progress poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the scan locations suggested by the engine
    Paths,
    /// Scan a location and print the result tree
    Scan {
        /// Location to scan; `$USER` expands to the engine's username
        path: Option<String>,
        /// Comma-separated folders to exclude
        #[arg(long, short, default_value = "")]
        exclude: String,
        /// Only show items whose name or path contains this term
        #[arg(long, short)]
        search: Option<String>,
        /// Levels of the tree to print
        #[arg(long, default_value_t = 3)]
        depth: usize,
        /// Write the displayed records to this file
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Resolve a recorded drop payload (JSON) into a scan path
    Resolve {
        payload: PathBuf,
        /// Treat the drop as an exclusion drop
        #[arg(long)]
        exclusions: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    tracing::info!("SpaceScope starting against {}", config.base_url());

    let backend = Arc::new(HttpBackend::new(&config)?);
    let mut state = AppState::new(backend, config);

    match args.command {
        Command::Paths => print_paths(&state),
        Command::Scan {
            path,
            exclude,
            search,
            depth,
            export,
            format,
        } => {
            let path = path.unwrap_or_else(|| state.path_input.clone());
            run_scan(&mut state, &path, &exclude)?;
            if let Some(term) = search {
                state.search(&term);
                report(&state);
            }
            let renderer = Arc::new(TextChart { max_depth: depth });
            match state.render_current(renderer) {
                Ok(RenderOutcome::Rendered) => {}
                Ok(RenderOutcome::Failed(message)) => eprintln!("{message}"),
                Err(e) => eprintln!("{e}"),
            }
            print_summary(&state);
            if let Some(target) = export {
                export_view(&state, &target, format)?;
            }
        }
        Command::Resolve {
            payload,
            exclusions,
        } => {
            let text = std::fs::read_to_string(&payload)
                .with_context(|| format!("reading {}", payload.display()))?;
            let payload: DropPayload =
                serde_json::from_str(&text).context("parsing drop payload")?;
            if exclusions {
                state.handle_exclusion_drop(&payload);
                report(&state);
                println!("{}", state.exclude_input);
            } else {
                let resolved = state.handle_drop(&payload);
                report(&state);
                if !resolved {
                    bail!("no path could be resolved from the drop");
                }
                println!("{}", state.path_input);
            }
        }
    }
    Ok(())
}

/// Defaults, then the config file and environment, then CLI flags.
fn load_config(args: &Args) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(server) = &args.server {
        config.server_url = server.clone();
    }
    if let Some(ms) = args.poll_ms {
        config.poll_interval_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn print_paths(state: &AppState) {
    println!("User: {}", state.username());
    for (title, category) in [
        ("User folders", PathCategory::User),
        ("System", PathCategory::System),
        ("Other", PathCategory::Other),
    ] {
        let entries = state.paths.by_category(category);
        if entries.is_empty() {
            continue;
        }
        println!("{title}:");
        for entry in entries {
            println!("  {:<32} {}", entry.label, entry.path);
        }
    }
}

/// Start a scan and pump the state until it leaves `Scanning` and any
/// completed results have been delivered.
fn run_scan(state: &mut AppState, path: &str, exclude: &str) -> anyhow::Result<()> {
    if !state.start_scan(path, exclude) {
        report(state);
        bail!("scan was not started");
    }

    let mut last_line = String::new();
    loop {
        state.process_session_events();
        let line = format!(
            "{} {:>3}% {}",
            state.status_text,
            state.progress_percent,
            state.current_path.as_deref().unwrap_or("")
        );
        if line != last_line && !state.status_text.is_empty() {
            eprintln!("{line}");
            last_line = line;
        }

        match state.phase() {
            SessionPhase::Scanning => {}
            SessionPhase::Completed if state.view.is_none() => {}
            SessionPhase::Completed => break,
            SessionPhase::Failed | SessionPhase::Stopped | SessionPhase::Idle => {
                // The phase flips before the terminal event is sent.
                std::thread::sleep(FRAME_INTERVAL);
                state.process_session_events();
                report(state);
                bail!("scan did not complete");
            }
        }
        std::thread::sleep(FRAME_INTERVAL);
    }
    report(state);
    Ok(())
}

fn report(state: &AppState) {
    if let Some(message) = &state.message {
        let tag = match message.level {
            MessageLevel::Info => "info",
            MessageLevel::Success => "ok",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", message.text);
    }
}

fn print_summary(state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    println!();
    println!(
        "Total: {}  ({} files, {} folders)",
        format_size(summary.total_size),
        summary.file_count,
        summary.dir_count
    );
    if !summary.top_directories.is_empty() {
        println!("Largest folders:");
        for item in &summary.top_directories {
            println!("  {:>10}  {}", format_size(item.size), item.path);
        }
    }
    if !summary.top_files.is_empty() {
        println!("Largest files:");
        for item in &summary.top_files {
            println!("  {:>10}  {}", format_size(item.size), item.path);
        }
    }
}

fn export_view(state: &AppState, target: &Path, format: ExportFormat) -> anyhow::Result<()> {
    let Some(view) = state.current_view() else {
        bail!("no results to export");
    };
    let file = File::create(target).with_context(|| format!("creating {}", target.display()))?;
    let writer = BufWriter::new(file);
    match format {
        ExportFormat::Csv => export::write_csv(view.nodes(), writer)?,
        ExportFormat::Json => export::write_json(view.nodes(), writer)?,
    }
    tracing::info!("Exported {} records to {}", view.len(), target.display());
    Ok(())
}
