use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use analyst_chat::app::App;
use analyst_chat::reconnect::ReconnectTimer;
use analyst_chat::tui::{self, EventHandler};
use analyst_chat::{handler, transcript, ui, ChatClient, Config, HttpAnalysisApi};

#[derive(Parser)]
#[command(name = "analyst-chat")]
#[command(version, about = "Terminal chat client for a remote analysis API")]
struct Cli {
    /// API root, e.g. http://localhost:5050/api
    #[arg(long)]
    api_base: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the conversation as HTML to this file on exit
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => Config::default_log_path()?,
    };
    init_logging(&log_path)?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }
    info!(api_base = %config.api_base, "starting");

    let api = HttpAnalysisApi::new(&config.api_base, config.request_timeout())?;
    let client = ChatClient::new(Arc::new(api));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let reconnect = ReconnectTimer::spawn(config.reconnect_interval(), events.sender());
    let mut app = App::new(client, config.quick_actions.clone(), events.sender());
    app.start_initialize();

    let run = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        anyhow::Ok(())
    };
    let result = run.await;

    reconnect.cancel();
    tui::restore()?;
    result?;

    if let Some(path) = cli.transcript {
        transcript::write_html(&path, "Analyst Chat", app.client.thread().messages())?;
        info!(path = %path.display(), "transcript written");
    }

    info!("exiting");
    Ok(())
}
