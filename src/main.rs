mod api;
mod app;
mod catalog;
mod config;
mod constants;
mod input;
mod prefs;
mod theme;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use constants::constants;
use prefs::{Browser, FilePrefStore, MemoryPrefStore, PrefStore};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(
  author,
  version = env!("CARGO_PKG_VERSION"),
  about = "Browse a podcast catalog in the terminal",
  long_about = None
)]
struct Args {
  /// Catalog endpoint returning a JSON array of podcasts
  #[arg(long, value_name = "URL")]
  api_url: Option<String>,

  /// Write logs here instead of the platform data directory
  #[arg(long, value_name = "PATH")]
  log_file: Option<PathBuf>,

  /// Forget the saved search, genre and sort before starting
  #[arg(long)]
  reset_prefs: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print shell completions to stdout
  Completions {
    #[arg(value_enum)]
    shell: Shell,
  },
}

// --- Logging ---

/// Route `tracing` output to a file; the terminal belongs to the UI.
fn init_logging(log_file: Option<PathBuf>) -> Result<Option<WorkerGuard>> {
  let path = match log_file {
    Some(path) => path,
    None => match config::data_dir() {
      Some(dir) => dir.join(&constants().log_file_name),
      None => return Ok(None),
    },
  };
  let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).map_or_else(|| PathBuf::from("."), PathBuf::from);
  let file_name = path.file_name().context("Log path has no file name")?;
  std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create log directory {}", dir.display()))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_writer(writer)
    .with_ansi(false)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();
  Ok(Some(guard))
}

/// Open the on-disk preferences, falling back to an in-memory store.
fn open_prefs(reset: bool) -> Box<dyn PrefStore> {
  match FilePrefStore::open_default() {
    Ok(mut store) => {
      if reset && let Err(e) = store.clear() {
        warn!(err = %format!("{:#}", e), "prefs: reset failed");
      }
      info!(path = %store.path().display(), "prefs: using preferences file");
      Box::new(store)
    }
    Err(e) => {
      warn!(err = %format!("{:#}", e), "prefs: preferences will not persist");
      Box::new(MemoryPrefStore::default())
    }
  }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(Command::Completions { shell }) = args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging(args.log_file.clone())?;
  info!(version = env!("CARGO_PKG_VERSION"), "podex starting");

  let config = Config::load();
  let api_url = config.resolve_api_url(args.api_url.as_deref(), &constants().api_url);
  let client = api::build_client(constants().request_timeout_secs)?;
  let browser = Browser::load(open_prefs(args.reset_prefs));

  let mut app = App::new(browser, config);
  app.start_fetch(client, api_url);

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app);
  ratatui::restore();
  info!("podex exiting");
  result
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending();
    app.expire_notice();

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key);
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
