//! `rollcall`: terminal attendance tracker.
//!
//! # Usage
//!
//! ```
//! rollcall --config ~/.config/rollcall/rollcall.toml
//! rollcall --store /var/lib/rollcall/school.db
//! ```
//!
//! Logs go to the file named by `log_path` (default `rollcall.log`) because
//! the terminal belongs to the UI. Set `RUST_LOG` to change the level.

mod app;
mod config;
mod devices;
mod ui;
mod view;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use config::{Settings, expand_tilde};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use devices::{ConfiguredLocation, StillFileCamera};
use ratatui::{Terminal, backend::CrosstermBackend};
use rollcall_core::store::RollStore;
use rollcall_store_sqlite::SqliteStore;
use tokio::sync::mpsc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;
use view::TuiSurface;

/// Redraw interval while idle; banners and live lists update between keys.
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollcall", version, about = "Terminal attendance tracker")]
struct Args {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "rollcall.toml")]
  config: PathBuf,

  /// SQLite database path; overrides `store_path` from the config.
  #[arg(long, value_name = "FILE", env = "ROLLCALL_STORE")]
  store: Option<PathBuf>,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args.config)?;
  init_tracing(&settings.log_path)?;

  let store_path = expand_tilde(args.store.as_deref().unwrap_or(settings.store_path.as_path()));
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mut app = App::new(
    store,
    Arc::new(TuiSurface::default()),
    ConfiguredLocation::new(settings.location),
    StillFileCamera::new(settings.camera.clone()),
  );
  info!(
    store = %store_path.display(),
    location = settings.location.is_some(),
    camera = settings.camera.is_some(),
    "starting"
  );

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  info!("exiting");
  run_result
}

fn init_tracing(log_path: &Path) -> Result<()> {
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(log_path)
    .with_context(|| format!("failed to open log file {}", log_path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Event loop ──────────────────────────────────────────────────────────────

/// Read terminal events on a plain thread so the runtime stays free for
/// live-view pumps and banner timers.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<Event> {
  let (tx, rx) = mpsc::unbounded_channel();
  std::thread::spawn(move || {
    loop {
      match event::read() {
        Ok(evt) => {
          if tx.send(evt).is_err() {
            break;
          }
        }
        Err(e) => {
          warn!(error = %e, "terminal input failed");
          break;
        }
      }
    }
  });
  rx
}

async fn run_event_loop<S: RollStore>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<S>,
) -> Result<()> {
  let mut input = spawn_input_reader();
  let mut frames = tokio::time::interval(FRAME_INTERVAL);

  loop {
    {
      let view = app.surface.lock();
      terminal.draw(|f| ui::draw(f, &view)).context("drawing frame")?;
    }

    tokio::select! {
      _ = frames.tick() => {}
      evt = input.recv() => match evt {
        Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
          if !app.handle_key(key).await? {
            break;
          }
        }
        // Resize and the rest: redrawn on the next iteration.
        Some(_) => {}
        None => break,
      },
    }
  }

  Ok(())
}
