use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tshop::application::{App, AppMode};
use tshop::domain::{CartStore, Catalog, ConsentStore, KeyValueStore};
use tshop::infrastructure::{FileStore, MemoryStore};
use tshop::presentation::{InputHandler, render_ui};

const TICK_RATE: Duration = Duration::from_millis(200);

/// Terminal storefront with a persistent cart.
#[derive(Debug, Parser)]
#[command(name = "tshop", version, about)]
struct Args {
    /// Directory holding the persisted cart and consent state.
    #[arg(long, env = "TSHOP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Append logs to this file instead of <data-dir>/tshop.log.
    #[arg(long, env = "TSHOP_LOG_FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), io::Error> {
    let args = Args::parse();

    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|d| d.join("tshop")));

    init_logging(&args, data_dir.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "starting tshop");

    let (cart_storage, consent_storage) = open_storage(data_dir.as_deref());
    let app = App::new(
        Catalog::load(),
        CartStore::new(cart_storage),
        ConsentStore::new(consent_storage),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Logs go to a file because stderr would draw over the UI. Any failure to
/// set this up leaves the process running unlogged.
fn init_logging(args: &Args, data_dir: Option<&Path>) {
    let path = args
        .log_file
        .clone()
        .or_else(|| data_dir.map(|d| d.join("tshop.log")));
    let Some(path) = path else {
        return;
    };

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Opens one file-backed store handle per persisted key owner. When the
/// directory cannot be used the app still runs, just without persistence.
fn open_storage(data_dir: Option<&Path>) -> (Box<dyn KeyValueStore>, Box<dyn KeyValueStore>) {
    if let Some(dir) = data_dir {
        match (FileStore::open(dir), FileStore::open(dir)) {
            (Ok(cart), Ok(consent)) => {
                info!("using data directory {}", dir.display());
                return (Box::new(cart), Box::new(consent));
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!("falling back to in-memory storage: {err}");
            }
        }
    } else {
        warn!("no data directory available, state will not survive exit");
    }
    (Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| render_ui(f, &app))?;
        app.on_ready(Instant::now());

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if app.mode == AppMode::Normal && key.code == KeyCode::Char('q') {
                        return Ok(());
                    }
                    InputHandler::handle_key_event(&mut app, key);
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }
    }
}
