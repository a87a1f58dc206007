//! duckee - terminal client for the Duckee AI-art marketplace.
//!
//! Browses the explore feed, toggles likes, and completes the wallet sign-in
//! round-trip by accepting the redirect URI of the external auth page.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing_subscriber::EnvFilter;

use duckee::application::{App, AppSettings, Screen, Services};
use duckee::domain::PreferencesRepository;
use duckee::infrastructure::{ClientConfig, HttpApi, PreferencesFile};
use duckee::presentation::{render_ui, InputHandler};

#[derive(Parser)]
#[command(name = "duckee")]
#[command(about = "Terminal client for the Duckee AI-art marketplace", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Redirect URI to deliver on startup, as if the OS had opened it
    #[arg(long)]
    redirect: Option<String>,

    /// Log file (the terminal is taken over by the UI)
    #[arg(long, default_value = "duckee.log")]
    log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let file = File::create(&cli.log_file)?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

fn build_app(cli: &Cli) -> Result<App, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(api_base) = &cli.api_base {
        config.api_base_url = api_base.clone();
    }

    let preferences = Arc::new(PreferencesFile::new(&config.preferences_path));
    let token = preferences.credentials().map(|c| c.access_token);
    let api = Arc::new(HttpApi::new(&config.api_base_url, token)?);

    let settings = AppSettings {
        auth_url: config.auth_url.clone(),
        deeplink: config.deeplink.clone(),
        feed: config.feed.clone(),
        mint: config.mint_settings(),
    };
    Ok(App::new(
        settings,
        Services {
            art: api.clone(),
            auth: api.clone(),
            users: api,
            preferences,
        },
    ))
}

/// Entry point: sets up logging and the terminal, then runs the event loop
/// until the user quits.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let mut app = build_app(&cli)?;
    tracing::info!("starting duckee");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.start().await;
    if let Some(redirect) = &cli.redirect {
        app.go_sign_in();
        app.on_external_redirect(redirect);
    }
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal error");
        println!("{err:?}");
    }

    Ok(())
}

/// Main event loop.
///
/// Polls the keyboard with a short timeout so pending redirects and side
/// effects are picked up even while the user is idle.
async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick().await;
        terminal.draw(|f| render_ui(f, app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if app.screen == Screen::Explore => return Ok(()),
                    code => InputHandler::handle_key_event(app, code).await,
                }
            }
        }
    }
}
