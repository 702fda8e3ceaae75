//! Terminal dashboard for binwatch that shows the live state of a smart waste container.

mod app;
mod config;
mod input;
mod logging;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use binwatch_core::{clock::SystemClock, sync::Synchronizer};
use binwatch_provider_firebase::FirebaseSource;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;

use crate::app::App;
use crate::config::AppConfig;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let _log_guard = logging::init_tracing(&config.logging)?;

    // HTTP + synchronizer setup
    let client = Client::builder()
        .user_agent("binwatch/0.1")
        .timeout(config.http_timeout)
        .build()?;
    let source = FirebaseSource::new(client, &config.base_url);
    tracing::info!(
        container_url = source.container_url(),
        trash_url = source.trash_url(),
        "monitoring container"
    );
    let sync = Arc::new(Synchronizer::new(Arc::new(source), Arc::new(SystemClock)));
    sync.start(config.poll_interval);

    // App state
    let app = App::new(Arc::clone(&sync));

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app);

    sync.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.poll_updates();

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (small timeout keeps the view in step with the synchronizer)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key) {
                Action::Quit => break,
                Action::None => {}
                Action::Refresh => {
                    if !app.request_refresh() {
                        tracing::debug!("refresh ignored, attempt already running");
                    }
                }
            }
        }
    }

    Ok(())
}
