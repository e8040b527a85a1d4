mod app;
mod event;
mod ui;

use std::io::{stdout, Stdout};
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::config::Config;
use crate::data::Item;
use crate::loader::LoadError;
use crate::view::ViewOptions;
use app::{App, Message};

pub fn run(items: Result<Vec<Item>, LoadError>, options: ViewOptions, config: &Config) -> Result<()> {
    let mut app = match items {
        Ok(items) => App::new(items, options, config),
        Err(e) => {
            tracing::error!(error = %e, "failed to load directory");
            App::failed(LoadError::USER_MESSAGE, options, config)
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let now = Instant::now();
        app.tick(now);

        if let Some(msg) = event::handle_events(app, app.search_debounce.remaining(now))? {
            app.clear_status();
            match msg {
                Message::OpenUrl => open_link(app),
                Message::CopyUrl => copy_link(app),
                msg => {
                    if !app.update(msg) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn open_link(app: &mut App) {
    let Some(url) = app.current_link() else {
        app.set_status("No usable link for this item".to_string());
        return;
    };
    match open::that(&url) {
        Ok(()) => app.set_status(format!("Opened: {}", url)),
        Err(e) => app.set_status(format!("Failed to open browser: {}", e)),
    }
}

fn copy_link(app: &mut App) {
    let Some(url) = app.current_link() else {
        app.set_status("No usable link for this item".to_string());
        return;
    };
    let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url.clone()));
    match copied {
        Ok(()) => app.set_status(format!("Copied: {}", url)),
        Err(e) => app.set_status(format!("Failed to copy: {}", e)),
    }
}
