//! The order form screen.
//!
//! A single screen: three text inputs on top, the saved order list below.
//! Keys either edit the form or drive the list, switched with Esc. The
//! terminal is put into raw mode on an alternate screen and restored on the
//! way out, whatever happened inside the loop.

mod app;
mod view;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::book::OrderBook;
use crate::config::Config;
use crate::error::Result;

pub use app::{App, FormField, Mode};

/// Run the form screen over the given order book until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to.
pub async fn run(config: &Config, book: OrderBook) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(book);
    let res = run_app(&mut terminal, &mut app, config.tick_rate()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|f| view::draw(f, app))?;

        if app.should_quit() {
            return Ok(());
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    app.handle_key(key).await;
                }
            }
        }
    }
}
