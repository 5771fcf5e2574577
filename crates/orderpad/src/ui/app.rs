//! Screen state and key handling for the form screen.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tracing::error;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::book::OrderBook;
use crate::order::OrderRecord;

/// Which part of the screen the keys drive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keys edit the form inputs.
    #[default]
    Form,
    /// Keys navigate and act on the order list.
    List,
}

/// The form input that currently has the cursor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Customer name input.
    #[default]
    Name,
    /// Delivery address input.
    Address,
    /// Order description input.
    Details,
}

impl FormField {
    /// The field after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Address,
            Self::Address => Self::Details,
            Self::Details => Self::Name,
        }
    }

    /// The field before this one, wrapping around.
    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::Details,
            Self::Address => Self::Name,
            Self::Details => Self::Address,
        }
    }
}

/// Kind of message on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Info,
    Error,
}

/// One-line feedback shown between the form and the list.
#[derive(Debug, Clone)]
pub(crate) struct StatusLine {
    pub(crate) text: String,
    pub(crate) kind: StatusKind,
}

impl StatusLine {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Info,
        }
    }

    fn err(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: StatusKind::Error,
        }
    }
}

/// State of the form screen.
#[derive(Debug)]
pub struct App {
    /// The order list and its persistence.
    pub(crate) book: OrderBook,
    /// Customer name input.
    pub(crate) name_input: Input,
    /// Delivery address input.
    pub(crate) address_input: Input,
    /// Order description input.
    pub(crate) details_input: Input,
    /// Which input has the cursor while the form is active.
    pub(crate) focus: FormField,
    /// Whether keys edit the form or drive the list.
    pub(crate) mode: Mode,
    /// Selected row in the order list.
    pub(crate) selected: usize,
    /// Feedback from the last action, if any.
    pub(crate) status: Option<StatusLine>,
    should_quit: bool,
}

impl App {
    /// Create the screen state over a (typically hydrated) order book.
    #[must_use]
    pub fn new(book: OrderBook) -> Self {
        Self {
            book,
            name_input: Input::default(),
            address_input: Input::default(),
            details_input: Input::default(),
            focus: FormField::default(),
            mode: Mode::default(),
            selected: 0,
            status: None,
            should_quit: false,
        }
    }

    /// Whether the user asked to leave the screen.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The order book backing this screen.
    #[must_use]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Dispatch one key press.
    ///
    /// The caller has already filtered out key releases.
    pub async fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl-C leaves from anywhere
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Form => self.handle_form_key(key).await,
            Mode::List => self.handle_list_key(key).await,
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit().await,
            KeyCode::Esc => {
                self.mode = Mode::List;
                self.clamp_selection();
            }
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            _ => {
                let input = match self.focus {
                    FormField::Name => &mut self.name_input,
                    FormField::Address => &mut self.address_input,
                    FormField::Details => &mut self.details_input,
                };
                input.handle_event(&Event::Key(key));
            }
        }
    }

    async fn handle_list_key(&mut self, key: KeyEvent) {
        let shifted = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc | KeyCode::Char('e') | KeyCode::Char('i') => self.mode = Mode::Form,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up if shifted => self.move_selected_up().await,
            KeyCode::Down if shifted => self.move_selected_down().await,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.book.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('K') => self.move_selected_up().await,
            KeyCode::Char('J') => self.move_selected_down().await,
            KeyCode::Enter | KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                self.remove_selected().await;
            }
            _ => {}
        }
    }

    /// Validate the form and append a new order.
    ///
    /// On success the inputs are cleared for the next order; on a failed
    /// write they keep their contents so nothing typed is lost.
    async fn submit(&mut self) {
        let record = match OrderRecord::new(
            self.name_input.value(),
            self.address_input.value(),
            self.details_input.value(),
        ) {
            Ok(record) => record,
            Err(e) => {
                self.status = Some(StatusLine::err(e.to_string()));
                return;
            }
        };

        match self.book.add(record).await {
            Ok(()) => {
                self.name_input.reset();
                self.address_input.reset();
                self.details_input.reset();
                self.focus = FormField::Name;
                self.status = Some(StatusLine::info("Order added"));
            }
            Err(e) => {
                error!("Failed to save order: {e}");
                self.status = Some(StatusLine::err(format!("Could not save: {e}")));
            }
        }
    }

    async fn remove_selected(&mut self) {
        match self.book.remove(self.selected).await {
            Ok(true) => {
                self.status = Some(StatusLine::info("Order done"));
                self.clamp_selection();
            }
            Ok(false) => {}
            Err(e) => {
                error!("Failed to remove order: {e}");
                self.status = Some(StatusLine::err(format!("Could not save: {e}")));
            }
        }
    }

    async fn move_selected_up(&mut self) {
        match self.book.move_up(self.selected).await {
            Ok(true) => self.selected -= 1,
            Ok(false) => {}
            Err(e) => {
                error!("Failed to reorder: {e}");
                self.status = Some(StatusLine::err(format!("Could not save: {e}")));
            }
        }
    }

    async fn move_selected_down(&mut self) {
        match self.book.move_down(self.selected).await {
            Ok(true) => self.selected += 1,
            Ok(false) => {}
            Err(e) => {
                error!("Failed to reorder: {e}");
                self.status = Some(StatusLine::err(format!("Could not save: {e}")));
            }
        }
    }

    fn clamp_selection(&mut self) {
        if self.book.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.book.len() {
            self.selected = self.book.len() - 1;
        }
    }
}
