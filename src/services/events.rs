//! UI Events
//!
//! Notifications the client controllers raise toward whatever front end is
//! driving them (the CLI prints them; a GUI would show dialogs).

use tokio::sync::mpsc;

/// Event raised for the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Blocking notification shown to the user
    Alert(String),
    /// Leave the create page and return to the feed
    NavigateHome,
}

/// Sending half handed to controllers
pub type UiEventSender = mpsc::UnboundedSender<UiEvent>;

/// Optional event sink. Controllers built without one stay silent.
#[derive(Debug, Clone, Default)]
pub struct UiNotifier {
    tx: Option<UiEventSender>,
}

impl UiNotifier {
    pub fn new(tx: UiEventSender) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that drops every event
    pub fn silent() -> Self {
        Self { tx: None }
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.emit(UiEvent::Alert(message.into()));
    }

    pub fn navigate_home(&self) {
        self.emit(UiEvent::NavigateHome);
    }

    fn emit(&self, event: UiEvent) {
        if let Some(tx) = &self.tx {
            // Receiver gone means the front end shut down; nothing to notify
            let _ = tx.send(event);
        }
    }
}
