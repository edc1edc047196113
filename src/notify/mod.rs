pub mod models;
pub use models::*;

use std::sync::Arc;

use tokio::sync::mpsc;

/// Where user facing notices go. Delivery is fire and forget.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

pub type BoxedNotifier = Arc<dyn Notifier + Send + Sync + 'static>;

/// Prints notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice);
    }
}

/// Forwards notices to a channel for a UI layer to drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Closed receiver means nobody is watching
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice dropped, receiver closed");
        }
    }
}
