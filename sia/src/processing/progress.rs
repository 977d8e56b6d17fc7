use tokio::sync::mpsc;

use crate::models::RunEvent;

/// Fan-out point for [`RunEvent`]s. A reporter without a receiver just logs.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl ProgressReporter {
    pub fn new(sender: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, event: RunEvent) {
        tracing::debug!(%event, "Run event");
        if let Some(sender) = &self.sender {
            // A closed receiver only means nobody is watching any more.
            let _ = sender.send(event);
        }
    }
}
