//! Sends diagnostics back to the client.

use crossbeam_channel::Sender;
use lsp_server::{Message, Notification};
use lsp_types::notification::{Notification as _, PublishDiagnostics};
use lsp_types::{Diagnostic, PublishDiagnosticsParams, Uri};

use crate::error::PublishError;

/// Writes `textDocument/publishDiagnostics` notifications to the transport.
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: Sender<Message>,
}

impl Publisher {
    pub fn new(sender: Sender<Message>) -> Self {
        Self { sender }
    }

    /// Replace the client's diagnostics for `uri` with `diagnostics`.
    ///
    /// An empty set is sent as-is; it clears whatever was shown before.
    pub fn publish(&self, uri: Uri, diagnostics: Vec<Diagnostic>) -> Result<(), PublishError> {
        let uri_str = uri.as_str().to_string();
        let params = PublishDiagnosticsParams {
            uri,
            diagnostics,
            version: None,
        };
        let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
        self.sender
            .send(Message::Notification(not))
            .map_err(|_| PublishError { uri: uri_str })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_full_replacement_set() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let publisher = Publisher::new(tx);
        let uri: Uri = "file:///proj/a.go".parse().unwrap();

        publisher.publish(uri, Vec::new()).unwrap();

        let Message::Notification(not) = rx.try_recv().unwrap() else {
            panic!("expected a notification");
        };
        assert_eq!(not.method, "textDocument/publishDiagnostics");
        assert_eq!(not.params["uri"], "file:///proj/a.go");
        assert_eq!(not.params["diagnostics"], serde_json::json!([]));
    }

    #[test]
    fn disconnected_transport_is_an_error() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let publisher = Publisher::new(tx);
        let err = publisher
            .publish("file:///proj/a.go".parse().unwrap(), Vec::new())
            .unwrap_err();
        assert_eq!(err.uri, "file:///proj/a.go");
    }
}
