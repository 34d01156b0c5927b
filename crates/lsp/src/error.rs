//! Error types for the lint pipeline and the session around it.

/// A lint cycle that produced no usable result.
///
/// Never fatal: the `Display` text becomes the message of a single
/// Error-severity diagnostic on the linted document.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// The linter executable could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The linter exited unsuccessfully without writing anything to stdout.
    #[error("{message}")]
    Exit { code: Option<i32>, message: String },

    /// The first line of stdout was not a valid result document.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl LintError {
    /// Build an [`LintError::Exit`] from the captured stderr payload.
    ///
    /// The linter reports fatal configuration problems on stderr only, so
    /// that text is the message when there is any.
    pub fn exit(program: &str, code: Option<i32>, stderr: &[u8]) -> Self {
        let text = String::from_utf8_lossy(stderr);
        let text = text.trim_end();
        let message = match (text.is_empty(), code) {
            (false, _) => text.to_string(),
            (true, Some(code)) => format!("{program} exited with status {code}"),
            (true, None) => format!("{program} was terminated by a signal"),
        };
        LintError::Exit { code, message }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("lint command is empty")]
    Empty,
}

/// Submission to the lint queue failed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue was closed by shutdown, or the worker is gone.
    #[error("lint queue is closed")]
    Closed,
    /// A lint cycle is in flight and the caller asked not to wait.
    #[error("lint worker is busy")]
    Busy,
}

/// The transport refused a diagnostics notification. Fatal to the session.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to publish diagnostics for {uri}: transport disconnected")]
pub struct PublishError {
    pub uri: String,
}

/// The initialize request did not describe a usable workspace.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("initialize request carries neither workspaceFolders nor rootUri")]
    MissingWorkspaceRoot,

    #[error("workspace root is not a file URI: {0}")]
    NotFileUri(String),
}
