//! Per-connection session negotiated during `initialize`.

use lsp_types::{InitializeParams, Uri};
use std::path::PathBuf;

use crate::config::InitOptions;
use crate::error::InitError;

/// Workspace root and linter invocation for one client connection.
///
/// Built once from the initialize request and moved into the lint worker;
/// nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub root_uri: Uri,
    /// Filesystem path of `root_uri`.
    pub root_dir: PathBuf,
    /// Linter executable followed by its fixed arguments. Never empty.
    pub command: Vec<String>,
}

impl Session {
    pub fn new(root_uri: Uri, command: Vec<String>) -> Result<Self, InitError> {
        let root_dir = uri_to_path(&root_uri)
            .ok_or_else(|| InitError::NotFileUri(root_uri.as_str().to_string()))?;
        Ok(Self {
            root_uri,
            root_dir,
            command,
        })
    }

    /// Capture the workspace root and command from the initialize request.
    ///
    /// Only the first workspace folder is honoured; `rootUri` is used when
    /// the client sends no folders at all.
    #[allow(deprecated)] // root_uri is deprecated but still the only root some clients send
    pub fn from_initialize(params: &InitializeParams) -> Result<Self, InitError> {
        let folders = params.workspace_folders.as_deref().unwrap_or_default();
        if folders.len() > 1 {
            tracing::debug!(
                ignored = folders.len() - 1,
                "only the first workspace folder is linted"
            );
        }
        let root_uri = folders
            .first()
            .map(|folder| folder.uri.clone())
            .or_else(|| params.root_uri.clone())
            .ok_or(InitError::MissingWorkspaceRoot)?;

        let options = InitOptions::from_value(params.initialization_options.as_ref());
        Self::new(root_uri, options.command_or_default())
    }
}

/// Convert a `file:` URI to a filesystem path.
///
/// Returns `None` for any other scheme. Percent-escapes are decoded
/// (e.g. `%20` → space).
pub fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    let s = uri.as_str();
    let rest = s.strip_prefix("file://")?;
    // Drop an authority component (`file://localhost/...`).
    let path = match rest.find('/') {
        Some(0) => rest,
        Some(idx) => &rest[idx..],
        None => return None,
    };
    let decoded = percent_decode(path);
    #[cfg(windows)]
    {
        // file:///C:/foo -> C:/foo
        let decoded = decoded.strip_prefix('/').unwrap_or(&decoded);
        Some(PathBuf::from(decoded))
    }
    #[cfg(not(windows))]
    {
        Some(PathBuf::from(decoded))
    }
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        // Malformed percent encoding passes through untouched.
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
