//! Static server configuration and client-supplied initialization options.

use serde_json::Value;

/// Invocation used when the client does not supply one.
pub const DEFAULT_COMMAND: &[&str] = &["golangci-lint", "run", "--out-format", "json"];

/// Settings fixed at process startup, before any client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Prefix each diagnostic message with `"<linter>: "`.
    pub include_linter_name: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            include_linter_name: true,
        }
    }
}

/// Options recognised in `initializationOptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Linter executable followed by its fixed arguments.
    pub command: Option<Vec<String>>,
}

impl InitOptions {
    /// Decode the options bag, treating anything unexpected as "no override".
    ///
    /// Clients send all sorts of shapes here (`null`, editor-specific keys,
    /// strings instead of arrays), so this never fails.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(value) = value else {
            return Self::default();
        };
        let map = match value {
            Value::Null => return Self::default(),
            Value::Object(map) => map,
            other => {
                tracing::warn!(options = %other, "initializationOptions is not an object");
                return Self::default();
            }
        };

        let command = match map.get("command") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => {
                let parts: Option<Vec<String>> = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect();
                match parts {
                    Some(parts) if !parts.is_empty() => Some(parts),
                    Some(_) => {
                        tracing::warn!("command override is empty, using the default");
                        None
                    }
                    None => {
                        tracing::warn!("command override contains non-string elements, ignoring");
                        None
                    }
                }
            }
            Some(other) => {
                tracing::warn!(command = %other, "command override is not an array, ignoring");
                None
            }
        };

        Self { command }
    }

    /// The configured command, or [`DEFAULT_COMMAND`].
    pub fn command_or_default(&self) -> Vec<String> {
        match &self.command {
            Some(command) => command.clone(),
            None => DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }
}
