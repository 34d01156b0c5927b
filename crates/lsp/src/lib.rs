//! Language server that lints Go packages with golangci-lint.
//!
//! Each open or save event queues the document for the lint worker, which
//! runs the linter on the document's package, decodes its JSON output and
//! publishes the issues that belong to that document as diagnostics.
//! Connects to editors via the `lintbridge` binary over stdio.

pub mod command;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod publish;
pub mod runner;
pub mod server;
pub mod session;
pub mod worker;

pub use config::ServerConfig;

/// Run the LSP server over stdio. This is the public entry point
/// called by the `lintbridge` binary.
pub fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    server::run(config)
}
