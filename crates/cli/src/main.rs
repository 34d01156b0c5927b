mod logging;

use std::process;

use clap::Parser;
use lintbridge_lsp::ServerConfig;

use crate::logging::LogLevel;

/// Language server that publishes golangci-lint findings as diagnostics.
#[derive(Parser)]
#[command(
    name = "lintbridge",
    version,
    about = "Language server that publishes golangci-lint findings as diagnostics"
)]
struct Cli {
    /// Don't prefix diagnostic messages with the linter name
    #[arg(long = "nolintername")]
    no_linter_name: bool,

    /// Log verbosity (overridden by RUST_LOG)
    #[arg(long = "loglevel", default_value = "info", value_enum)]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let config = ServerConfig {
        include_linter_name: !cli.no_linter_name,
    };
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting lintbridge");
    if let Err(e) = lintbridge_lsp::run(config) {
        tracing::error!("LSP server error: {e}");
        process::exit(1);
    }
    tracing::info!("lintbridge stopped");
}
