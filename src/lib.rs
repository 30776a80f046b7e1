/// # dirserve
///
/// The request-to-reply core of a static file server, plus a small blocking server that
/// drives it.
///
/// [`handler::RequestHandler`] maps a request path under a document root to either a
/// generated directory listing or a file. Files larger than [`fs::WINDOW_SIZE`] carry a
/// [`response::StreamingDescriptor`] so the writer can send the rest without re-reading.
pub mod cli;
pub mod error;
pub mod fs;
pub mod handler;
pub mod http;
pub mod mime;
pub mod resolve;
pub mod response;
pub mod server;
pub mod templates;
pub mod utils;


use crate::cli::Cli;
use clap::Parser;
use log::error;

/// Initializes the logger, parses command-line arguments, and starts the server.
///
/// `RUST_LOG` takes precedence over the `--verbose` / `--detailed-logging` flags.
pub fn run() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.detailed_logging {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    log::debug!("Log level set to: {log_level}");

    if let Err(e) = server::run_server(cli, None, None) {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
