use clap::Parser;
use std::path::PathBuf;

// Command-line configuration, read once at startup. 🎉
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "A static file server with generated directory listings.",
    long_about = "Serves the files under a document root over HTTP/1.1.\n \
        Directories are served through their index.html or index.htm when present, and otherwise as a generated listing.\n \
        Large files are sent as a 1 MiB in-memory window followed by the rest of a memory-mapped file.\n \
        Malformed or traversal-looking paths get 400 Bad Request, and anything that cannot be served gets 404 Not Found.\n"
)]
pub struct Cli {
    /// Document root to serve. This is the *only* required argument. 📂
    #[arg(short, long, required = true)]
    pub directory: PathBuf,

    /// Host address to listen on (e.g., "127.0.0.1" for local, "0.0.0.0" for everyone on the network). 👂
    #[arg(short, long, default_value = "127.0.0.1")]
    pub listen: String,

    /// Port number to listen on. 0 picks a free port. 🚪
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Number of worker threads handling connections. 🧵
    #[arg(short, long, default_value_t = 8)]
    pub threads: usize,

    /// Size of each write when streaming the part of a file past the in-memory window (in bytes). 📦
    #[arg(short, long, default_value_t = 64 * 1024)]
    pub chunk_size: usize,

    /// Enable verbose logging for debugging (log level: debug). 🐛
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Enable more detailed logging (log level: info). ℹ️
    #[arg(long, default_value_t = false)]
    pub detailed_logging: bool,
}
