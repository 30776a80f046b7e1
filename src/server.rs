use crate::cli::Cli;
use crate::error::AppError;
use crate::handler::{HandlerConfig, RequestHandler};
use crate::http::handle_client;
use log::{debug, error, info};
use rand::Rng;
use std::net::{SocketAddr, TcpListener};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use threadpool::ThreadPool;

/// Serves `cli.directory` until `shutdown_rx` fires (or forever, without one).
///
/// `addr_tx` receives the bound address, which is how tests learn the port picked for
/// `--port 0`.
pub fn run_server(
    cli: Cli,
    shutdown_rx: Option<mpsc::Receiver<()>>,
    addr_tx: Option<mpsc::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let doc_root = cli.directory.canonicalize()?;
    if !doc_root.is_dir() {
        return Err(AppError::DirectoryNotFound(
            cli.directory.to_string_lossy().into_owned(),
        ));
    }

    // Request paths always start with '/', so the root must not end with one.
    let doc_root = doc_root.to_string_lossy().trim_end_matches('/').to_string();
    let handler = Arc::new(RequestHandler::new(HandlerConfig::new(doc_root)));

    let bind_address: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let listener = TcpListener::bind(bind_address)?;
    let local_addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    if let Some(tx) = addr_tx {
        if tx.send(local_addr).is_err() {
            error!("Nobody is waiting for the server address");
        }
    }

    info!(
        "Server listening on {} for directory '{}'",
        local_addr,
        handler.doc_root()
    );

    let pool = ThreadPool::new(cli.threads.max(1));
    let chunk_size = cli.chunk_size.max(1);

    'server_loop: loop {
        if let Some(ref rx) = shutdown_rx {
            if rx.try_recv().is_ok() {
                info!("Shutdown signal received. Shutting down gracefully.");
                break 'server_loop;
            }
        }

        match listener.accept() {
            Ok((stream, peer)) => {
                let handler = Arc::clone(&handler);
                let request_id = generate_request_id();
                let log_prefix = format!("[ReqID: {request_id}][Peer: {peer}]");

                pool.execute(move || {
                    // Some platforms hand out accepted sockets in the listener's mode.
                    if let Err(e) = stream.set_nonblocking(false) {
                        error!("{log_prefix} Cannot switch socket to blocking mode: {e}");
                        return;
                    }
                    debug!("{log_prefix} Handling client connection");
                    match handle_client(stream, &handler, chunk_size, &log_prefix) {
                        Ok(()) => debug!("{log_prefix} Client handled successfully"),
                        Err(e) => error!("{log_prefix} Error handling client: {e}"),
                    }
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(e) => {
                error!("Error accepting connection: {e}");
            }
        }
    }

    pool.join();
    info!("Server shutting down gracefully.");
    Ok(())
}

fn generate_request_id() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}
