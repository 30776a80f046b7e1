//! Turns a parsed request into a reply.

use crate::error::AppError;
use crate::fs::{find_index_file, generate_directory_listing, open_file_window};
use crate::http::Request;
use crate::mime::{MimeLookup, MimeTypes};
use crate::resolve::{resolve, ResolvedPath};
use crate::response::{Reply, Status};
use log::{debug, info};

/// Read-only settings shared by every request.
pub struct HandlerConfig {
    /// Prepended verbatim to the decoded request path.
    pub doc_root: String,
    pub mime_types: Box<dyn MimeLookup>,
}

impl HandlerConfig {
    pub fn new(doc_root: impl Into<String>) -> Self {
        Self {
            doc_root: doc_root.into(),
            mime_types: Box::new(MimeTypes),
        }
    }

    pub fn with_mime_lookup(mut self, mime_types: impl MimeLookup + 'static) -> Self {
        self.mime_types = Box::new(mime_types);
        self
    }
}

/// The common handler for all incoming requests.
///
/// Holds no mutable state; one instance can serve any number of threads at once.
pub struct RequestHandler {
    config: HandlerConfig,
}

impl RequestHandler {
    pub fn new(config: HandlerConfig) -> Self {
        Self { config }
    }

    pub fn doc_root(&self) -> &str {
        &self.config.doc_root
    }

    /// Handle a request and produce a reply.
    ///
    /// On failure `reply` is overwritten with the stock page for the error's status, so a
    /// half-built body never escapes.
    pub fn handle_request(&self, req: &Request, reply: &mut Reply) {
        match self.build_reply(req) {
            Ok(built) => *reply = built,
            Err(e) => {
                info!("{} {} -> {}", req.method, req.uri, e);
                *reply = Reply::stock_reply(e.status());
            }
        }
    }

    fn build_reply(&self, req: &Request) -> Result<Reply, AppError> {
        let resolved = resolve(&self.config.doc_root, &req.uri)?;

        if resolved.full_path.is_dir() {
            match find_index_file(&resolved.full_path) {
                Some(index) => {
                    debug!("Serving index '{index}' for '{}'", resolved.request_path);
                    self.serve_file(&resolved.join(index))
                }
                None => self.serve_directory(&resolved),
            }
        } else {
            self.serve_file(&resolved)
        }
    }

    fn serve_directory(&self, resolved: &ResolvedPath) -> Result<Reply, AppError> {
        let html = generate_directory_listing(&resolved.full_path, &resolved.request_path)?;

        let mut reply = Reply::new();
        reply.status = Status::Ok;
        reply.set_content_headers(
            html.len() as u64,
            self.config.mime_types.extension_to_type("html"),
        );
        reply.content = html.into_bytes();
        Ok(reply)
    }

    fn serve_file(&self, resolved: &ResolvedPath) -> Result<Reply, AppError> {
        let window = open_file_window(&resolved.full_path)?;

        let mut reply = Reply::new();
        reply.status = Status::Ok;
        reply.set_content_headers(
            window.file_size,
            self.config.mime_types.extension_to_type(resolved.extension()),
        );
        reply.content = window.content;
        if let Some(stream) = window.stream {
            reply.set_stream(stream);
        }
        Ok(reply)
    }
}
