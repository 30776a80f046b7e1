use crate::error::AppError;
use crate::handler::RequestHandler;
use crate::response::{Header, Reply, Status};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;

/// A parsed request head. Only `uri` drives the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Raw target from the request line, still percent-encoded.
    pub uri: String,
    pub http_version: String,
    pub headers: Vec<Header>,
}

impl Request {
    /// A `GET` for `uri`, mostly handy when driving the handler directly.
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            uri: uri.into(),
            http_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }
}

/// Reads the request line and headers, stopping at the blank line.
pub fn read_request<R: Read>(reader: R) -> Result<Request, AppError> {
    let reader = BufReader::new(reader);
    let mut lines_iter = reader.lines();

    let request_line = match lines_iter.next() {
        Some(Ok(line)) => line,
        Some(Err(e)) if e.kind() == std::io::ErrorKind::InvalidData => {
            return Err(AppError::BadRequest)
        }
        Some(Err(e)) => return Err(AppError::Io(e)),
        None => return Err(AppError::BadRequest),
    };

    let mut parts = request_line.split_whitespace();
    let (method, uri, http_version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(uri), Some(version), None) if version.starts_with("HTTP/") => {
            (method.to_string(), uri.to_string(), version.to_string())
        }
        _ => return Err(AppError::BadRequest),
    };

    let mut headers = Vec::new();
    for line in lines_iter {
        let line = line.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => AppError::BadRequest,
            _ => AppError::Io(e),
        })?;
        if line.is_empty() {
            break;
        }
        match line.split_once(':') {
            Some((name, value)) => headers.push(Header::new(name.trim(), value.trim())),
            None => return Err(AppError::BadRequest),
        }
    }

    Ok(Request {
        method,
        uri,
        http_version,
        headers,
    })
}

/// Handles a single client connection: one request, one reply, then close.
pub fn handle_client(
    mut stream: TcpStream,
    handler: &RequestHandler,
    chunk_size: usize,
    log_prefix: &str,
) -> Result<(), AppError> {
    let request = match read_request(&stream) {
        Ok(request) => request,
        Err(AppError::BadRequest) => {
            warn!("{log_prefix} Malformed request head");
            Reply::stock_reply(Status::BadRequest).send(&mut stream, true, chunk_size, log_prefix)?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    debug!("{} Request: {} {}", log_prefix, request.method, request.uri);

    let mut reply = Reply::new();
    handler.handle_request(&request, &mut reply);
    let status = reply.status;

    let send_body = request.method != "HEAD";
    let sent = reply.send(&mut stream, send_body, chunk_size, log_prefix)?;
    stream.flush()?;

    info!(
        "{} {} {} -> {} ({} body bytes)",
        log_prefix,
        request.method,
        request.uri,
        status.code(),
        sent
    );
    Ok(())
}
