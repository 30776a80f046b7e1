use crate::error::AppError;
use crate::templates::TemplateEngine;
use log::{debug, error};
use memmap2::Mmap;
use std::io::{self, Write};

/// HTTP statuses the handler can terminate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The part of a mapped file that has not been copied into `Reply::content` yet.
///
/// Owns the mapping. The holder delivers bytes `[already_copied, file_size)` and then
/// calls [`release`](Self::release); dropping the descriptor releases it as well.
#[derive(Debug)]
pub struct StreamingDescriptor {
    mapping: Option<Mmap>,
    file_size: u64,
    already_copied: u64,
}

impl StreamingDescriptor {
    pub(crate) fn new(mapping: Mmap, already_copied: u64) -> Self {
        let file_size = mapping.len() as u64;
        Self {
            mapping: Some(mapping),
            file_size,
            already_copied,
        }
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn already_copied(&self) -> u64 {
        self.already_copied
    }

    pub fn is_released(&self) -> bool {
        self.mapping.is_none()
    }

    /// Bytes still to be delivered. Empty once released.
    pub fn remaining(&self) -> &[u8] {
        match &self.mapping {
            Some(mapping) => &mapping[self.already_copied as usize..],
            None => &[],
        }
    }

    /// Writes the remainder in `chunk_size` pieces and returns how many bytes went out.
    ///
    /// The mapping is released whether or not the write succeeds.
    pub fn write_remaining<W: Write>(&mut self, writer: &mut W, chunk_size: usize) -> io::Result<u64> {
        let result = write_chunked(self.remaining(), writer, chunk_size.max(1));
        self.release();
        result
    }

    /// Unmaps the file. Calling it again is a no-op.
    pub fn release(&mut self) {
        if self.mapping.take().is_some() {
            debug!(
                "Released file mapping ({} of {} bytes were eagerly copied)",
                self.already_copied, self.file_size
            );
        }
    }
}

impl Drop for StreamingDescriptor {
    fn drop(&mut self) {
        self.release();
    }
}

fn write_chunked<W: Write>(bytes: &[u8], writer: &mut W, chunk_size: usize) -> io::Result<u64> {
    let mut written = 0u64;
    for chunk in bytes.chunks(chunk_size) {
        writer.write_all(chunk)?;
        written += chunk.len() as u64;
    }
    Ok(written)
}

/// The semantic reply produced for one request.
#[derive(Debug)]
pub struct Reply {
    pub status: Status,
    pub headers: Vec<Header>,
    pub content: Vec<u8>,
    stream: Option<StreamingDescriptor>,
}

impl Default for Reply {
    fn default() -> Self {
        Self {
            status: Status::Ok,
            headers: Vec::new(),
            content: Vec::new(),
            stream: None,
        }
    }
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned error document for `status`.
    pub fn stock_reply(status: Status) -> Self {
        let body = generate_error_page(status);
        let mut reply = Reply {
            status,
            ..Reply::default()
        };
        reply.set_content_headers(body.len() as u64, "text/html");
        reply.content = body.into_bytes();
        reply
    }

    /// Replaces the headers with exactly `Content-Length` and `Content-Type`.
    pub fn set_content_headers(&mut self, content_length: u64, content_type: &str) {
        self.headers = vec![
            Header::new("Content-Length", content_length.to_string()),
            Header::new("Content-Type", content_type),
        ];
    }

    /// First header called `name`, compared case-sensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name == name)
            .map(|header| header.value.as_str())
    }

    pub fn stream(&self) -> Option<&StreamingDescriptor> {
        self.stream.as_ref()
    }

    pub(crate) fn set_stream(&mut self, stream: StreamingDescriptor) {
        self.stream = Some(stream);
    }

    /// Hands the streaming descriptor over to the caller, who then owns releasing it.
    pub fn take_stream(&mut self) -> Option<StreamingDescriptor> {
        self.stream.take()
    }

    /// Serializes the reply onto `writer`.
    ///
    /// With `send_body == false` (HEAD) only the status line and headers go out. Any
    /// streaming descriptor is released before this returns, on success and on error.
    pub fn send<W: Write>(
        mut self,
        writer: &mut W,
        send_body: bool,
        chunk_size: usize,
        log_prefix: &str,
    ) -> Result<u64, AppError> {
        let mut stream = self.take_stream();
        let result = self.write_to(writer, stream.as_mut(), send_body, chunk_size, log_prefix);
        if let Some(stream) = stream.as_mut() {
            stream.release();
        }
        result
    }

    fn write_to<W: Write>(
        &self,
        writer: &mut W,
        stream: Option<&mut StreamingDescriptor>,
        send_body: bool,
        chunk_size: usize,
        log_prefix: &str,
    ) -> Result<u64, AppError> {
        debug!(
            "{} Sending reply - Status: {}, Inline: {} bytes, Streamed: {} bytes",
            log_prefix,
            self.status.code(),
            self.content.len(),
            stream.as_ref().map_or(0, |s| s.remaining().len())
        );

        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status.code(), self.status.reason());
        for header in &self.headers {
            head.push_str(&format!("{}: {}\r\n", header.name, header.value));
        }
        head.push_str("Connection: close\r\n\r\n");

        writer.write_all(head.as_bytes()).map_err(|e| {
            error!("{log_prefix} Failed to write reply headers: {e}");
            AppError::Io(e)
        })?;

        let mut body_bytes = 0u64;
        if send_body {
            writer.write_all(&self.content).map_err(|e| {
                error!("{log_prefix} Failed to write reply content: {e}");
                AppError::Io(e)
            })?;
            body_bytes += self.content.len() as u64;

            if let Some(stream) = stream {
                body_bytes += stream.write_remaining(writer, chunk_size).map_err(|e| {
                    error!("{log_prefix} Failed to stream file remainder: {e}");
                    AppError::Io(e)
                })?;
            }
        }

        writer.flush().map_err(|e| {
            error!("{log_prefix} Failed to flush reply: {e}");
            AppError::Io(e)
        })?;

        Ok(body_bytes)
    }
}

/// Error pages come from the embedded template, with a bare fallback if it is missing.
fn generate_error_page(status: Status) -> String {
    let engine = TemplateEngine::new();
    engine.render_error_page(status).unwrap_or_else(|e| {
        error!("Falling back to plain error page: {e}");
        format!(
            "<html><head><title>{reason}</title></head><body><h1>{code} {reason}</h1></body></html>",
            code = status.code(),
            reason = status.reason()
        )
    })
}
