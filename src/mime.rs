//! Extension to content-type lookup.

/// Content type used when an extension has no mapping.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Maps a bare file extension (no leading dot) to a content-type string.
///
/// Implementations must be total: unknown extensions get a fallback type rather than an
/// error. The lookup is shared read-only between worker threads.
pub trait MimeLookup: Send + Sync {
    fn extension_to_type(&self, extension: &str) -> &str;
}

/// Native MIME type table for common file types.
///
/// Matching is exact, so `HTML` does not map to `text/html`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MimeTypes;

impl MimeLookup for MimeTypes {
    fn extension_to_type(&self, extension: &str) -> &str {
        match extension {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "xml" => "application/xml",
            "txt" => "text/plain",
            "md" => "text/markdown",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "svg" => "image/svg+xml",
            "ico" => "image/x-icon",
            "pdf" => "application/pdf",
            "zip" => "application/zip",
            "tar" => "application/x-tar",
            "gz" => "application/gzip",
            "mp4" => "video/mp4",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            _ => DEFAULT_MIME_TYPE,
        }
    }
}
