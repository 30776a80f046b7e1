use crate::error::AppError;
use crate::utils::url_decode;
use std::path::PathBuf;

/// A request path that passed validation, plus where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `doc_root` and `request_path` concatenated.
    pub full_path: PathBuf,
    /// Decoded request path, always starting with `/`. Bytes that are not UTF-8 are
    /// replaced here, so use it for display and extension lookup only.
    pub request_path: String,
}

impl ResolvedPath {
    pub fn extension(&self) -> &str {
        extension_of(&self.request_path)
    }

    /// Points this path at `name` inside the directory it currently names.
    pub fn join(&self, name: &str) -> ResolvedPath {
        let mut request_path = self.request_path.clone();
        if !request_path.ends_with('/') {
            request_path.push('/');
        }
        request_path.push_str(name);

        ResolvedPath {
            full_path: self.full_path.join(name),
            request_path,
        }
    }
}

/// Decodes `raw_uri` and maps it under `doc_root`.
///
/// The decoded path must be absolute and must not contain `..` anywhere. This is a
/// substring check over the whole path, not per-segment normalization, so a name such as
/// `a..b` is rejected too.
pub fn resolve(doc_root: &str, raw_uri: &str) -> Result<ResolvedPath, AppError> {
    let raw_path = match raw_uri.find(['?', '#']) {
        Some(end) => &raw_uri[..end],
        None => raw_uri,
    };

    let decoded = url_decode(raw_path).map_err(|_| AppError::BadRequest)?;

    if decoded.first() != Some(&b'/') || decoded.windows(2).any(|pair| pair == b"..") {
        return Err(AppError::BadRequest);
    }

    let request_path = String::from_utf8_lossy(&decoded).into_owned();
    let full_path = join_doc_root(doc_root, decoded)?;

    Ok(ResolvedPath {
        full_path,
        request_path,
    })
}

/// `doc_root` followed by the decoded bytes, kept byte-exact so that names which are
/// not UTF-8 still reach the file they came from.
#[cfg(unix)]
fn join_doc_root(doc_root: &str, decoded: Vec<u8>) -> Result<PathBuf, AppError> {
    use std::ffi::OsString;
    use std::os::unix::ffi::OsStringExt;

    let mut bytes = Vec::with_capacity(doc_root.len() + decoded.len());
    bytes.extend_from_slice(doc_root.as_bytes());
    bytes.extend_from_slice(&decoded);
    Ok(PathBuf::from(OsString::from_vec(bytes)))
}

#[cfg(not(unix))]
fn join_doc_root(doc_root: &str, decoded: Vec<u8>) -> Result<PathBuf, AppError> {
    let request_path = String::from_utf8(decoded).map_err(|_| AppError::BadRequest)?;
    Ok(PathBuf::from(format!("{doc_root}{request_path}")))
}

/// Text after the last `.` of the final path segment, or `""` when there is none.
pub fn extension_of(request_path: &str) -> &str {
    let last_segment_start = request_path.rfind('/').map_or(0, |pos| pos + 1);
    let last_segment = &request_path[last_segment_start..];
    match last_segment.rfind('.') {
        Some(dot) => &last_segment[dot + 1..],
        None => "",
    }
}
