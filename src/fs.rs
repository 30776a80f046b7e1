use crate::error::AppError;
use crate::response::StreamingDescriptor;
use crate::templates::{js_string_literal, TemplateEngine};
use crate::utils::url_encode;
use chrono::{DateTime, Local};
use log::{debug, warn};
use memmap2::Mmap;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// How much of a file is copied into the reply body up front.
pub const WINDOW_SIZE: usize = 1024 * 1024;

/// Index files tried, in order, before a directory gets a generated listing.
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, devices. Never listed.
    Other,
}

/// One child of a listed directory.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Filesystem-native name, which may not be UTF-8.
    pub name: OsString,
    pub kind: EntryKind,
    /// Always 0 for directories.
    pub size: u64,
    pub modified: SystemTime,
}

/// Result of inspecting a single child while listing.
#[derive(Debug)]
pub enum EntryOutcome {
    Listed(DirectoryEntry),
    Skipped { name: String, reason: String },
}

/// Looks up the first index file present in `dir`. Only regular files count.
pub fn find_index_file(dir: &Path) -> Option<&'static str> {
    INDEX_FILES
        .into_iter()
        .find(|name| dir.join(name).is_file())
}

/// Collects the immediate children of `path`, sorted by ASCII-lowercased name.
///
/// Entries that cannot be read or stat'ed are logged and left out.
pub fn read_directory_entries(path: &Path) -> Result<Vec<DirectoryEntry>, AppError> {
    let reader = fs::read_dir(path).map_err(|e| {
        warn!("Unable to read directory '{}': {e}", path.display());
        AppError::NotFound
    })?;

    Ok(collect_entries(reader, path))
}

/// Inspects every child and keeps the ones that could be listed, sorted by name.
pub fn collect_entries<I>(children: I, path: &Path) -> Vec<DirectoryEntry>
where
    I: IntoIterator<Item = io::Result<fs::DirEntry>>,
{
    let mut entries: Vec<DirectoryEntry> = children
        .into_iter()
        .map(inspect_entry)
        .filter_map(|outcome| match outcome {
            EntryOutcome::Listed(entry) => Some(entry),
            EntryOutcome::Skipped { name, reason } => {
                debug!("Skipping '{name}' in '{}': {reason}", path.display());
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| compare_nocase(&name_bytes(&a.name), &name_bytes(&b.name)));
    entries
}

pub fn inspect_entry(entry: io::Result<fs::DirEntry>) -> EntryOutcome {
    let entry = match entry {
        Ok(entry) => entry,
        Err(e) => {
            return EntryOutcome::Skipped {
                name: "<unreadable>".to_string(),
                reason: e.to_string(),
            }
        }
    };
    let file_name = entry.file_name();
    let name = file_name.to_string_lossy().into_owned();

    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(e) => {
            return EntryOutcome::Skipped {
                name,
                reason: e.to_string(),
            }
        }
    };
    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };

    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            return EntryOutcome::Skipped {
                name,
                reason: e.to_string(),
            }
        }
    };
    let modified = match metadata.modified() {
        Ok(modified) => modified,
        Err(e) => {
            return EntryOutcome::Skipped {
                name,
                reason: e.to_string(),
            }
        }
    };

    let size = if kind == EntryKind::File {
        metadata.len()
    } else {
        0
    };

    EntryOutcome::Listed(DirectoryEntry {
        name: file_name,
        kind,
        size,
        modified,
    })
}

/// ASCII case-insensitive byte comparison, with the raw bytes as a tie-breaker.
pub fn compare_nocase(a: &[u8], b: &[u8]) -> Ordering {
    let lower_a = a.iter().map(|byte| byte.to_ascii_lowercase());
    let lower_b = b.iter().map(|byte| byte.to_ascii_lowercase());
    lower_a.cmp(lower_b).then_with(|| a.cmp(b))
}

/// Renders the listing page for `path`, which is shown to the user as `request_path`.
pub fn generate_directory_listing(path: &Path, request_path: &str) -> Result<String, AppError> {
    debug!("Generating directory listing for: '{}'", path.display());

    let entries = read_directory_entries(path)?;
    let engine = TemplateEngine::new();

    let mut html = String::from(engine.listing_shell()?);
    html.push('\n');
    // Writing into a String cannot fail.
    let _ = writeln!(html, "<script>start({});</script>", js_string_literal(request_path));

    if request_path.len() > 1 {
        html.push_str("<script>addRow(\"..\", \"..\", 1, \"0 B\", \"\");</script>\n");
    }

    let directories = entries.iter().filter(|e| e.kind == EntryKind::Directory);
    let files = entries.iter().filter(|e| e.kind == EntryKind::File);
    for entry in directories.chain(files) {
        html.push_str(&directory_row(entry));
    }

    Ok(html)
}

/// A single `addRow(...)` statement for `entry`.
pub fn directory_row(entry: &DirectoryEntry) -> String {
    let (is_dir, size) = match entry.kind {
        EntryKind::Directory => (1, "0 B".to_string()),
        _ => (0, format_file_size(entry.size)),
    };

    format!(
        "<script>addRow({}, \"{}\", {}, \"{}\", \"{}\");</script>\n",
        js_string_literal(&entry.name.to_string_lossy()),
        url_encode(&name_bytes(&entry.name)),
        is_dir,
        size,
        format_time(entry.modified)
    )
}

/// Raw bytes of a file name, as they appear in a request path.
#[cfg(unix)]
pub fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(name.as_bytes())
}

#[cfg(not(unix))]
pub fn name_bytes(name: &OsStr) -> Cow<'_, [u8]> {
    match name.to_string_lossy() {
        Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
        Cow::Owned(text) => Cow::Owned(text.into_bytes()),
    }
}

/// Format file size in human-readable format, two decimals above bytes.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut unit_index = 0;
    let mut rest = size >> 10;
    while rest > 0 && unit_index < UNITS.len() - 1 {
        unit_index += 1;
        rest >>= 10;
    }

    if unit_index == 0 {
        format!("{size} B")
    } else {
        let divisor = (1u64 << (10 * unit_index)) as f64;
        format!("{:.2} {}", size as f64 / divisor, UNITS[unit_index])
    }
}

/// Local time as `YYYY/MM/DD HH:MM:SS`.
pub fn format_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y/%m/%d %H:%M:%S").to_string()
}

/// What the file server produced for one regular file.
#[derive(Debug)]
pub struct FileWindow {
    /// True size on disk, which is what `Content-Length` carries.
    pub file_size: u64,
    /// The first `min(file_size, WINDOW_SIZE)` bytes.
    pub content: Vec<u8>,
    /// `None` for empty files.
    pub stream: Option<StreamingDescriptor>,
}

/// Maps `path` read-only and copies its first window.
///
/// Missing, non-regular, unreadable and unmappable files all report `NotFound`.
pub fn open_file_window(path: &Path) -> Result<FileWindow, AppError> {
    let not_found = |e: io::Error| {
        debug!("Cannot serve '{}': {e}", path.display());
        AppError::NotFound
    };

    let metadata = fs::metadata(path).map_err(not_found)?;
    if !metadata.is_file() {
        debug!("Not a regular file: '{}'", path.display());
        return Err(AppError::NotFound);
    }

    let file = File::open(path).map_err(not_found)?;
    let file_size = file.metadata().map_err(not_found)?.len();
    if file_size == 0 {
        return Ok(FileWindow {
            file_size,
            content: Vec::new(),
            stream: None,
        });
    }

    // SAFETY: the mapping is read-only; a file truncated underneath it is the same hazard
    // every mmap-based reader accepts.
    let mapping = unsafe { Mmap::map(&file) }.map_err(not_found)?;
    let mapped_size = mapping.len() as u64;
    let window = mapping.len().min(WINDOW_SIZE);
    let content = mapping[..window].to_vec();

    Ok(FileWindow {
        file_size: mapped_size,
        content,
        stream: Some(StreamingDescriptor::new(mapping, window as u64)),
    })
}
