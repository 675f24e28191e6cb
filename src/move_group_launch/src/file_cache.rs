use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::{
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// Cached file content with modification time
struct CachedFile {
    content: String,
    modified: SystemTime,
}

/// Process-wide cache of configuration documents.
///
/// Assembling several plans (with and without the controller manager, or
/// for several robots) reads the same share files repeatedly.
static FILE_CACHE: Lazy<DashMap<PathBuf, CachedFile>> = Lazy::new(DashMap::new);

/// Read a file through the cache, revalidating on modification time.
pub(crate) fn read_file_cached(path: &Path) -> io::Result<String> {
    let metadata = std::fs::metadata(path)?;
    let modified = metadata.modified()?;

    if let Some(entry) = FILE_CACHE.get(path) {
        if entry.modified == modified {
            log::trace!("File cache hit: {}", path.display());
            return Ok(entry.content.clone());
        }
    }

    log::debug!("File cache miss: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    FILE_CACHE.insert(
        path.to_path_buf(),
        CachedFile {
            content: content.clone(),
            modified,
        },
    );

    Ok(content)
}

/// Read a file that may legitimately be absent.
///
/// `Ok(None)` means the file does not exist. Any other I/O failure is an error.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match read_file_cached(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
