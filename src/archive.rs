//! Reading archive text out of zip, gzip and plain files.
//!
//! Container handles live only inside the reader functions, so they are
//! closed on every exit path before the text reaches the parser.

use crate::error::{IgraError, Result};
use crate::models::ArchiveFormat;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Upper bound on the buffer reserved from a zip entry's declared size
const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Read the whole decompressed archive as UTF-8 text
pub fn read_archive_text(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(IgraError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = ArchiveFormat::from_path(path);
    let bytes = match format {
        ArchiveFormat::Zip => read_zip(path)?,
        ArchiveFormat::Gzip => read_gzip(path)?,
        ArchiveFormat::PlainText => std::fs::read(path)?,
    };

    debug!(
        "Read {} bytes from {} ({:?})",
        bytes.len(),
        path.display(),
        format
    );

    String::from_utf8(bytes).map_err(|_| IgraError::InvalidEncoding {
        path: path.to_path_buf(),
    })
}

/// Contents of the single entry of a zip archive
fn read_zip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| IgraError::container(path, e.to_string()))?;

    if archive.len() != 1 {
        return Err(IgraError::container(
            path,
            format!("expected exactly one entry, found {}", archive.len()),
        ));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| IgraError::container(path, e.to_string()))?;
    debug!("Reading zip entry '{}' from {}", entry.name(), path.display());

    // The declared size is only a hint; the entry is read to its real end
    let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOCATION) as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| IgraError::container(path, e.to_string()))?;
    Ok(bytes)
}

/// Decompressed contents of every member of a gzip stream
fn read_gzip(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(file));

    let mut bytes = Vec::new();
    decoder
        .read_to_end(&mut bytes)
        .map_err(|e| IgraError::container(path, e.to_string()))?;
    Ok(bytes)
}
