//! File operations
//!
//! Subfolder creation and the single-file copy used by the sorter.

use crate::error::{IoResultExt, Result, SortError};
use crate::fs::ExtensionLabel;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Copy operation statistics
#[derive(Debug, Clone, Default)]
pub struct CopyStats {
    /// Bytes copied
    pub bytes_copied: u64,
}

/// Options for file copy operations
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Buffer size for reads and writes
    pub buffer_size: usize,
    /// Preserve file permissions
    pub preserve_permissions: bool,
    /// Preserve access and modification times
    pub preserve_times: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: 1024 * 1024, // 1MB
            preserve_permissions: true,
            preserve_times: true,
        }
    }
}

/// Make sure `<output_root>/<label>` exists and return it
///
/// Safe to call repeatedly and from several threads at once.
pub fn ensure_subfolder(output_root: &Path, label: &ExtensionLabel) -> Result<PathBuf> {
    let subfolder = output_root.join(label);
    std::fs::create_dir_all(&subfolder).with_path(&subfolder)?;
    Ok(subfolder)
}

/// Truncating `dest` would destroy `source` when both name the same file
fn is_same_file(source: &Path, dest: &Path) -> bool {
    if std::fs::symlink_metadata(dest).is_err() {
        return false;
    }
    match (std::fs::canonicalize(source), std::fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copies one file's contents and metadata
#[derive(Debug, Clone, Default)]
pub struct FileCopier {
    options: CopyOptions,
}

impl FileCopier {
    /// Create a new file copier with the given options
    pub fn new(options: CopyOptions) -> Self {
        Self { options }
    }

    /// Copy `source` to `dest`, overwriting `dest` if it exists
    ///
    /// Symbolic links are followed: the link target's contents are copied.
    /// Anything that is not a regular file (directory, FIFO, socket, device)
    /// is refused before it is opened.
    pub fn copy(&self, source: &Path, dest: &Path) -> Result<CopyStats> {
        let metadata = std::fs::metadata(source).with_path(source)?;
        if !metadata.is_file() {
            return Err(SortError::io(
                source,
                std::io::Error::new(std::io::ErrorKind::Other, "not a regular file"),
            ));
        }

        if is_same_file(source, dest) {
            return Err(SortError::SameFile(dest.to_path_buf()));
        }

        self.make_writable(dest)?;
        let bytes_copied = self.copy_buffered(source, dest)?;

        if self.options.preserve_permissions {
            std::fs::set_permissions(dest, metadata.permissions()).with_path(dest)?;
        }

        if self.options.preserve_times {
            self.copy_times(&metadata, dest)?;
        }

        Ok(CopyStats { bytes_copied })
    }

    /// Buffered copy into a truncated destination
    fn copy_buffered(&self, source: &Path, dest: &Path) -> Result<u64> {
        let src_file = File::open(source).with_path(source)?;
        let dst_file = File::create(dest).with_path(dest)?;

        let mut reader = BufReader::with_capacity(self.options.buffer_size, src_file);
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, dst_file);

        let bytes_copied = std::io::copy(&mut reader, &mut writer).with_path(source)?;

        writer.flush().with_path(dest)?;

        Ok(bytes_copied)
    }

    /// A read-only copy left by an earlier run would block the overwrite
    fn make_writable(&self, dest: &Path) -> Result<()> {
        let Ok(existing) = std::fs::symlink_metadata(dest) else {
            return Ok(());
        };

        if existing.is_file() && existing.permissions().readonly() {
            let mut permissions = existing.permissions();
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            std::fs::set_permissions(dest, permissions).with_path(dest)?;
        }

        Ok(())
    }

    /// Copy access and modification times
    fn copy_times(&self, metadata: &std::fs::Metadata, dest: &Path) -> Result<()> {
        let mtime = filetime::FileTime::from_last_modification_time(metadata);
        let atime = filetime::FileTime::from_last_access_time(metadata);
        filetime::set_file_times(dest, atime, mtime).with_path(dest)
    }
}
