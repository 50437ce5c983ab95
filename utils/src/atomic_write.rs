//! Atomic file write helpers.
//!
//! Writes go to a temp file in the destination directory and are renamed into
//! place. When the rename cannot replace an existing file, the old file is
//! moved to `<name>.bak` first and restored if the second rename fails.
//! [`read_recovering`] undoes a crash that happened inside that window.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct AtomicWriteOptions {
    /// `fsync` the temp file before it is renamed.
    pub sync_all: bool,
    /// Best-effort `fsync` of the parent directory after the rename.
    pub dir_sync: bool,
    /// Unix permission bits applied to the final file. Ignored elsewhere.
    pub unix_mode: Option<u32>,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self {
        Self {
            sync_all: true,
            dir_sync: false,
            // Snapshots hold juror notes; keep them owner-only.
            unix_mode: Some(0o600),
        }
    }
}

/// Restore `path` from `path.bak` if a previous write was interrupted between
/// moving the old file aside and renaming the new one in.
pub fn recover_bak_file(path: &Path) {
    let backup = path.with_extension("bak");
    if !path.exists() && backup.exists() {
        match fs::rename(&backup, path) {
            Ok(()) => {
                tracing::warn!(
                    path = %path.display(),
                    "Recovered .bak file from interrupted atomic write"
                );
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "Failed to recover .bak file: {e}"
                );
            }
        }
    }
}

/// Read a file written by [`atomic_write`], recovering a stranded `.bak` first.
///
/// Returns `Ok(None)` when neither the file nor its backup exists.
pub fn read_recovering(path: &Path) -> io::Result<Option<String>> {
    recover_bak_file(path);
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    atomic_write_with_options(path, bytes, AtomicWriteOptions::default())
}

pub fn atomic_write_with_options(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if options.sync_all {
        tmp.as_file().sync_all()?;
    }

    if let Err(err) = tmp.persist(path) {
        if !path.exists() {
            return Err(err.error);
        }
        let backup_path = path.with_extension("bak");
        let _ = fs::remove_file(&backup_path);
        fs::rename(path, &backup_path)?;

        if let Err(rename_err) = err.file.persist(path) {
            let _ = fs::rename(&backup_path, path);
            return Err(rename_err.error);
        }
        if let Err(e) = fs::remove_file(&backup_path) {
            tracing::warn!(
                path = %backup_path.display(),
                "Failed to remove .bak after atomic write: {e}"
            );
        }
    }

    apply_unix_mode(path, options.unix_mode)?;

    if options.dir_sync
        && let Err(e) = File::open(parent).and_then(|d| d.sync_all())
    {
        debug!(path = %parent.display(), "Parent directory sync_all failed (best-effort): {e}");
    }

    Ok(())
}

#[cfg(unix)]
fn apply_unix_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_unix_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{AtomicWriteOptions, atomic_write_with_options, read_recovering};

    fn fast() -> AtomicWriteOptions {
        AtomicWriteOptions {
            sync_all: false,
            dir_sync: false,
            unix_mode: None,
        }
    }

    #[test]
    fn overwrites_existing_and_cleans_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");

        atomic_write_with_options(&path, b"one", fast()).expect("write one");
        atomic_write_with_options(&path, b"two", fast()).expect("write two");

        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deeper").join("state.json");

        atomic_write_with_options(&path, b"{}", fast()).expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "{}");
    }

    #[test]
    fn read_recovering_restores_stranded_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        fs::write(path.with_extension("bak"), "saved").expect("write bak");

        let content = read_recovering(&path).expect("read");
        assert_eq!(content.as_deref(), Some("saved"));
        assert!(path.exists());
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn read_recovering_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let content = read_recovering(&dir.path().join("absent.json")).expect("read");
        assert!(content.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn applies_unix_permissions_when_configured() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("secure.json");
        let opts = AtomicWriteOptions {
            unix_mode: Some(0o600),
            ..fast()
        };

        atomic_write_with_options(&path, b"secret", opts).expect("write");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
