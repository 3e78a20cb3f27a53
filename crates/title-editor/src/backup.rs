//! One-time `.bak` copies and whole-file replacement.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::Error;

/// `icon.sys` -> `icon.sys.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Writes `original` to the backup path unless a backup file is already
/// there. Returns the path when a new backup was created.
pub fn ensure_backup(path: &Path, original: &[u8]) -> io::Result<Option<PathBuf>> {
    let backup = backup_path(path);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&backup) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            if backup.is_file() {
                log::debug!("keeping existing backup {}", backup.display());
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "backup path exists and is not a file",
            ));
        }
        Err(err) => return Err(err),
    };
    file.write_all(original)?;
    file.sync_all()?;
    Ok(Some(backup))
}

/// Replaces `path` with `contents` through a temporary file in the same
/// directory, so the target is either fully old or fully new.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    if let Ok(metadata) = fs::metadata(path) {
        staged.as_file().set_permissions(metadata.permissions())?;
    }
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Backs up (when enabled) and then overwrites `path`. Nothing is written if
/// the backup cannot be made.
pub fn commit(path: &Path, original: &[u8], updated: &[u8], backup: bool) -> Result<(), Error> {
    if backup {
        let created = ensure_backup(path, original).map_err(|source| Error::Backup {
            path: backup_path(path),
            source,
        })?;
        if let Some(created) = created {
            log::info!("created backup {}", created.display());
        }
    }

    write_atomically(path, updated).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {} bytes to {}", updated.len(), path.display());
    Ok(())
}
