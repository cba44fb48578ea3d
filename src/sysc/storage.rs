//! Byte-oriented file primitives used by the persistence controller.

use super::{ConfigError, ConfigResult};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

/// File access needed to persist the configuration.
///
/// On the logger this is the FAT volume mounted through the VFS; on the host it is any
/// directory. Implementations must not buffer writes past the return of [`write`](Self::write).
pub trait Storage: Send + Sync {
    /// Read the whole file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file is missing or unreadable.
    fn read(&self, path: &Path) -> ConfigResult<Vec<u8>>;

    /// Replace the file's contents.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be created or fully written.
    fn write(&self, path: &Path, contents: &[u8]) -> ConfigResult<()>;

    /// Move `from` over `to`, replacing `to` if it exists.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`], with [`io::ErrorKind::NotFound`] when `from` does not exist.
    fn rename(&self, from: &Path, to: &Path) -> ConfigResult<()>;
}

/// [`Storage`] on top of `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> ConfigResult<Vec<u8>> {
        fs::read(path).map_err(|source| io_error(path, source))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> ConfigResult<()> {
        let mut file = fs::File::create(path).map_err(|source| io_error(path, source))?;

        file.write_all(contents)
            .and_then(|()| file.sync_all())
            .map_err(|source| io_error(path, source))
    }

    fn rename(&self, from: &Path, to: &Path) -> ConfigResult<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            // FAT does not replace an existing target on rename.
            Err(why) if why.kind() != io::ErrorKind::NotFound && to.exists() => {
                fs::remove_file(to).map_err(|source| io_error(to, source))?;
                fs::rename(from, to).map_err(|source| io_error(from, source))
            }
            Err(why) => Err(io_error(from, why)),
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Returns whether `err` means "the file is not there".
pub fn is_not_found(err: &ConfigError) -> bool {
    matches!(err, ConfigError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rename_replaces_existing_target() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("config.txt");
        let to = dir.path().join("config_backup.txt");

        FsStorage.write(&from, b"new").unwrap();
        FsStorage.write(&to, b"old").unwrap();
        FsStorage.rename(&from, &to).unwrap();

        assert_eq!(FsStorage.read(&to).unwrap(), b"new");
        assert!(!from.exists());
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempdir().unwrap();
        let err = FsStorage
            .rename(&dir.path().join("nope"), &dir.path().join("other"))
            .unwrap_err();

        assert!(is_not_found(&err));
    }
}
