//! Filesystem implementation of the sentinel backend.
//!
//! In [`PublishMode::Atomic`] every file a reader may observe is produced by:
//! 1. Writing a temp file with a unique PID+TID suffix next to the target
//! 2. fsync of the temp file
//! 3. Rename onto the target path
//!
//! A partner process therefore sees either the previous file or the complete
//! new one. [`PublishMode::Direct`] writes in place and matches what older
//! peers expect byte for byte; the file names are the same in both modes.

use super::traits::{DataFile, SentinelBackend};
use crate::config::ProtocolConfig;
use crate::error::{Result, StreamError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use tracing::debug;

/// How writes become visible to the partner process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Truncate and write the target in place.
    Direct,
    /// Stage into a temp file and rename over the target.
    #[default]
    Atomic,
}

/// Sentinel backend over the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsBackend {
    mode: PublishMode,
}

impl FsBackend {
    pub fn new(mode: PublishMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PublishMode {
        self.mode
    }

    fn create_staged(&self, path: &Path) -> io::Result<(PathBuf, File)> {
        let staging = staging_path(path);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staging)?;
        Ok((staging, file))
    }
}

impl SentinelBackend for FsBackend {
    fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    fn touch(&self, path: &Path) -> Result<()> {
        let result = match self.mode {
            PublishMode::Direct => File::create(path).map(drop),
            PublishMode::Atomic => self.create_staged(path).and_then(|(staging, file)| {
                let published = file.sync_all().and_then(|_| fs::rename(&staging, path));
                if published.is_err() {
                    let _ = fs::remove_file(&staging);
                }
                published
            }),
        };

        result.map_err(|source| StreamError::IoCreateFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Created marker {}", path.display());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed marker {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StreamError::Io {
                message: format!("Failed to remove {}", path.display()),
                path: Some(path.to_path_buf()),
                source: Some(e),
            }),
        }
    }

    fn open_read(&self, path: &Path) -> Result<DataFile> {
        let file = File::open(path).map_err(|source| StreamError::IoOpenFailed {
            path: path.to_path_buf(),
            raced: false,
            source,
        })?;
        Ok(DataFile::reader(path, file))
    }

    fn open_write(&self, path: &Path) -> Result<DataFile> {
        let opened = match self.mode {
            PublishMode::Direct => File::create(path).map(|file| DataFile::writer(path, file)),
            PublishMode::Atomic => self
                .create_staged(path)
                .map(|(staging, file)| DataFile::staged_writer(path, staging, file)),
        };

        opened.map_err(|source| StreamError::IoOpenFailed {
            path: path.to_path_buf(),
            raced: false,
            source,
        })
    }
}

/// Temp file next to `path`: `<file>.<pid>.<tid>.tmp`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(
        ".{}.{}.{}",
        process::id(),
        thread_id(),
        ProtocolConfig::TEMP_FILE_SUFFIX
    ));
    path.with_file_name(name)
}

/// Get a unique thread identifier.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    format!("{:?}", thread::current().id()).hash(&mut hasher);
    hasher.finish()
}
