//! Sentinel backend trait and the data file handle it hands out.

use crate::error::{Result, StreamError};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Primitive operations over named files in the stream directory.
///
/// Nothing above this trait touches storage directly. All operations are
/// synchronous and block for the duration of the filesystem call.
pub trait SentinelBackend {
    /// Check whether a file exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create an empty file, truncating it if present.
    fn touch(&self, path: &Path) -> Result<()>;

    /// Remove a file. Removing a file that does not exist is not an error.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Open a data file for line-oriented reading.
    fn open_read(&self, path: &Path) -> Result<DataFile>;

    /// Open a data file for writing, discarding previous contents.
    fn open_write(&self, path: &Path) -> Result<DataFile>;

    /// Flush and release a data file.
    fn close(&self, file: DataFile) -> Result<()> {
        let path = file.path().to_path_buf();
        file.finish()
            .map_err(|source| StreamError::IoWriteFailed { path, source })
    }

    /// Release a data file without publishing a staged write.
    fn discard(&self, file: DataFile) {
        drop(file);
    }
}

/// An open data file, valid for the duration of one dispatch step.
///
/// Dropping a `DataFile` without [`SentinelBackend::close`] still releases the
/// OS handle and discards any staged, unpublished contents.
pub struct DataFile {
    path: PathBuf,
    inner: Inner,
}

enum Inner {
    Read(BufReader<File>),
    Write {
        writer: BufWriter<File>,
        /// Temp file to rename onto `path` when the write is published.
        staging: Option<PathBuf>,
    },
}

impl DataFile {
    /// Wrap a file opened for reading.
    pub fn reader(path: impl Into<PathBuf>, file: File) -> Self {
        Self {
            path: path.into(),
            inner: Inner::Read(BufReader::new(file)),
        }
    }

    /// Wrap a file that writes `path` in place.
    pub fn writer(path: impl Into<PathBuf>, file: File) -> Self {
        Self {
            path: path.into(),
            inner: Inner::Write {
                writer: BufWriter::new(file),
                staging: None,
            },
        }
    }

    /// Wrap a temp file that replaces `path` on close.
    pub fn staged_writer(path: impl Into<PathBuf>, staging: PathBuf, file: File) -> Self {
        Self {
            path: path.into(),
            inner: Inner::Write {
                writer: BufWriter::new(file),
                staging: Some(staging),
            },
        }
    }

    /// The data file this handle reads or publishes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_writer(&self) -> bool {
        matches!(self.inner, Inner::Write { .. })
    }

    /// Append formatted text.
    pub fn write_fmt_args(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        match &mut self.inner {
            Inner::Write { writer, .. } => writer.write_fmt(args),
            Inner::Read(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "data file is open for reading",
            )),
        }
    }

    /// Read the next line into `buf`, returning the number of bytes read.
    /// Zero means end of data.
    pub fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match &mut self.inner {
            Inner::Read(reader) => reader.read_line(buf),
            Inner::Write { .. } => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "data file is open for writing",
            )),
        }
    }

    /// Flush buffered output and publish a staged write.
    pub fn finish(mut self) -> io::Result<()> {
        let Inner::Write { writer, staging } = &mut self.inner else {
            return Ok(());
        };

        writer.flush()?;
        if let Some(staging) = staging.take() {
            let published = writer
                .get_ref()
                .sync_all()
                .and_then(|_| fs::rename(&staging, &self.path));
            if let Err(e) = published {
                let _ = fs::remove_file(&staging);
                return Err(e);
            }
        }
        Ok(())
    }
}

impl Drop for DataFile {
    fn drop(&mut self) {
        if let Inner::Write {
            staging: Some(staging),
            ..
        } = &self.inner
        {
            let _ = fs::remove_file(staging);
        }
    }
}

impl fmt::Debug for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataFile")
            .field("path", &self.path)
            .field("writer", &self.is_writer())
            .finish()
    }
}
