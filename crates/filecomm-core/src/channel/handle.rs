//! The handle a callback uses to produce or consume one record.

use super::types::Direction;
use crate::backend::DataFile;
use crate::error::StreamError;
use std::fmt;
use std::path::Path;

/// Callback invoked when a channel is runnable.
pub type StreamCallback = Box<dyn FnMut(&mut StreamHandle<'_>) + 'static>;

/// Access to the channel's data file for the duration of one callback.
///
/// The first I/O error is recorded and every later call becomes a no-op;
/// the dispatch loop reports it after the file is closed and leaves the
/// sentinels untouched so the record is retried on the next tick.
pub struct StreamHandle<'a> {
    name: &'a str,
    direction: Direction,
    file: DataFile,
    error: Option<StreamError>,
}

impl<'a> StreamHandle<'a> {
    pub(crate) fn new(name: &'a str, direction: Direction, file: DataFile) -> Self {
        Self {
            name,
            direction,
            file,
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn data_path(&self) -> &Path {
        self.file.path()
    }

    /// Append formatted text to the record.
    ///
    /// ```rust,ignore
    /// handle.send(format_args!("speed_left: {:.2}", speed));
    /// ```
    pub fn send(&mut self, args: fmt::Arguments<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(source) = self.file.write_fmt_args(args) {
            self.error = Some(StreamError::IoWriteFailed {
                path: self.file.path().to_path_buf(),
                source,
            });
        }
    }

    /// Append formatted text followed by a newline.
    pub fn send_line(&mut self, args: fmt::Arguments<'_>) {
        self.send(args);
        self.send(format_args!("\n"));
    }

    /// Read the next line of the record without its line terminator.
    ///
    /// Returns `None` at end of data, or once an error has been recorded.
    pub fn read_line(&mut self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }

        let mut line = String::new();
        match self.file.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
            Err(source) => {
                self.error = Some(StreamError::IoReadFailed {
                    path: self.file.path().to_path_buf(),
                    source,
                });
                None
            }
        }
    }

    /// Whether an I/O error has been recorded during this callback.
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn into_parts(self) -> (DataFile, Option<StreamError>) {
        (self.file, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    #[test]
    fn test_read_line_strips_terminators() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.txt");
        fs::write(&path, "a: 1\r\nb: 2\nlast").unwrap();

        let file = DataFile::reader(&path, File::open(&path).unwrap());
        let mut handle = StreamHandle::new("x", Direction::Read, file);

        assert_eq!(handle.read_line().as_deref(), Some("a: 1"));
        assert_eq!(handle.read_line().as_deref(), Some("b: 2"));
        assert_eq!(handle.read_line().as_deref(), Some("last"));
        assert_eq!(handle.read_line(), None);
        assert!(!handle.has_failed());
    }

    #[test]
    fn test_send_on_reader_records_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.txt");
        fs::write(&path, "a\n").unwrap();

        let file = DataFile::reader(&path, File::open(&path).unwrap());
        let mut handle = StreamHandle::new("x", Direction::Read, file);
        handle.send_line(format_args!("oops"));

        assert!(handle.has_failed());
        // Sticky: reads are refused once a failure is recorded
        assert_eq!(handle.read_line(), None);

        let (_, error) = handle.into_parts();
        assert!(matches!(error, Some(StreamError::IoWriteFailed { .. })));
    }

    #[test]
    fn test_send_line_appends_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("x.txt");

        let file = DataFile::writer(&path, File::create(&path).unwrap());
        let mut handle = StreamHandle::new("x", Direction::Write, file);
        handle.send(format_args!("packet_id: {}", 7));
        handle.send_line(format_args!(", ok"));
        handle.send_line(format_args!("range_0: {:.2}", 5.5));

        let (file, error) = handle.into_parts();
        assert!(error.is_none());
        file.finish().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "packet_id: 7, ok\nrange_0: 5.50\n"
        );
    }
}
