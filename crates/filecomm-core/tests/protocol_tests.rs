//! Integration tests for the channel protocol through the public API.
//!
//! Writer and reader live in separate contexts over the same directory, the
//! way two processes would share it.

use filecomm_core::{
    ChannelState, DataFile, Direction, FsBackend, PublishMode, SentinelBackend, StreamContext,
    StreamError,
};
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

/// Filesystem backend that records every marker mutation in order.
#[derive(Default)]
struct RecordingBackend {
    inner: FsBackend,
    log: Rc<RefCell<Vec<String>>>,
}

impl RecordingBackend {
    fn record(&self, op: &str, path: &Path) {
        let name = path.file_name().unwrap().to_string_lossy();
        self.log.borrow_mut().push(format!("{op} {name}"));
    }
}

impl SentinelBackend for RecordingBackend {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn touch(&self, path: &Path) -> filecomm_core::Result<()> {
        self.record("touch", path);
        self.inner.touch(path)
    }

    fn remove(&self, path: &Path) -> filecomm_core::Result<()> {
        self.record("remove", path);
        self.inner.remove(path)
    }

    fn open_read(&self, path: &Path) -> filecomm_core::Result<DataFile> {
        self.record("open_read", path);
        self.inner.open_read(path)
    }

    fn open_write(&self, path: &Path) -> filecomm_core::Result<DataFile> {
        self.record("open_write", path);
        self.inner.open_write(path)
    }

    fn close(&self, file: DataFile) -> filecomm_core::Result<()> {
        self.record("close", file.path());
        self.inner.close(file)
    }
}

fn marker(dir: &TempDir, file: &str) -> bool {
    dir.path().join(file).exists()
}

#[test]
fn test_write_read_write_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let mut producer = StreamContext::new(temp_dir.path()).unwrap();
    let mut consumer = StreamContext::new(temp_dir.path()).unwrap();

    let writes = Rc::new(RefCell::new(0u32));
    let w = writes.clone();
    producer
        .create_stream("x", Direction::Write, move |h| {
            *w.borrow_mut() += 1;
            h.send_line(format_args!("seq: {}", w.borrow()));
        })
        .unwrap();

    // First-write exemption: no ack needed
    assert_eq!(producer.tick().ran, 1);
    assert!(marker(&temp_dir, "x.flag"));
    assert!(!marker(&temp_dir, "x.ack"));

    let received = Rc::new(RefCell::new(Vec::new()));
    let r = received.clone();
    consumer
        .create_stream("x", Direction::Read, move |h| {
            while let Some(line) = h.read_line() {
                r.borrow_mut().push(line);
            }
        })
        .unwrap();

    assert_eq!(consumer.tick().ran, 1);
    assert_eq!(*received.borrow(), vec!["seq: 1"]);
    assert!(!marker(&temp_dir, "x.flag"));
    assert!(marker(&temp_dir, "x.ack"));

    assert_eq!(producer.tick().ran, 1);
    assert!(!marker(&temp_dir, "x.ack"));
    assert!(marker(&temp_dir, "x.flag"));
    assert_eq!(*writes.borrow(), 2);
}

#[test]
fn test_writer_without_reader_stalls_after_first_record() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StreamContext::new(temp_dir.path()).unwrap();

    let calls = Rc::new(RefCell::new(0u32));
    let c = calls.clone();
    let id = ctx
        .create_stream("x", Direction::Write, move |_| *c.borrow_mut() += 1)
        .unwrap();

    assert_eq!(ctx.state(id).unwrap(), ChannelState::First);
    assert_eq!(ctx.tick().ran, 1);
    assert_eq!(ctx.state(id).unwrap(), ChannelState::Blocked);

    let report = ctx.tick();
    assert_eq!((report.ran, report.idle), (0, 1));
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn test_slot_holds_one_record_between_reads() {
    let temp_dir = TempDir::new().unwrap();
    let mut producer = StreamContext::new(temp_dir.path()).unwrap();
    let mut consumer = StreamContext::new(temp_dir.path()).unwrap();

    let seq = Rc::new(RefCell::new(0u32));
    let s = seq.clone();
    producer
        .create_stream("slot", Direction::Write, move |h| {
            *s.borrow_mut() += 1;
            h.send_line(format_args!("record {}", s.borrow()));
        })
        .unwrap();

    let received = Rc::new(RefCell::new(Vec::new()));
    let r = received.clone();
    consumer
        .create_stream("slot", Direction::Read, move |h| {
            let lines: Vec<String> = std::iter::from_fn(|| h.read_line()).collect();
            r.borrow_mut().push(lines);
        })
        .unwrap();

    // Producer ticks faster than the consumer; extra ticks must not overwrite
    for _ in 0..5 {
        for _ in 0..3 {
            producer.tick();
        }
        consumer.tick();
    }

    let received = received.borrow();
    assert_eq!(received.len(), 5);
    for (i, lines) in received.iter().enumerate() {
        assert_eq!(lines, &vec![format!("record {}", i + 1)]);
    }
}

#[test]
fn test_ack_removed_before_ready_created() {
    let temp_dir = TempDir::new().unwrap();
    let backend = RecordingBackend::default();
    let log = backend.log.clone();
    let mut ctx = StreamContext::with_backend(temp_dir.path(), backend);

    ctx.create_stream("x", Direction::Write, |h| h.send_line(format_args!("hi")))
        .unwrap();
    ctx.tick();

    assert_eq!(
        *log.borrow(),
        vec![
            "open_write x.txt",
            "close x.txt",
            "remove x.ack",
            "touch x.flag",
        ]
    );
}

#[test]
fn test_reader_sequence_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("x.txt"), "payload\n").unwrap();
    fs::write(temp_dir.path().join("x.flag"), "").unwrap();

    let backend = RecordingBackend::default();
    let log = backend.log.clone();
    let mut ctx = StreamContext::with_backend(temp_dir.path(), backend);
    ctx.create_stream("x", Direction::Read, |h| {
        while h.read_line().is_some() {}
    })
    .unwrap();
    ctx.tick();

    assert_eq!(
        *log.borrow(),
        vec![
            "open_read x.txt",
            "close x.txt",
            "remove x.flag",
            "touch x.ack",
        ]
    );
}

#[test]
fn test_duplicate_and_paired_names() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StreamContext::new(temp_dir.path()).unwrap();

    ctx.create_stream("cmd", Direction::Write, |_| {}).unwrap();
    let err = ctx.create_stream("cmd", Direction::Write, |_| {}).unwrap_err();
    assert!(matches!(err, StreamError::DuplicateStream { .. }));
    ctx.create_stream("cmd", Direction::Read, |_| {}).unwrap();
}

#[test]
fn test_failed_write_is_retried() {
    let temp_dir = TempDir::new().unwrap();
    let mut ctx = StreamContext::new(temp_dir.path()).unwrap();

    // A read-only operation on a write handle records an error
    let attempts = Rc::new(RefCell::new(0u32));
    let a = attempts.clone();
    let id = ctx
        .create_stream("x", Direction::Write, move |h| {
            *a.borrow_mut() += 1;
            if *a.borrow() == 1 {
                let _ = h.read_line();
            } else {
                h.send_line(format_args!("ok"));
            }
        })
        .unwrap();

    let report = ctx.tick();
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].1,
        StreamError::IoReadFailed { .. }
    ));
    assert!(report.failures[0].1.is_retryable());
    assert!(!marker(&temp_dir, "x.flag"));
    assert_eq!(ctx.state(id).unwrap(), ChannelState::First);

    let report = ctx.tick();
    assert!(report.is_clean());
    assert_eq!(report.ran, 1);
    let published = fs::read_to_string(temp_dir.path().join("x.txt")).unwrap();
    assert_eq!(published, "ok\n");
}

#[test]
fn test_atomic_publish_leaves_only_protocol_files() {
    let temp_dir = TempDir::new().unwrap();
    let mut producer = StreamContext::builder(temp_dir.path())
        .publish_mode(PublishMode::Atomic)
        .build()
        .unwrap();
    let mut consumer = StreamContext::builder(temp_dir.path())
        .publish_mode(PublishMode::Direct)
        .build()
        .unwrap();

    producer
        .create_stream("lidar_data", Direction::Write, |h| {
            h.send_line(format_args!("range_0: {:.2}", 7.25))
        })
        .unwrap();
    consumer
        .create_stream("lidar_data", Direction::Read, |h| {
            while h.read_line().is_some() {}
        })
        .unwrap();

    producer.tick();
    consumer.tick();
    producer.tick();

    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["lidar_data.flag", "lidar_data.txt"]);
}

#[test]
fn test_stale_markers_reset() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("x.flag"), "").unwrap();
    fs::write(temp_dir.path().join("x.ack"), "").unwrap();

    let mut ctx = StreamContext::new(temp_dir.path()).unwrap();
    let id = ctx.create_stream("x", Direction::Read, |_| {}).unwrap();
    assert_eq!(ctx.state(id).unwrap(), ChannelState::Ready);

    ctx.reset_markers(id).unwrap();
    ctx.reset_markers(id).unwrap();
    assert_eq!(ctx.state(id).unwrap(), ChannelState::Waiting);
    assert!(!marker(&temp_dir, "x.ack"));
}

/// Filesystem backend whose first `touch` fails.
#[derive(Default)]
struct FirstTouchFails {
    inner: FsBackend,
    failed: std::cell::Cell<bool>,
}

impl SentinelBackend for FirstTouchFails {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn touch(&self, path: &Path) -> filecomm_core::Result<()> {
        if !self.failed.replace(true) {
            return Err(StreamError::IoCreateFailed {
                path: path.to_path_buf(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.touch(path)
    }

    fn remove(&self, path: &Path) -> filecomm_core::Result<()> {
        self.inner.remove(path)
    }

    fn open_read(&self, path: &Path) -> filecomm_core::Result<DataFile> {
        self.inner.open_read(path)
    }

    fn open_write(&self, path: &Path) -> filecomm_core::Result<DataFile> {
        self.inner.open_write(path)
    }
}

#[test]
fn test_marker_failure_does_not_wedge_pair() {
    let temp_dir = TempDir::new().unwrap();
    let mut producer = StreamContext::with_backend(temp_dir.path(), FirstTouchFails::default());
    let mut consumer = StreamContext::with_backend(temp_dir.path(), FirstTouchFails::default());

    let writes = Rc::new(RefCell::new(0u32));
    let w = writes.clone();
    producer
        .create_stream("x", Direction::Write, move |h| {
            *w.borrow_mut() += 1;
            h.send_line(format_args!("seq: {}", w.borrow()));
        })
        .unwrap();
    let received = Rc::new(RefCell::new(Vec::new()));
    let r = received.clone();
    consumer
        .create_stream("x", Direction::Read, move |h| {
            while let Some(line) = h.read_line() {
                r.borrow_mut().push(line);
            }
        })
        .unwrap();

    // Producer fails to publish, consumer has nothing yet
    assert_eq!(producer.tick().failures.len(), 1);
    assert_eq!(consumer.tick().ran, 0);

    // Producer finishes the publish; consumer's ack then fails once
    assert_eq!(producer.tick().ran, 1);
    assert!(marker(&temp_dir, "x.flag"));
    assert_eq!(consumer.tick().failures.len(), 1);
    assert!(!marker(&temp_dir, "x.ack"));

    for _ in 0..3 {
        producer.tick();
        consumer.tick();
    }
    assert_eq!(producer.tick().ran, 1);

    assert_eq!(*received.borrow(), vec!["seq: 1", "seq: 2", "seq: 3"]);
    assert_eq!(*writes.borrow(), 4);
    assert!(marker(&temp_dir, "x.flag"));
}
