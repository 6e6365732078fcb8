//! Mock sensor and motor records.
//!
//! Every record is a sequence of `key: value` lines. Floating point values
//! are written with two decimals.

use filecomm_core::StreamHandle;
use rand::Rng;
use std::fmt;
use std::path::Path;

/// Check code carried by every lidar packet.
pub fn verifier_code(packet_id: u32) -> u32 {
    packet_id.wrapping_mul(13) % 1000
}

/// One simulated lidar sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LidarScan {
    pub packet_id: u32,
    pub verifier_code: u32,
    pub angle_min: f64,
    pub angle_max: f64,
    pub ranges: [f64; 3],
}

impl LidarScan {
    pub fn generate<R: Rng>(packet_id: u32, rng: &mut R) -> Self {
        Self {
            packet_id,
            verifier_code: verifier_code(packet_id),
            angle_min: rng.random_range(-2.0..=-1.0),
            angle_max: rng.random_range(1.0..=2.0),
            ranges: [
                rng.random_range(5.0..=15.0),
                rng.random_range(5.0..=15.0),
                rng.random_range(5.0..=15.0),
            ],
        }
    }

    /// Console line printed when the scan is written to `dest`.
    pub fn announcement(&self, dest: &Path) -> String {
        format!(
            "Writing data packet {} (Verify Code: {}) to {}...",
            self.packet_id,
            self.verifier_code,
            dest.display()
        )
    }

    pub fn send(&self, handle: &mut StreamHandle<'_>) {
        handle.send_line(format_args!("packet_id: {}", self.packet_id));
        handle.send_line(format_args!("verifier_code: {}", self.verifier_code));
        handle.send_line(format_args!("angle_min: {:.2}", self.angle_min));
        handle.send_line(format_args!("angle_max: {:.2}", self.angle_max));
        for (i, range) in self.ranges.iter().enumerate() {
            handle.send_line(format_args!("range_{}: {:.2}", i, range));
        }
    }
}

/// Travel direction of a motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Forward,
    Backward,
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heading::Forward => write!(f, "FORWARD"),
            Heading::Backward => write!(f, "BACKWARD"),
        }
    }
}

/// One simulated wheel speed command.
#[derive(Debug, Clone, PartialEq)]
pub struct MotorCommand {
    pub command_id: u32,
    pub speed_left: f64,
    pub speed_right: f64,
    pub heading: Heading,
}

impl MotorCommand {
    pub fn generate<R: Rng>(command_id: u32, rng: &mut R) -> Self {
        Self {
            command_id,
            speed_left: rng.random_range(0.0..=1.0),
            speed_right: rng.random_range(0.0..=1.0),
            heading: if rng.random_bool(0.5) {
                Heading::Forward
            } else {
                Heading::Backward
            },
        }
    }

    pub fn send(&self, handle: &mut StreamHandle<'_>) {
        handle.send_line(format_args!("command_id: {}", self.command_id));
        handle.send_line(format_args!("speed_left: {:.2}", self.speed_left));
        handle.send_line(format_args!("speed_right: {:.2}", self.speed_right));
        handle.send_line(format_args!("direction: {}", self.heading));
    }
}

/// A received record as ordered `key: value` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub lines: Vec<String>,
}

impl Record {
    /// Drain the remaining lines of a read handle.
    pub fn read_from(handle: &mut StreamHandle<'_>) -> Self {
        Self {
            lines: std::iter::from_fn(|| handle.read_line()).collect(),
        }
    }

    /// Value of the first `key: value` line with this key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    /// Check a lidar packet's verifier code against its id.
    ///
    /// Returns `None` if either field is missing or malformed.
    pub fn verifier_matches(&self) -> Option<bool> {
        let id: u32 = self.field("packet_id")?.parse().ok()?;
        let code: u32 = self.field("verifier_code")?.parse().ok()?;
        Some(verifier_code(id) == code)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
