// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Unified error types for xtop.
//!
//! Backends, the poller and the presentation layer all report through
//! [`enum@Error`]. A metric that a device family simply does not expose
//! (a fan on a fanless board, memory on an NPU) is not an error at all:
//! it is carried as `None` on the snapshot and rendered as "N/A".
//!
//! # Example
//!
//! ```rust,no_run
//! use xtop::device::{Backend, SyntheticCpuBackend};
//! use xtop::Result;
//!
//! fn main() -> Result<()> {
//!     let mut cpu = SyntheticCpuBackend::new();
//!     cpu.discover()?;
//!     cpu.refresh()?;
//!     println!("Found {} CPU(s)", cpu.devices().len());
//!     cpu.release();
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::device::DeviceFamily;

/// The main error type for xtop operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The device family has no hardware, library or kernel interface on
    /// this host.
    ///
    /// This is a normal condition during discovery: the family is simply
    /// not mounted.
    #[error("{family} backend unavailable: {reason}")]
    BackendUnavailable {
        family: DeviceFamily,
        reason: String,
    },

    /// A refresh could not obtain a reading that the family depends on.
    #[error("Read failure on {device}: {reason}")]
    ReadFailure { device: String, reason: String },

    /// The host OS or the requested feature combination is not supported.
    ///
    /// Fatal at startup; the process exits before any rendering.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The terminal could not be put into or out of dashboard mode.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn unavailable(family: DeviceFamily, reason: impl Into<String>) -> Self {
        Error::BackendUnavailable {
            family,
            reason: reason.into(),
        }
    }

    pub fn read_failure(device: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ReadFailure {
            device: device.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only means "family not present on this host".
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::BackendUnavailable { .. })
    }
}

/// A specialized Result type for xtop operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unavailable(DeviceFamily::Gpu, "NVML not found");
        assert_eq!(err.to_string(), "GPU backend unavailable: NVML not found");

        let err = Error::read_failure("NPU 0", "npu_busy_time_us missing");
        assert_eq!(
            err.to_string(),
            "Read failure on NPU 0: npu_busy_time_us missing"
        );

        let err = Error::UnsupportedPlatform("windows".to_string());
        assert_eq!(err.to_string(), "Unsupported platform: windows");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
