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

//! Append-only CSV utilization log, one file per device per session.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::warn;

use crate::device::{Device, DeviceKey};

pub struct CsvLogSink {
    dir: PathBuf,
    session: String,
    failed: HashSet<DeviceKey>,
}

impl CsvLogSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_session_start(dir, Local::now())
    }

    pub fn with_session_start(dir: impl Into<PathBuf>, started: DateTime<Local>) -> Self {
        Self {
            dir: dir.into(),
            session: started.format("%Y%m%d-%H%M%S").to_string(),
            failed: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: DeviceKey) -> PathBuf {
        self.dir.join(format!(
            "{}-{}{}.csv",
            self.session,
            key.family.label().to_lowercase(),
            key.index
        ))
    }

    /// Append `<epoch>, <utilization>` for one device.
    ///
    /// A failed write is reported once; that device is not logged again
    /// for the rest of the session. Devices without a utilization reading
    /// this tick are skipped.
    pub fn append(&mut self, device: &Device, epoch_secs: f64) {
        let key = device.key();
        if self.failed.contains(&key) {
            return;
        }
        let Some(utilization) = device.snapshot.utilization else {
            return;
        };

        let line = format!("{epoch_secs:.6}, {utilization:.2}\n");
        if let Err(e) = self.write_line(key, &line) {
            warn!(
                "Logging disabled for {key}: cannot write {}: {e}",
                self.path_for(key).display()
            );
            self.failed.insert(key);
        }
    }

    fn write_line(&self, key: DeviceKey, line: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(key))?;
        file.write_all(line.as_bytes())
    }

    pub fn is_disabled(&self, key: DeviceKey) -> bool {
        self.failed.contains(&key)
    }
}

/// Current wall clock as fractional Unix seconds.
pub fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceAttributes, DeviceFamily, DeviceIdentity};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn npu(utilization: Option<f64>) -> Device {
        let mut device = Device::new(DeviceIdentity {
            family: DeviceFamily::Npu,
            index: 0,
            name: "Intel Meteor Lake NPU".to_string(),
            attributes: DeviceAttributes::Npu {
                vendor_name: "Intel".to_string(),
                device_name: "Meteor Lake NPU".to_string(),
                pci_path: PathBuf::from("/sys/bus/pci/devices/0000:00:0b.0"),
            },
        });
        device.snapshot.utilization = utilization;
        device
    }

    fn session_start() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_appends_lines_and_creates_directories() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("nested/logs");
        let mut sink = CsvLogSink::with_session_start(&log_dir, session_start());

        sink.append(&npu(Some(12.5)), 1_700_000_000.25);
        sink.append(&npu(Some(80.0)), 1_700_000_000.95);

        let path = sink.path_for(npu(None).key());
        assert!(path.ends_with("20260301-093000-npu0.csv"));
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "1700000000.250000, 12.50\n1700000000.950000, 80.00\n"
        );
    }

    #[test]
    fn test_absent_utilization_is_not_logged() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvLogSink::with_session_start(dir.path(), session_start());
        sink.append(&npu(None), 1.0);
        assert!(!sink.path_for(npu(None).key()).exists());
    }

    #[test]
    fn test_write_failure_disables_that_device() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();
        let mut sink = CsvLogSink::with_session_start(&blocker, session_start());

        let device = npu(Some(5.0));
        sink.append(&device, 1.0);
        assert!(sink.is_disabled(device.key()));
        sink.append(&device, 2.0);
        assert!(sink.is_disabled(device.key()));
    }
}
