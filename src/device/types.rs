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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceFamily {
    Gpu,
    Cpu,
    Npu,
}

impl DeviceFamily {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceFamily::Gpu => "GPU",
            DeviceFamily::Cpu => "CPU",
            DeviceFamily::Npu => "NPU",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies one device across the backend and the history store.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey {
    pub family: DeviceFamily,
    pub index: u32,
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.index)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum DeviceAttributes {
    Gpu {
        driver_version: String, // Driver or L4T release
        cuda_version: String,
        compute_capability: String,
    },
    Cpu {
        cores: u32,
        threads: u32,
    },
    Npu {
        vendor_name: String,
        device_name: String,
        pci_path: PathBuf,
    },
}

/// Static identity, fixed at discovery time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DeviceIdentity {
    pub family: DeviceFamily,
    pub index: u32,
    pub name: String,
    pub attributes: DeviceAttributes,
}

impl DeviceIdentity {
    pub fn key(&self) -> DeviceKey {
        DeviceKey {
            family: self.family,
            index: self.index,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct MemoryReading {
    pub used_mb: f64,
    pub total_mb: f64,
    pub free_mb: f64,
}

impl MemoryReading {
    pub fn used_percent(&self) -> f64 {
        if self.total_mb > 0.0 {
            self.used_mb / self.total_mb * 100.0
        } else {
            0.0
        }
    }
}

/// Latest normalized readings for one device.
///
/// Every field a family cannot provide stays `None`; `None` is never
/// interchangeable with zero.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DeviceSnapshot {
    pub utilization: Option<f64>,          // Percent 0-100
    pub memory: Option<MemoryReading>,     // MB
    pub power_watts: Option<f64>,          // W
    pub temperature_celsius: Option<f64>,  // °C
    pub fan_percent: Option<u32>,          // Percent
    pub fan_rpm: Option<u32>,              // RPM
    pub frequency_ghz: Option<f64>,        // CPU only
    pub core_utilization: Vec<f64>,        // CPU only, percent per core
}

impl DeviceSnapshot {
    /// No fan reading at all: a fanless design, not a failed read.
    pub fn is_fanless(&self) -> bool {
        self.fan_percent.is_none() && self.fan_rpm.is_none()
    }
}

/// A discovered device: identity plus the snapshot its backend overwrites
/// on every refresh.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Device {
    pub identity: DeviceIdentity,
    pub snapshot: DeviceSnapshot,
}

impl Device {
    pub fn new(identity: DeviceIdentity) -> Self {
        Self {
            identity,
            snapshot: DeviceSnapshot::default(),
        }
    }

    pub fn key(&self) -> DeviceKey {
        self.identity.key()
    }

    /// Short human label, e.g. "GPU 0".
    pub fn label(&self) -> String {
        self.key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_used_percent() {
        let memory = MemoryReading {
            used_mb: 2048.0,
            total_mb: 8192.0,
            free_mb: 6144.0,
        };
        assert_eq!(memory.used_percent(), 25.0);
        assert_eq!(MemoryReading::default().used_percent(), 0.0);
    }

    #[test]
    fn test_fanless_is_distinct_from_zero_fan() {
        let fanless = DeviceSnapshot::default();
        assert!(fanless.is_fanless());

        let stopped_fan = DeviceSnapshot {
            fan_percent: Some(0),
            ..Default::default()
        };
        assert!(!stopped_fan.is_fanless());
    }

    #[test]
    fn test_device_label() {
        let device = Device::new(DeviceIdentity {
            family: DeviceFamily::Npu,
            index: 2,
            name: "Intel Meteor Lake NPU".to_string(),
            attributes: DeviceAttributes::Npu {
                vendor_name: "Intel".to_string(),
                device_name: "Meteor Lake NPU".to_string(),
                pci_path: PathBuf::from("/sys/bus/pci/devices/0000:00:0b.0"),
            },
        });
        assert_eq!(device.label(), "NPU 2");
        assert_eq!(device.snapshot, DeviceSnapshot::default());
    }
}
