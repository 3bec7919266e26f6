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

use crate::device::types::{
    Device, DeviceAttributes, DeviceFamily, DeviceIdentity, DeviceSnapshot, MemoryReading,
};
use crate::device::Backend;
use crate::error::{Error, Result};
use crate::utils::units::{bytes_to_mb, milliwatts_to_watts};
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::error::NvmlError;
use nvml_wrapper::{cuda_driver_version_major, cuda_driver_version_minor, Nvml};
use tracing::{debug, info, warn};

/// Hard cap on enumerated devices
const MAX_DEVICES: u32 = 256;

/// Raw values as NVML reports them, before unit conversion.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RawGpuReading {
    pub utilization: Option<u32>,
    pub memory_bytes: Option<(u64, u64, u64)>, // (used, total, free)
    pub temperature: Option<u32>,
    pub power_milliwatts: Option<u32>,
    pub fan_percent: Option<u32>,
    pub fan_rpm: Option<u32>,
}

impl RawGpuReading {
    pub fn into_snapshot(self) -> DeviceSnapshot {
        DeviceSnapshot {
            utilization: self.utilization.map(f64::from),
            memory: self.memory_bytes.map(|(used, total, free)| MemoryReading {
                used_mb: bytes_to_mb(used),
                total_mb: bytes_to_mb(total),
                free_mb: bytes_to_mb(free),
            }),
            power_watts: self.power_milliwatts.map(|mw| milliwatts_to_watts(mw as u64)),
            temperature_celsius: self.temperature.map(f64::from),
            fan_percent: self.fan_percent,
            fan_rpm: self.fan_rpm,
            frequency_ghz: None,
            core_utilization: Vec::new(),
        }
    }
}

/// Discrete GPUs through the NVIDIA management library.
pub struct NvidiaGpuBackend {
    nvml: Option<Nvml>,
    devices: Vec<Device>,
}

impl Default for NvidiaGpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NvidiaGpuBackend {
    pub fn new() -> Self {
        Self {
            nvml: None,
            devices: Vec::new(),
        }
    }

    fn read_identity(nvml: &Nvml, index: u32) -> DeviceIdentity {
        let driver_version = nvml
            .sys_driver_version()
            .unwrap_or_else(|_| "Unknown".to_string());
        let cuda_version = nvml
            .sys_cuda_driver_version()
            .map(format_cuda_version)
            .unwrap_or_else(|_| "Unknown".to_string());

        let (name, compute_capability) = match nvml.device_by_index(index) {
            Ok(device) => (
                device.name().unwrap_or_else(|_| "Unknown GPU".to_string()),
                device
                    .cuda_compute_capability()
                    .map(|cc| format!("{}.{}", cc.major, cc.minor))
                    .unwrap_or_else(|_| "Unknown".to_string()),
            ),
            Err(e) => {
                warn!("GPU {index}: failed to open handle during discovery: {e}");
                ("Unknown GPU".to_string(), "Unknown".to_string())
            }
        };

        DeviceIdentity {
            family: DeviceFamily::Gpu,
            index,
            name,
            attributes: DeviceAttributes::Gpu {
                driver_version,
                cuda_version,
                compute_capability,
            },
        }
    }

    fn read_raw(device: &nvml_wrapper::Device) -> RawGpuReading {
        RawGpuReading {
            utilization: metric("utilization", device.utilization_rates().map(|u| u.gpu)),
            memory_bytes: metric(
                "memory",
                device.memory_info().map(|m| (m.used, m.total, m.free)),
            ),
            temperature: metric("temperature", device.temperature(TemperatureSensor::Gpu)),
            power_milliwatts: metric("power", device.power_usage()),
            fan_percent: metric("fan speed", device.fan_speed(0)),
            fan_rpm: metric("fan rpm", device.fan_speed_rpm(0)),
        }
    }
}

/// `major.minor` from NVML's encoded CUDA driver version.
fn format_cuda_version(version: i32) -> String {
    format!(
        "{}.{}",
        cuda_driver_version_major(version),
        cuda_driver_version_minor(version)
    )
}

fn shutdown_nvml(nvml: Nvml) {
    if let Err(e) = nvml.shutdown() {
        warn!("NVML shutdown failed: {e}");
    }
}

/// Degrade a single failed query to an absent metric.
fn metric<T>(name: &str, result: std::result::Result<T, NvmlError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(NvmlError::NotSupported) => None,
        Err(e) => {
            debug!("NVML {name} query failed: {e}");
            None
        }
    }
}

impl Backend for NvidiaGpuBackend {
    fn family(&self) -> DeviceFamily {
        DeviceFamily::Gpu
    }

    fn discover(&mut self) -> Result<()> {
        let nvml = Nvml::init()
            .map_err(|e| Error::unavailable(DeviceFamily::Gpu, format!("NVML init failed: {e}")))?;

        let count = match nvml.device_count() {
            Ok(count) => count.min(MAX_DEVICES),
            Err(e) => {
                shutdown_nvml(nvml);
                return Err(Error::unavailable(
                    DeviceFamily::Gpu,
                    format!("NVML device count failed: {e}"),
                ));
            }
        };

        if count == 0 {
            shutdown_nvml(nvml);
            return Err(Error::unavailable(DeviceFamily::Gpu, "no NVIDIA devices"));
        }

        self.devices = (0..count)
            .map(|index| Device::new(Self::read_identity(&nvml, index)))
            .collect();
        info!("NVML initialized with {count} GPU(s)");
        self.nvml = Some(nvml);
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        let nvml = self
            .nvml
            .as_ref()
            .ok_or_else(|| Error::read_failure("GPU", "NVML is not initialized"))?;

        let mut failed = 0;
        for device in &mut self.devices {
            match nvml.device_by_index(device.identity.index) {
                Ok(handle) => device.snapshot = Self::read_raw(&handle).into_snapshot(),
                Err(e) => {
                    warn!("{}: handle lookup failed: {e}", device.label());
                    device.snapshot = DeviceSnapshot::default();
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == self.devices.len() {
            return Err(Error::read_failure("GPU", "no device handle could be opened"));
        }
        Ok(())
    }

    fn release(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            shutdown_nvml(nvml);
        }
        self.devices.clear();
    }

    fn devices(&self) -> &[Device] {
        &self.devices
    }
}

impl Drop for NvidiaGpuBackend {
    fn drop(&mut self) {
        self.release();
    }
}
