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

//! Integrated Jetson GPU read straight from sysfs and procfs.
//!
//! Nothing here is fatal: a missing file means "no signal" and the metric
//! falls back to zero, except the fan, which stays absent because most
//! Jetson modules are fanless.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::device::common::probe::{list_dir_sorted, read_trimmed};
use crate::device::common::{parse_float, parse_number, probe_first, SysfsRoot};
use crate::device::platform_detection::{is_jetson, DEVICE_TREE_MODEL_PATH, TEGRA_RELEASE_PATH};
use crate::device::types::{
    Device, DeviceAttributes, DeviceFamily, DeviceIdentity, DeviceSnapshot, MemoryReading,
};
use crate::device::Backend;
use crate::error::{Error, Result};
use crate::utils::units::{kib_to_mb, millicelsius_to_celsius, milliwatts_to_watts, pwm_to_percent};

/// GPU load files, 0-1000 scale. Checked in order.
const GPU_LOAD_PATHS: &[&str] = &[
    "/sys/devices/platform/gpu.0/load",
    "/sys/devices/platform/17000000.gpu/load",
    "/sys/devices/gpu.0/load",
    "/sys/devices/platform/tegra-soc/gpu.0/load",
];

/// PWM fan controls, 0-255 scale. Checked in order.
const FAN_PWM_PATHS: &[&str] = &[
    "/sys/devices/pwm-fan/target_pwm",
    "/sys/devices/pwm-fan/cur_pwm",
    "/sys/class/hwmon/hwmon0/pwm1",
    "/sys/class/hwmon/hwmon1/pwm1",
];

const CUDA_VERSION_PATHS: &[&str] = &[
    "/usr/local/cuda/version.json",
    "/usr/local/cuda/version.txt",
];

const MEMINFO_PATH: &str = "/proc/meminfo";
const DEVICE_TREE_COMPATIBLE_PATH: &str = "/proc/device-tree/compatible";
const THERMAL_ZONE_PATH: &str = "/sys/class/thermal";
const I2C_DEVICES_PATH: &str = "/sys/bus/i2c/devices";

/// INA3221 monitor on the Orin Nano carrier board
const INA3221_SENSOR_PATH: &str = "/sys/bus/i2c/devices/1-0040/hwmon/hwmon1";
const INA3221_NAME: &str = "ina3221";
const INA3221_CHANNELS: u32 = 3;
const MAIN_RAIL_LABEL: &str = "VDD_IN";

/// Zone type keywords, most specific first
const GPU_THERMAL_KEYWORDS: &[&str] = &["gpu", "gv11b", "thermal"];

static L4T_RELEASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R(\d+).*?REVISION:\s*([\d.]+)").expect("valid L4T regex"));
static CUDA_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+\.\d+)").expect("valid CUDA version regex"));

pub struct NvidiaJetsonGpuBackend {
    root: SysfsRoot,
    devices: Vec<Device>,
}

impl Default for NvidiaJetsonGpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NvidiaJetsonGpuBackend {
    pub fn new() -> Self {
        Self::with_root(SysfsRoot::host())
    }

    pub fn with_root(root: SysfsRoot) -> Self {
        Self {
            root,
            devices: Vec::new(),
        }
    }

    fn device_name(&self) -> String {
        if let Some(model) = self.root.read(DEVICE_TREE_MODEL_PATH) {
            return model;
        }

        if let Some(compatible) = self.root.read(DEVICE_TREE_COMPATIBLE_PATH) {
            if let Some(entry) = compatible
                .split('\0')
                .find(|part| part.to_lowercase().contains("jetson"))
            {
                return entry.to_string();
            }
        }

        "NVIDIA Jetson".to_string()
    }

    fn l4t_version(&self) -> String {
        self.root
            .read(TEGRA_RELEASE_PATH)
            .and_then(|content| parse_l4t_release(&content))
            .unwrap_or_else(|| "L4T Unknown".to_string())
    }

    fn cuda_version(&self) -> String {
        probe_first(&self.root, CUDA_VERSION_PATHS, |content| {
            CUDA_VERSION_RE
                .captures(content)
                .map(|caps| caps[1].to_string())
        })
        .unwrap_or_else(|| "Unknown".to_string())
    }

    fn read_utilization(&self) -> f64 {
        probe_first(&self.root, GPU_LOAD_PATHS, parse_float)
            .map(|load| load / 10.0)
            .unwrap_or(0.0)
    }

    fn read_memory(&self) -> MemoryReading {
        self.root
            .read(MEMINFO_PATH)
            .and_then(|content| parse_meminfo(&content))
            .unwrap_or_default()
    }

    fn find_power_sensor(&self) -> Option<PathBuf> {
        if self.root.is_dir(INA3221_SENSOR_PATH) {
            return Some(self.root.resolve(INA3221_SENSOR_PATH));
        }

        // Bus numbering differs between carrier boards; match on the chip name
        for device in self.root.list_dir(I2C_DEVICES_PATH) {
            for hwmon in list_dir_sorted(&device.join("hwmon")) {
                let is_hwmon = hwmon
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with("hwmon"));
                if !is_hwmon {
                    continue;
                }
                let matches = read_trimmed(&hwmon.join("name"))
                    .is_some_and(|name| name.to_lowercase().contains(INA3221_NAME));
                if matches {
                    return Some(hwmon);
                }
            }
        }

        None
    }

    fn read_power(&self) -> f64 {
        match self.find_power_sensor() {
            Some(sensor) => read_rail_power(&sensor),
            None => {
                debug!("no INA3221 power monitor found");
                0.0
            }
        }
    }

    fn read_temperature(&self) -> f64 {
        if !self.root.is_dir(THERMAL_ZONE_PATH) {
            return 0.0;
        }

        let zones: Vec<PathBuf> = self
            .root
            .list_dir(THERMAL_ZONE_PATH)
            .into_iter()
            .filter(|zone| {
                zone.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with("thermal_zone"))
            })
            .collect();

        let typed: Vec<(String, &PathBuf)> = zones
            .iter()
            .filter_map(|zone| Some((read_trimmed(&zone.join("type"))?.to_lowercase(), zone)))
            .collect();

        // Keywords are in priority order; "thermal" alone also matches cpu-thermal
        let gpu_zone_temp = GPU_THERMAL_KEYWORDS.iter().find_map(|keyword| {
            typed
                .iter()
                .filter(|(zone_type, _)| zone_type.contains(keyword))
                .find_map(|(_, zone)| read_zone_temp(zone))
        });

        // Falls back to whatever the first zone measures, which may not be the GPU
        gpu_zone_temp
            .or_else(|| zones.first().and_then(|zone| read_zone_temp(zone)))
            .unwrap_or(0.0)
    }

    fn read_fan_percent(&self) -> Option<u32> {
        probe_first(&self.root, FAN_PWM_PATHS, parse_number::<u32>).map(pwm_to_percent)
    }
}

fn read_zone_temp(zone: &Path) -> Option<f64> {
    read_trimmed(&zone.join("temp"))
        .and_then(|raw| parse_float(&raw))
        .map(millicelsius_to_celsius)
}

/// Sum of INA3221 rails in watts, or the main input rail alone when labeled.
fn read_rail_power(sensor: &Path) -> f64 {
    let mut rails_mw = Vec::new();
    let mut main_rail_mw = None;

    for channel in 1..=INA3221_CHANNELS {
        let Some(label) = read_trimmed(&sensor.join(format!("in{channel}_label"))) else {
            continue;
        };
        let millivolts: u64 = read_trimmed(&sensor.join(format!("in{channel}_input")))
            .and_then(|raw| parse_number(&raw))
            .unwrap_or(0);
        let milliamps: u64 = read_trimmed(&sensor.join(format!("curr{channel}_input")))
            .and_then(|raw| parse_number(&raw))
            .unwrap_or(0);
        let milliwatts = millivolts * milliamps / 1000;

        if label == MAIN_RAIL_LABEL {
            main_rail_mw = Some(milliwatts);
            break;
        }
        rails_mw.push(milliwatts);
    }

    let total_mw = main_rail_mw.unwrap_or_else(|| rails_mw.iter().sum());
    milliwatts_to_watts(total_mw)
}

pub fn parse_l4t_release(content: &str) -> Option<String> {
    L4T_RELEASE_RE
        .captures(content)
        .map(|caps| format!("L4T {}.{}", &caps[1], &caps[2]))
}

/// Total, used and available system memory in MB from /proc/meminfo.
pub fn parse_meminfo(content: &str) -> Option<MemoryReading> {
    let mut total_kib = 0u64;
    let mut available_kib = 0u64;

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            Some("MemTotal:") => total_kib = fields.next().and_then(parse_number).unwrap_or(0),
            Some("MemAvailable:") => {
                available_kib = fields.next().and_then(parse_number).unwrap_or(0)
            }
            _ => {}
        }
    }

    if total_kib == 0 {
        return None;
    }

    Some(MemoryReading {
        used_mb: kib_to_mb(total_kib.saturating_sub(available_kib)),
        total_mb: kib_to_mb(total_kib),
        free_mb: kib_to_mb(available_kib),
    })
}

/// CUDA compute capability inferred from the module name.
pub fn compute_capability_for(name: &str) -> &'static str {
    let name = name.to_lowercase();
    if name.contains("orin") {
        "8.7"
    } else if name.contains("xavier") || name.contains("agx") {
        "7.2"
    } else if name.contains("tx2") {
        "6.2"
    } else if name.contains("nano") || name.contains("tx1") {
        "5.3"
    } else {
        "Unknown"
    }
}

impl Backend for NvidiaJetsonGpuBackend {
    fn family(&self) -> DeviceFamily {
        DeviceFamily::Gpu
    }

    fn discover(&mut self) -> Result<()> {
        if !is_jetson(&self.root) {
            return Err(Error::unavailable(
                DeviceFamily::Gpu,
                "not a Jetson device (no Tegra release or device-tree model)",
            ));
        }

        let name = self.device_name();
        let compute_capability = compute_capability_for(&name).to_string();
        let identity = DeviceIdentity {
            family: DeviceFamily::Gpu,
            index: 0,
            attributes: DeviceAttributes::Gpu {
                driver_version: self.l4t_version(),
                cuda_version: self.cuda_version(),
                compute_capability,
            },
            name,
        };
        info!("Jetson GPU discovered: {}", identity.name);
        self.devices = vec![Device::new(identity)];
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        if self.devices.is_empty() {
            return Ok(());
        }

        let snapshot = DeviceSnapshot {
            utilization: Some(self.read_utilization()),
            memory: Some(self.read_memory()),
            power_watts: Some(self.read_power()),
            temperature_celsius: Some(self.read_temperature()),
            fan_percent: self.read_fan_percent(),
            fan_rpm: None,
            frequency_ghz: None,
            core_utilization: Vec::new(),
        };

        for device in &mut self.devices {
            device.snapshot = snapshot.clone();
        }
        Ok(())
    }

    fn release(&mut self) {
        self.devices.clear();
    }

    fn devices(&self) -> &[Device] {
        &self.devices
    }
}
