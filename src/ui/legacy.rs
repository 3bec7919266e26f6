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

//! Plain text layout: a title per device and one indented data line.

use chrono::{DateTime, Local};

use crate::device::{Device, DeviceAttributes, DeviceFamily};
use crate::ui::text::{format_fan, format_metric};

const DATA_INDENT: &str = "    ";

pub fn title_line(device: &Device) -> String {
    let identity = &device.identity;
    match &identity.attributes {
        DeviceAttributes::Gpu {
            driver_version,
            cuda_version,
            compute_capability,
        } => format!(
            "Device {}: {} (Driver: {driver_version}, CUDA {cuda_version}, CUDA CC {compute_capability})",
            identity.index, identity.name
        ),
        _ => format!("Device: {} {}", identity.index, identity.name),
    }
}

pub fn data_line(device: &Device) -> String {
    let snapshot = &device.snapshot;
    let utilization = format!("Utilization: {}", format_metric(snapshot.utilization, 1, "%"));

    match device.identity.family {
        DeviceFamily::Npu => utilization,
        _ => {
            let memory = match snapshot.memory {
                Some(m) => format!("{:.2}MB / {:.2}MB", m.used_mb, m.total_mb),
                None => "N/A".to_string(),
            };
            format!(
                "{utilization} Memory Used: {memory} Power Usage: {} Temperature: {} Fan: {}",
                format_metric(snapshot.power_watts, 1, "W"),
                format_metric(snapshot.temperature_celsius, 0, "°C"),
                format_fan(snapshot),
            )
        }
    }
}

/// Whole legacy frame for one family.
pub fn render_legacy<'a>(
    family: DeviceFamily,
    devices: impl IntoIterator<Item = &'a Device>,
    now: DateTime<Local>,
) -> String {
    let mut lines = vec![
        format!("xtop Terminal UI For {family}"),
        format!("Time: {}", now.format("%Y/%m/%d, %H:%M:%S")),
    ];
    for device in devices {
        lines.push(title_line(device));
        lines.push(format!("{DATA_INDENT}{}", data_line(device)));
    }
    lines.push(String::new());
    lines.push("Press 'q' to quit".to_string());

    let mut frame = lines.join("\r\n");
    frame.push_str("\r\n");
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceIdentity, MemoryReading};
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn gpu() -> Device {
        let mut device = Device::new(DeviceIdentity {
            family: DeviceFamily::Gpu,
            index: 0,
            name: "Tesla T4".to_string(),
            attributes: DeviceAttributes::Gpu {
                driver_version: "535.104".to_string(),
                cuda_version: "12.2".to_string(),
                compute_capability: "7.5".to_string(),
            },
        });
        device.snapshot.utilization = Some(37.0);
        device.snapshot.memory = Some(MemoryReading {
            used_mb: 1500.5,
            total_mb: 15360.0,
            free_mb: 13859.5,
        });
        device.snapshot.power_watts = Some(123.5);
        device.snapshot.temperature_celsius = Some(54.0);
        device
    }

    #[test]
    fn test_gpu_frame() {
        let now = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let frame = render_legacy(DeviceFamily::Gpu, [&gpu()], now);
        let lines: Vec<&str> = frame.lines().collect();

        assert_eq!(lines[0], "xtop Terminal UI For GPU");
        assert_eq!(lines[1], "Time: 2026/01/02, 03:04:05");
        assert_eq!(
            lines[2],
            "Device 0: Tesla T4 (Driver: 535.104, CUDA 12.2, CUDA CC 7.5)"
        );
        assert_eq!(
            lines[3],
            "    Utilization: 37.0% Memory Used: 1500.50MB / 15360.00MB Power Usage: 123.5W Temperature: 54°C Fan: N/A (fanless)"
        );
    }

    #[test]
    fn test_npu_lines() {
        let mut device = Device::new(DeviceIdentity {
            family: DeviceFamily::Npu,
            index: 0,
            name: "Intel Lunar Lake NPU".to_string(),
            attributes: DeviceAttributes::Npu {
                vendor_name: "Intel".to_string(),
                device_name: "Lunar Lake NPU".to_string(),
                pci_path: PathBuf::from("/sys/bus/pci/devices/0000:00:0b.0"),
            },
        });
        device.snapshot.utilization = Some(12.34);
        assert_eq!(title_line(&device), "Device: 0 Intel Lunar Lake NPU");
        assert_eq!(data_line(&device), "Utilization: 12.3%");
    }
}
