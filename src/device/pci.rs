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

//! PCI enumeration of AI accelerator devices.

use std::path::PathBuf;

use crate::device::common::probe::read_trimmed;
use crate::device::common::SysfsRoot;

const PCI_DEVICES_PATH: &str = "/sys/bus/pci/devices";

/// PCI base class 0x12, subclass 0x00: processing accelerator
const ACCELERATOR_CLASS: u32 = 0x1200;

const VENDOR_INTEL: u16 = 0x8086;

const KNOWN_DEVICES: &[(u16, u16, &str)] = &[
    (VENDOR_INTEL, 0x7d1d, "Meteor Lake NPU"),
    (VENDOR_INTEL, 0xad1d, "Arrow Lake NPU"),
    (VENDOR_INTEL, 0x643e, "Lunar Lake NPU"),
    (VENDOR_INTEL, 0xb03e, "Panther Lake NPU"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciDevice {
    pub path: PathBuf,
    pub vendor_id: u16,
    pub device_id: u16,
    pub vendor_name: String,
    pub device_name: String,
}

pub trait PciEnumerator: Send {
    fn find_accelerators(&self) -> Vec<PciDevice>;
}

/// Walks `/sys/bus/pci/devices` for processing-accelerator class devices.
#[derive(Debug, Clone, Default)]
pub struct SysfsPciEnumerator {
    root: SysfsRoot,
}

impl SysfsPciEnumerator {
    pub fn new(root: SysfsRoot) -> Self {
        Self { root }
    }
}

impl PciEnumerator for SysfsPciEnumerator {
    fn find_accelerators(&self) -> Vec<PciDevice> {
        self.root
            .list_dir(PCI_DEVICES_PATH)
            .into_iter()
            .filter_map(|path| {
                let class = read_trimmed(&path.join("class")).and_then(|c| parse_hex(&c))?;
                if class >> 8 != ACCELERATOR_CLASS {
                    return None;
                }
                let vendor_id = read_trimmed(&path.join("vendor")).and_then(|v| parse_hex(&v))? as u16;
                let device_id = read_trimmed(&path.join("device")).and_then(|d| parse_hex(&d))? as u16;
                Some(PciDevice {
                    vendor_name: vendor_name(vendor_id),
                    device_name: device_name(vendor_id, device_id),
                    path,
                    vendor_id,
                    device_id,
                })
            })
            .collect()
    }
}

fn parse_hex(raw: &str) -> Option<u32> {
    u32::from_str_radix(raw.trim().trim_start_matches("0x"), 16).ok()
}

pub fn vendor_name(vendor_id: u16) -> String {
    match vendor_id {
        VENDOR_INTEL => "Intel".to_string(),
        other => format!("Vendor {other:04x}"),
    }
}

pub fn device_name(vendor_id: u16, device_id: u16) -> String {
    KNOWN_DEVICES
        .iter()
        .find(|(vendor, device, _)| *vendor == vendor_id && *device == device_id)
        .map(|(_, _, name)| name.to_string())
        .unwrap_or_else(|| format!("Accelerator {device_id:04x}"))
}
