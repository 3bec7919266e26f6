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

use std::path::Path;

use tracing::{info, warn};

use crate::device::common::probe::read_trimmed;
use crate::device::common::{parse_number, Clock, RateCounter, SystemClock};
use crate::device::pci::{PciEnumerator, SysfsPciEnumerator};
use crate::device::types::{Device, DeviceAttributes, DeviceFamily, DeviceIdentity};
use crate::device::Backend;
use crate::error::{Error, Result};

/// Cumulative busy time exported by the intel_vpu driver
pub const BUSY_TIME_FILE: &str = "npu_busy_time_us";

/// NPUs whose only signal is the driver's cumulative busy-time counter.
pub struct IntelNpuBackend {
    enumerator: Box<dyn PciEnumerator>,
    clock: Box<dyn Clock>,
    devices: Vec<Device>,
    counters: Vec<RateCounter>,
}

impl Default for IntelNpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IntelNpuBackend {
    pub fn new() -> Self {
        Self::with_sources(
            Box::new(SysfsPciEnumerator::default()),
            Box::new(SystemClock),
        )
    }

    pub fn with_sources(enumerator: Box<dyn PciEnumerator>, clock: Box<dyn Clock>) -> Self {
        Self {
            enumerator,
            clock,
            devices: Vec::new(),
            counters: Vec::new(),
        }
    }
}

fn read_busy_time(pci_path: &Path) -> Option<u64> {
    read_trimmed(&pci_path.join(BUSY_TIME_FILE)).and_then(|raw| parse_number(&raw))
}

impl Backend for IntelNpuBackend {
    fn family(&self) -> DeviceFamily {
        DeviceFamily::Npu
    }

    fn discover(&mut self) -> Result<()> {
        let found = self.enumerator.find_accelerators();
        if found.is_empty() {
            return Err(Error::unavailable(
                DeviceFamily::Npu,
                "no processing accelerator on the PCI bus",
            ));
        }

        self.devices = found
            .into_iter()
            .enumerate()
            .map(|(index, pci)| {
                Device::new(DeviceIdentity {
                    family: DeviceFamily::Npu,
                    index: index as u32,
                    name: format!("{} {}", pci.vendor_name, pci.device_name),
                    attributes: DeviceAttributes::Npu {
                        vendor_name: pci.vendor_name,
                        device_name: pci.device_name,
                        pci_path: pci.path,
                    },
                })
            })
            .collect();
        self.counters = vec![RateCounter::new(); self.devices.len()];
        info!("{} NPU(s) discovered", self.devices.len());
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        let mut first_failure = None;

        for (device, counter) in self.devices.iter_mut().zip(self.counters.iter_mut()) {
            let DeviceAttributes::Npu { pci_path, .. } = &device.identity.attributes else {
                continue;
            };

            let now_us = self.clock.now_micros();
            match read_busy_time(pci_path) {
                Some(busy_us) => device.snapshot.utilization = Some(counter.sample(busy_us, now_us)),
                None => {
                    // Busy time is the only signal this family has, so the failure is surfaced
                    device.snapshot.utilization = None;
                    let label = device.label();
                    warn!("{label}: unable to read {BUSY_TIME_FILE}");
                    first_failure.get_or_insert_with(|| {
                        Error::read_failure(label, format!("unable to read {BUSY_TIME_FILE}"))
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn release(&mut self) {
        self.devices.clear();
        self.counters.clear();
    }

    fn devices(&self) -> &[Device] {
        &self.devices
    }
}
