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

use tracing::debug;

use crate::device::common::{SysfsRoot, SystemClock};
use crate::device::pci::SysfsPciEnumerator;
use crate::device::platform_detection::is_jetson;
use crate::device::readers::{
    intel_npu::IntelNpuBackend, nvidia::NvidiaGpuBackend, nvidia_jetson::NvidiaJetsonGpuBackend,
    synthetic_cpu::SyntheticCpuBackend,
};
use crate::device::{Backend, DeviceFamily};

/// Pick the backend implementation for one family on this host.
pub fn create_backend(family: DeviceFamily, root: &SysfsRoot) -> Box<dyn Backend> {
    match family {
        DeviceFamily::Gpu => {
            if is_jetson(root) {
                debug!("Jetson platform detected, using sysfs GPU backend");
                Box::new(NvidiaJetsonGpuBackend::with_root(root.clone()))
            } else {
                Box::new(NvidiaGpuBackend::new())
            }
        }
        DeviceFamily::Cpu => Box::new(SyntheticCpuBackend::new()),
        DeviceFamily::Npu => Box::new(IntelNpuBackend::with_sources(
            Box::new(SysfsPciEnumerator::new(root.clone())),
            Box::new(SystemClock),
        )),
    }
}

/// Backends for the requested families, in the order given.
pub fn create_backends(families: &[DeviceFamily]) -> Vec<Box<dyn Backend>> {
    let root = SysfsRoot::host();
    families
        .iter()
        .map(|family| create_backend(*family, &root))
        .collect()
}
