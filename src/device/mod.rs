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

pub mod backend_factory;
pub mod common;
pub mod pci;
pub mod platform_detection;
pub mod poller;
pub mod readers;
pub mod traits;
pub mod types;

pub use backend_factory::{create_backend, create_backends};
pub use platform_detection::{ensure_supported_os, get_os_type, is_jetson};
pub use poller::{Poller, TickReport};
pub use readers::intel_npu::IntelNpuBackend;
pub use readers::nvidia::NvidiaGpuBackend;
pub use readers::nvidia_jetson::NvidiaJetsonGpuBackend;
pub use readers::synthetic_cpu::SyntheticCpuBackend;
pub use traits::Backend;
pub use types::{
    Device, DeviceAttributes, DeviceFamily, DeviceIdentity, DeviceKey, DeviceSnapshot,
    MemoryReading,
};
