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

//! Simulated CPU telemetry.
//!
//! Values follow a bounded random walk so the CPU panel has something
//! plausible to draw. Every device from this backend is flagged as
//! synthetic and the UI marks it as such.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::info;

use crate::device::types::{Device, DeviceAttributes, DeviceFamily, DeviceIdentity};
use crate::device::Backend;
use crate::error::Result;
use crate::utils::units::round_to;

const FALLBACK_NAME: &str = "Generic CPU";

/// Baselines that drift a little on every refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalk {
    pub utilization: f64,
    pub frequency_ghz: f64,
    pub temperature: f64,
    pub power_watts: f64,
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            utilization: 30.0,
            frequency_ghz: 3.2,
            temperature: 50.0,
            power_watts: 15.0,
        }
    }
}

impl RandomWalk {
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        self.utilization = (self.utilization + rng.random_range(-2.0..=2.0)).clamp(10.0, 80.0);
        self.frequency_ghz = (self.frequency_ghz + rng.random_range(-0.1..=0.1)).clamp(2.0, 3.5);
        self.temperature = (self.temperature + rng.random_range(-1.0..=1.0)).clamp(45.0, 70.0);
        self.power_watts = (self.power_watts + rng.random_range(-1.0..=1.0)).clamp(10.0, 30.0);
    }
}

/// Host CPU shape used for the simulated device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCpu {
    pub name: String,
    pub cores: u32,
    pub threads: u32,
}

impl HostCpu {
    pub fn detect() -> Self {
        let system =
            System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
        let name = system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        Self {
            name,
            cores: num_cpus::get_physical().max(1) as u32,
            threads: num_cpus::get().max(1) as u32,
        }
    }
}

pub struct SyntheticCpuBackend {
    rng: StdRng,
    walk: RandomWalk,
    host: Option<HostCpu>,
    devices: Vec<Device>,
}

impl Default for SyntheticCpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticCpuBackend {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng(), None)
    }

    /// Deterministic sequence, used for tests and reproducible snapshots.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), None)
    }

    pub fn with_host(mut self, host: HostCpu) -> Self {
        self.host = Some(host);
        self
    }

    fn from_rng(rng: StdRng, host: Option<HostCpu>) -> Self {
        Self {
            rng,
            walk: RandomWalk::default(),
            host,
            devices: Vec::new(),
        }
    }

    pub fn walk(&self) -> RandomWalk {
        self.walk
    }
}

impl Backend for SyntheticCpuBackend {
    fn family(&self) -> DeviceFamily {
        DeviceFamily::Cpu
    }

    fn discover(&mut self) -> Result<()> {
        let host = self.host.get_or_insert_with(HostCpu::detect).clone();
        info!(
            "Simulating CPU telemetry for {} ({} cores, {} threads)",
            host.name, host.cores, host.threads
        );

        self.walk = RandomWalk::default();
        self.devices = vec![Device::new(DeviceIdentity {
            family: DeviceFamily::Cpu,
            index: 0,
            name: host.name,
            attributes: DeviceAttributes::Cpu {
                cores: host.cores,
                threads: host.threads,
            },
        })];
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.walk.step(&mut self.rng);
        let walk = self.walk;
        let rng = &mut self.rng;

        for device in &mut self.devices {
            let cores = match device.identity.attributes {
                DeviceAttributes::Cpu { cores, .. } => cores,
                _ => 0,
            };

            let utilization =
                (walk.utilization + rng.random_range(-10.0..=20.0)).clamp(0.0, 100.0);
            let snapshot = &mut device.snapshot;
            snapshot.utilization = Some(round_to(utilization, 1));
            snapshot.frequency_ghz =
                Some(round_to((walk.frequency_ghz + rng.random_range(-0.5..=0.8)).max(0.5), 2));
            snapshot.temperature_celsius =
                Some(round_to((walk.temperature + rng.random_range(-5.0..=15.0)).max(30.0), 1));
            snapshot.power_watts =
                Some(round_to((walk.power_watts + rng.random_range(-5.0..=15.0)).max(5.0), 1));
            snapshot.core_utilization = (0..cores)
                .map(|_| {
                    let core = utilization + rng.random_range(-20.0..=20.0);
                    round_to(core.clamp(0.0, 100.0), 1)
                })
                .collect();
        }
        Ok(())
    }

    fn release(&mut self) {
        self.devices.clear();
    }

    fn devices(&self) -> &[Device] {
        &self.devices
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}
