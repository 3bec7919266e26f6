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

//! Owns the mounted backends for one session.
//!
//! Backends are refreshed in mount order, one after another. A backend
//! whose refresh fails is reported as degraded for that tick only; its
//! siblings still refresh and the next tick tries it again.

use tracing::{debug, info, warn};

use crate::device::{Backend, Device, DeviceFamily};

/// Outcome of one poll tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub degraded: Vec<DeviceFamily>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

pub struct Poller {
    backends: Vec<Box<dyn Backend>>,
}

impl Poller {
    /// Run discovery on every candidate and keep the ones that succeed.
    ///
    /// A family whose access path is missing on this host is not mounted.
    pub fn discover(candidates: Vec<Box<dyn Backend>>) -> Self {
        let mut backends = Vec::with_capacity(candidates.len());

        for mut backend in candidates {
            let family = backend.family();
            match backend.discover() {
                Ok(()) => {
                    info!(
                        "{family} backend mounted with {} device(s)",
                        backend.devices().len()
                    );
                    backends.push(backend);
                }
                Err(e) if e.is_unavailable() => {
                    info!("{e}");
                    backend.release();
                }
                Err(e) => {
                    warn!("{family} discovery failed: {e}");
                    backend.release();
                }
            }
        }

        Self { backends }
    }

    /// Refresh every mounted backend once.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        for backend in &mut self.backends {
            if let Err(e) = backend.refresh() {
                debug!("{} degraded this tick: {e}", backend.family());
                report.degraded.push(backend.family());
            }
        }
        report
    }

    pub fn has_family(&self, family: DeviceFamily) -> bool {
        self.backends.iter().any(|b| b.family() == family)
    }

    pub fn families(&self) -> Vec<DeviceFamily> {
        self.backends.iter().map(|b| b.family()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn needs_warmup(&self) -> bool {
        self.has_family(DeviceFamily::Npu)
    }

    /// Devices across all backends in mount order, paired with the
    /// backend's synthetic flag.
    pub fn devices(&self) -> impl Iterator<Item = (&Device, bool)> {
        self.backends.iter().flat_map(|backend| {
            let synthetic = backend.is_synthetic();
            backend.devices().iter().map(move |device| (device, synthetic))
        })
    }

    pub fn release_all(&mut self) {
        for backend in &mut self.backends {
            backend.release();
        }
        if !self.backends.is_empty() {
            info!("Released {} backend(s)", self.backends.len());
        }
        self.backends.clear();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.release_all();
    }
}
