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

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::common::config::SessionConfig;
use crate::device::{create_backends, Device, DeviceFamily, Poller, TickReport};
use crate::error::{Error, Result};
use crate::view::session::{run_session, Session};
use crate::view::terminal_manager::TerminalManager;

/// Interactive dashboard until the user quits or a signal arrives.
pub async fn run_dashboard(config: &SessionConfig, shutdown: Arc<AtomicBool>) -> Result<()> {
    let poller = Poller::discover(create_backends(&config.families));

    // The legacy layout has nothing to show without a device
    if config.legacy && poller.is_empty() {
        return Err(Error::UnsupportedPlatform(
            "no supported hardware found".to_string(),
        ));
    }

    let mut session = Session::new(poller, config);
    let result = {
        let _terminal_manager = TerminalManager::new()?;
        run_session(
            &mut session,
            Duration::from_millis(config.poll_interval_ms),
            &shutdown,
        )
        .await
    };

    session.shutdown();
    info!("Session ended");
    result
}

#[derive(Serialize)]
struct SnapshotEntry<'a> {
    #[serde(flatten)]
    device: &'a Device,
    synthetic: bool,
}

#[derive(Serialize)]
struct SnapshotReport<'a> {
    timestamp: String,
    degraded: &'a [DeviceFamily],
    devices: Vec<SnapshotEntry<'a>>,
}

/// Serialize every mounted device as pretty JSON.
pub fn snapshot_json(poller: &Poller, report: &TickReport) -> Result<String> {
    let snapshot = SnapshotReport {
        timestamp: Local::now().to_rfc3339(),
        degraded: &report.degraded,
        devices: poller
            .devices()
            .map(|(device, synthetic)| SnapshotEntry { device, synthetic })
            .collect(),
    };
    serde_json::to_string_pretty(&snapshot).map_err(|e| Error::Io(e.into()))
}

/// One-shot read: discover, refresh, print, release.
///
/// Counter-based families need two samples one interval apart before
/// their utilization means anything.
pub async fn run_snapshot(config: &SessionConfig) -> Result<String> {
    let mut poller = Poller::discover(create_backends(&config.families));
    let mut report = poller.tick();
    if poller.needs_warmup() {
        tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
        report = poller.tick();
    }

    let json = snapshot_json(&poller, &report);
    poller.release_all();
    json
}
