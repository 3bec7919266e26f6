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

//! Integration tests for history retention and graph rendering.

use crossterm::style::Color;
use xtop::device::{Device, DeviceAttributes, DeviceFamily, DeviceIdentity, DeviceKey};
use xtop::metrics::{HistorySeries, HistoryStore, Metric};
use xtop::ui::graph::{render, GlyphSet};
use xtop::ui::panels::{print_device_panel, PanelOptions};

fn gpu(index: u32) -> Device {
    Device::new(DeviceIdentity {
        family: DeviceFamily::Gpu,
        index,
        name: "NVIDIA Jetson Orin Nano".to_string(),
        attributes: DeviceAttributes::Gpu {
            driver_version: "R35.4.1".to_string(),
            cuda_version: "11.4".to_string(),
            compute_capability: "8.7".to_string(),
        },
    })
}

#[test]
fn test_series_keeps_most_recent_capacity_samples() {
    let mut series = HistorySeries::new(5);
    for value in 1..=8 {
        series.push(Some(value as f64));
    }

    assert_eq!(series.len(), 5);
    assert_eq!(
        series.to_vec(),
        vec![Some(4.0), Some(5.0), Some(6.0), Some(7.0), Some(8.0)]
    );
}

#[test]
fn test_store_records_each_metric_per_device() {
    let mut store = HistoryStore::new(10);
    let mut device = gpu(0);
    device.snapshot.utilization = Some(42.0);
    device.snapshot.power_watts = Some(7.5);
    store.record(&device);

    let key = DeviceKey {
        family: DeviceFamily::Gpu,
        index: 0,
    };
    let utilization = store.series(key, Metric::Utilization).unwrap();
    assert_eq!(utilization.len(), 10);
    assert_eq!(utilization.latest(), Some(42.0));
    assert_eq!(store.series(key, Metric::Power).unwrap().latest(), Some(7.5));
    assert_eq!(store.series(key, Metric::Temperature).unwrap().latest(), None);
}

#[test]
fn test_render_width_is_exact() {
    let ramp = [Color::Green; 4];
    for samples in [0usize, 3, 40, 200] {
        let series: Vec<Option<f64>> = (0..samples).map(|i| Some((i % 100) as f64)).collect();
        let rows = render(&series, 40, 4, 100.0, GlyphSet::Block, &ramp);
        assert_eq!(rows.len(), 4);
        for row in rows {
            assert_eq!(row.text.chars().count(), 40);
        }
    }
}

#[test]
fn test_all_zero_series_draws_minimum_bar() {
    let ramp = [Color::Green; 3];
    let series = vec![Some(0.0); 6];
    let rows = render(&series, 6, 3, 100.0, GlyphSet::Block, &ramp);

    assert_eq!(rows[0].text, "      ");
    assert_eq!(rows[1].text, "      ");
    let partial = GlyphSet::Block.glyphs();
    let bottom: Vec<char> = rows[2].text.chars().collect();
    assert!(bottom.iter().all(|c| *c != ' ' && partial.contains(c)));
}

#[test]
fn test_missing_samples_leave_blank_columns() {
    let ramp = [Color::Green; 2];
    let series = vec![Some(100.0), None, Some(100.0)];
    let rows = render(&series, 3, 2, 100.0, GlyphSet::Block, &ramp);

    for row in rows {
        let columns: Vec<char> = row.text.chars().collect();
        assert_eq!(columns[1], ' ');
        assert_eq!(columns[0], GlyphSet::Block.full());
    }
}

#[test]
fn test_fanless_panel_reports_not_available() {
    let mut device = gpu(0);
    device.snapshot.utilization = Some(10.0);
    let mut out = Vec::new();
    print_device_panel(&mut out, &device, false, None, &PanelOptions::default()).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[GPU 0]"));
    assert!(text.contains("N/A (fanless)"));
}
