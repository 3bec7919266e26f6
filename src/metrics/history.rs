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

use std::collections::{BTreeMap, VecDeque};

use crate::device::{Device, DeviceKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Utilization,
    MemoryPercent,
    Power,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Utilization,
        Metric::MemoryPercent,
        Metric::Power,
        Metric::Temperature,
    ];

    fn read(self, device: &Device) -> Option<f64> {
        let snapshot = &device.snapshot;
        match self {
            Metric::Utilization => snapshot.utilization,
            Metric::MemoryPercent => snapshot.memory.map(|m| m.used_percent()),
            Metric::Power => snapshot.power_watts,
            Metric::Temperature => snapshot.temperature_celsius,
        }
    }
}

/// Fixed-capacity FIFO of recent samples; `None` marks a tick without data.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    samples: VecDeque<Option<f64>>,
    capacity: usize,
}

impl HistorySeries {
    /// A full series of zeros, so a graph has its whole width from the start.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: std::iter::repeat(Some(0.0)).take(capacity).collect(),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Option<f64>) {
        if self.capacity == 0 {
            return;
        }
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied().flatten()
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<Option<f64>> {
        self.samples.iter().copied().collect()
    }
}

/// One series per (device, metric).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    series: BTreeMap<(DeviceKey, Metric), HistorySeries>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            series: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&mut self, key: DeviceKey, metric: Metric, sample: Option<f64>) {
        let capacity = self.capacity;
        self.series
            .entry((key, metric))
            .or_insert_with(|| HistorySeries::new(capacity))
            .push(sample);
    }

    /// Push the device's current snapshot into each of its series.
    pub fn record(&mut self, device: &Device) {
        let key = device.key();
        for metric in Metric::ALL {
            self.append(key, metric, metric.read(device));
        }
    }

    pub fn series(&self, key: DeviceKey, metric: Metric) -> Option<&HistorySeries> {
        self.series.get(&(key, metric))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceAttributes, DeviceFamily, DeviceIdentity, MemoryReading};

    fn device() -> Device {
        Device::new(DeviceIdentity {
            family: DeviceFamily::Gpu,
            index: 1,
            name: "Test GPU".to_string(),
            attributes: DeviceAttributes::Gpu {
                driver_version: "550.54".to_string(),
                cuda_version: "12.4".to_string(),
                compute_capability: "8.9".to_string(),
            },
        })
    }

    #[test]
    fn test_series_starts_full_of_zeros() {
        let series = HistorySeries::new(5);
        assert_eq!(series.len(), 5);
        assert_eq!(series.to_vec(), vec![Some(0.0); 5]);
    }

    #[test]
    fn test_series_keeps_last_capacity_values() {
        let mut series = HistorySeries::new(3);
        for value in 1..=7 {
            series.push(Some(value as f64));
            assert!(series.len() <= 3);
        }
        assert_eq!(series.to_vec(), vec![Some(5.0), Some(6.0), Some(7.0)]);
        assert_eq!(series.latest(), Some(7.0));
    }

    #[test]
    fn test_absent_sample_is_kept_as_gap() {
        let mut series = HistorySeries::new(2);
        series.push(None);
        assert_eq!(series.to_vec(), vec![Some(0.0), None]);
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut series = HistorySeries::new(0);
        series.push(Some(1.0));
        assert!(series.is_empty());
    }

    #[test]
    fn test_record_tracks_every_metric() {
        let mut store = HistoryStore::new(4);
        let mut gpu = device();
        gpu.snapshot.utilization = Some(40.0);
        gpu.snapshot.memory = Some(MemoryReading {
            used_mb: 1024.0,
            total_mb: 4096.0,
            free_mb: 3072.0,
        });
        gpu.snapshot.power_watts = Some(123.5);
        store.record(&gpu);

        let key = gpu.key();
        assert_eq!(store.len(), 4);
        assert_eq!(store.series(key, Metric::Utilization).unwrap().latest(), Some(40.0));
        assert_eq!(store.series(key, Metric::MemoryPercent).unwrap().latest(), Some(25.0));
        assert_eq!(store.series(key, Metric::Power).unwrap().latest(), Some(123.5));
        assert_eq!(store.series(key, Metric::Temperature).unwrap().latest(), None);
        assert_eq!(store.series(key, Metric::Utilization).unwrap().len(), 4);
    }
}
