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

//! Utilization derived from cumulative busy-time counters.

use crate::utils::units::round_to;

/// Wall-clock source in microseconds.
pub trait Clock: Send {
    fn now_micros(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        chrono::Utc::now().timestamp_micros()
    }
}

/// Last observed counter value and when it was observed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RateCounter {
    last: Option<(u64, i64)>,
}

impl RateCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new busy-time sample and return utilization in percent,
    /// rounded to two decimals.
    ///
    /// The first sample, a wall clock that did not advance, and a counter
    /// that went backwards all yield 0.0.
    pub fn sample(&mut self, busy_us: u64, now_us: i64) -> f64 {
        let utilization = match self.last {
            Some((last_busy, last_at)) => {
                let elapsed_us = now_us - last_at;
                if elapsed_us <= 0 {
                    0.0
                } else {
                    let busy_delta = busy_us.saturating_sub(last_busy) as f64;
                    round_to(busy_delta / elapsed_us as f64 * 100.0, 2).clamp(0.0, 100.0)
                }
            }
            None => 0.0,
        };
        self.last = Some((busy_us, now_us));
        utilization
    }

    pub fn has_baseline(&self) -> bool {
        self.last.is_some()
    }
}
