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

//! Unit conversion utilities
//!
//! Rounding follows `f64::round`: halves round away from zero.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const KIB_PER_MB: f64 = 1024.0;

/// Round to a fixed number of decimal places
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Convert milliwatts to watts with one decimal place
#[inline]
pub fn milliwatts_to_watts(milliwatts: u64) -> f64 {
    round_to(milliwatts as f64 / 1000.0, 1)
}

/// Convert bytes to megabytes (1024²)
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Convert kibibytes (as reported by /proc/meminfo) to megabytes
#[inline]
pub fn kib_to_mb(kib: u64) -> f64 {
    kib as f64 / KIB_PER_MB
}

/// Convert millicelsius to celsius
#[inline]
pub fn millicelsius_to_celsius(millicelsius: f64) -> f64 {
    millicelsius / 1000.0
}

/// Convert a raw 0-255 PWM duty value to a whole percentage
#[inline]
pub fn pwm_to_percent(pwm: u32) -> u32 {
    ((pwm.min(255) as f64 / 255.0) * 100.0) as u32
}
