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

use crossterm::style::Color;

use crate::common::config::ThemeConfig;
use crate::device::DeviceFamily;

// Brightness of the first stop relative to the base color
const DIMMEST: f64 = 0.35;

/// Gradient from a dim shade of `base` up to `base` itself.
pub fn color_ramp(base: (u8, u8, u8), stops: usize) -> Vec<Color> {
    let (r, g, b) = base;
    let last = stops.saturating_sub(1).max(1) as f64;
    (0..stops)
        .map(|stop| {
            let factor = DIMMEST + (1.0 - DIMMEST) * stop as f64 / last;
            Color::Rgb {
                r: scale(r, factor),
                g: scale(g, factor),
                b: scale(b, factor),
            }
        })
        .collect()
}

fn scale(channel: u8, factor: f64) -> u8 {
    (channel as f64 * factor).round().clamp(0.0, 255.0) as u8
}

pub fn family_ramp(family: DeviceFamily) -> Vec<Color> {
    color_ramp(ThemeConfig::family_rgb(family), ThemeConfig::RAMP_STOPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_ends_at_base_color() {
        let ramp = family_ramp(DeviceFamily::Gpu);
        assert_eq!(ramp.len(), 8);
        assert_eq!(ramp[7], ThemeConfig::family_color(DeviceFamily::Gpu));
    }

    #[test]
    fn test_ramp_brightens_monotonically() {
        let ramp = color_ramp((200, 100, 50), 8);
        let reds: Vec<u8> = ramp
            .iter()
            .map(|c| match c {
                Color::Rgb { r, .. } => *r,
                _ => 0,
            })
            .collect();
        assert!(reds.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reds[0], 70);
    }
}
