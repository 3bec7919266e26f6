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

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};

use crate::device::DeviceSnapshot;

pub const NOT_AVAILABLE: &str = "N/A";

// Helper function to truncate a string to fit within a given width
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

pub fn print_colored_text<W: Write>(
    out: &mut W,
    text: &str,
    fg_color: Color,
    width: Option<usize>,
) -> io::Result<()> {
    let adjusted_text = match width {
        Some(w) if text.chars().count() > w => truncate_to_width(text, w),
        Some(w) => format!("{text:<w$}"),
        None => text.to_string(),
    };

    queue!(
        out,
        SetForegroundColor(fg_color),
        Print(adjusted_text),
        ResetColor
    )
}

pub fn print_line_break<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, Print("\r\n"))
}

/// `value` with `decimals` places and a unit suffix, or N/A when absent.
pub fn format_metric(value: Option<f64>, decimals: usize, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}{unit}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_memory(snapshot: &DeviceSnapshot) -> String {
    match snapshot.memory {
        Some(memory) => format!(
            "{:.0}/{:.0} MB ({:.1}%)",
            memory.used_mb,
            memory.total_mb,
            memory.used_percent()
        ),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Fan line text; a fanless device never shows a number.
pub fn format_fan(snapshot: &DeviceSnapshot) -> String {
    match (snapshot.fan_rpm, snapshot.fan_percent) {
        (Some(rpm), Some(percent)) => format!("{rpm} RPM ({percent}%)"),
        (Some(rpm), None) => format!("{rpm} RPM"),
        (None, Some(percent)) => format!("{percent}%"),
        (None, None) => format!("{NOT_AVAILABLE} (fanless)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_utils::MockWriter;

    #[test]
    fn test_print_colored_text_pads_and_truncates() {
        let mut writer = MockWriter::new();
        print_colored_text(&mut writer, "GPU", Color::Cyan, Some(5)).unwrap();
        assert!(writer.get_output().contains("GPU  "));

        writer.clear();
        print_colored_text(&mut writer, "NVIDIA GeForce", Color::White, Some(6)).unwrap();
        let output = writer.get_output();
        assert!(output.contains("NVIDIA"));
        assert!(!output.contains("GeForce"));
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(Some(123.46), 1, " W"), "123.5 W");
        assert_eq!(format_metric(None, 1, " W"), "N/A");
    }

    #[test]
    fn test_fan_formats() {
        let mut snapshot = DeviceSnapshot::default();
        assert_eq!(format_fan(&snapshot), "N/A (fanless)");

        snapshot.fan_percent = Some(0);
        assert_eq!(format_fan(&snapshot), "0%");

        snapshot.fan_rpm = Some(1800);
        snapshot.fan_percent = Some(45);
        assert_eq!(format_fan(&snapshot), "1800 RPM (45%)");
    }

    #[test]
    fn test_memory_format() {
        let mut snapshot = DeviceSnapshot::default();
        assert_eq!(format_memory(&snapshot), "N/A");
        snapshot.memory = Some(crate::device::MemoryReading {
            used_mb: 2048.0,
            total_mb: 8192.0,
            free_mb: 6144.0,
        });
        assert_eq!(format_memory(&snapshot), "2048/8192 MB (25.0%)");
    }
}
