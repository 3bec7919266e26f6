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

use chrono::{DateTime, Local};
use crossterm::style::Color;

use crate::device::{Device, DeviceFamily};
use crate::metrics::{HistoryStore, Metric};
use crate::ui::buffer::BufferWriter;
use crate::ui::panels::{print_device_panel, PanelOptions};
use crate::ui::text::{print_colored_text, print_line_break};

pub const NO_HARDWARE_MESSAGE: &str = "No supported hardware found.";

/// Everything one frame of the dashboard needs.
pub struct DashboardView<'a> {
    pub devices: Vec<(&'a Device, bool)>,
    pub history: &'a HistoryStore,
    pub degraded: &'a [DeviceFamily],
    pub options: PanelOptions,
    pub now: DateTime<Local>,
    pub scroll_offset: usize,
}

/// A composed frame plus the scroll geometry it was cut with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFrame {
    pub text: String,
    /// Offset actually applied, clamped to `max_scroll`.
    pub scroll_offset: usize,
    pub max_scroll: usize,
    /// Panel lines visible between the pinned header and footer.
    pub body_rows: usize,
}

/// Compose a frame for a screen `screen_rows` tall.
///
/// The header and footer are always drawn; the panels in between are cut
/// to the rows left over, starting `view.scroll_offset` lines down.
pub fn render_dashboard(view: &DashboardView<'_>, screen_rows: usize) -> DashboardFrame {
    let header = capture_lines(|out| draw_header(out, view));
    let body = capture_lines(|out| draw_body(out, view));
    let footer = capture_lines(|out| {
        print_line_break(out)?;
        draw_footer(out)
    });

    let body_rows = screen_rows
        .saturating_sub(header.len() + footer.len())
        .max(1);
    let max_scroll = body.len().saturating_sub(body_rows);
    let scroll_offset = view.scroll_offset.min(max_scroll);

    let mut lines = header;
    lines.extend(body.into_iter().skip(scroll_offset).take(body_rows));
    lines.extend(footer);

    let mut text = lines.join("\r\n");
    text.push_str("\r\n");
    DashboardFrame {
        text,
        scroll_offset,
        max_scroll,
        body_rows,
    }
}

fn capture_lines<F>(draw: F) -> Vec<String>
where
    F: FnOnce(&mut BufferWriter) -> io::Result<()>,
{
    let mut buffer = BufferWriter::new();
    // BufferWriter never fails
    let _ = draw(&mut buffer);
    buffer
        .into_string()
        .split_terminator("\r\n")
        .map(str::to_string)
        .collect()
}

fn draw_body<W: Write>(out: &mut W, view: &DashboardView<'_>) -> io::Result<()> {
    if view.devices.is_empty() {
        print_line_break(out)?;
        print_colored_text(out, NO_HARDWARE_MESSAGE, Color::Yellow, None)?;
        print_line_break(out)?;
    }

    for (device, synthetic) in &view.devices {
        print_line_break(out)?;
        let series = view.history.series(device.key(), Metric::Utilization);
        print_device_panel(out, device, *synthetic, series, &view.options)?;
    }
    Ok(())
}

fn draw_header<W: Write>(out: &mut W, view: &DashboardView<'_>) -> io::Result<()> {
    print_colored_text(out, "xtop", Color::Cyan, None)?;
    print_colored_text(
        out,
        &format!("  {}", view.now.format("%Y-%m-%d %H:%M:%S")),
        Color::White,
        None,
    )?;
    print_colored_text(
        out,
        &format!("  style: {}", view.options.glyphs.name()),
        Color::DarkGrey,
        None,
    )?;

    if !view.degraded.is_empty() {
        let families: Vec<&str> = view.degraded.iter().map(|f| f.label()).collect();
        print_colored_text(
            out,
            &format!("  degraded: {}", families.join(", ")),
            Color::Red,
            None,
        )?;
    }
    print_line_break(out)
}

fn draw_footer<W: Write>(out: &mut W) -> io::Result<()> {
    print_colored_text(out, "q", Color::Yellow, None)?;
    print_colored_text(out, " Quit  ", Color::DarkGrey, None)?;
    print_colored_text(out, "s", Color::Yellow, None)?;
    print_colored_text(out, " Graph style  ", Color::DarkGrey, None)?;
    print_colored_text(out, "p", Color::Yellow, None)?;
    print_colored_text(out, " Per-core  ", Color::DarkGrey, None)?;
    print_colored_text(out, "↑↓ PgUp PgDn", Color::Yellow, None)?;
    print_colored_text(out, " Scroll", Color::DarkGrey, None)?;
    print_line_break(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceAttributes, DeviceIdentity};
    use crate::ui::graph::GlyphSet;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 5, 6, 7, 8, 9).unwrap()
    }

    #[test]
    fn test_empty_dashboard_shows_no_hardware() {
        let history = HistoryStore::new(80);
        let view = DashboardView {
            devices: Vec::new(),
            history: &history,
            degraded: &[],
            options: PanelOptions::default(),
            now: now(),
            scroll_offset: 0,
        };
        let frame = render_dashboard(&view, 100).text;
        assert!(frame.contains(NO_HARDWARE_MESSAGE));
        assert!(frame.contains("2026-05-06 07:08:09"));
        assert!(frame.contains("style: braille"));
    }

    #[test]
    fn test_header_flags_degraded_families() {
        let history = HistoryStore::new(80);
        let device = Device::new(DeviceIdentity {
            family: DeviceFamily::Npu,
            index: 0,
            name: "Intel Meteor Lake NPU".to_string(),
            attributes: DeviceAttributes::Npu {
                vendor_name: "Intel".to_string(),
                device_name: "Meteor Lake NPU".to_string(),
                pci_path: "/sys/bus/pci/devices/0000:00:0b.0".into(),
            },
        });
        let degraded = [DeviceFamily::Npu];
        let view = DashboardView {
            devices: vec![(&device, false)],
            history: &history,
            degraded: &degraded,
            options: PanelOptions {
                glyphs: GlyphSet::Block,
                ..Default::default()
            },
            now: now(),
            scroll_offset: 0,
        };
        let frame = render_dashboard(&view, 100).text;
        assert!(frame.contains("degraded: NPU"));
        assert!(frame.contains("[NPU 0] "));
        assert!(frame.contains("style: block"));
        assert!(!frame.contains(NO_HARDWARE_MESSAGE));
    }

    fn gpu(index: u32) -> Device {
        Device::new(DeviceIdentity {
            family: DeviceFamily::Gpu,
            index,
            name: format!("Tesla T4 #{index}"),
            attributes: DeviceAttributes::Gpu {
                driver_version: "535.104".to_string(),
                cuda_version: "12.2".to_string(),
                compute_capability: "7.5".to_string(),
            },
        })
    }

    fn two_gpu_view<'a>(
        devices: &'a [Device],
        history: &'a HistoryStore,
        scroll_offset: usize,
    ) -> DashboardView<'a> {
        DashboardView {
            devices: devices.iter().map(|d| (d, false)).collect(),
            history,
            degraded: &[],
            options: PanelOptions::default(),
            now: now(),
            scroll_offset,
        }
    }

    fn recorded(devices: &[Device]) -> HistoryStore {
        let mut history = HistoryStore::new(80);
        for device in devices {
            history.record(device);
        }
        history
    }

    #[test]
    fn test_tall_frame_fits_screen_with_footer_pinned() {
        let devices = [gpu(0), gpu(1)];
        let history = recorded(&devices);
        let frame = render_dashboard(&two_gpu_view(&devices, &history, 0), 24);

        let lines: Vec<&str> = frame.text.lines().collect();
        assert_eq!(lines.len(), 24);
        assert!(lines[0].contains("xtop"));
        assert!(lines[23].contains("Quit"));
        // Two panels of 15 lines plus a spacer each, 21 rows available
        assert_eq!(frame.max_scroll, 11);
        assert_eq!(frame.body_rows, 21);
        assert!(frame.text.contains("[GPU 0]"));
    }

    #[test]
    fn test_scrolling_reaches_last_panel() {
        let devices = [gpu(0), gpu(1)];
        let history = recorded(&devices);
        let frame = render_dashboard(&two_gpu_view(&devices, &history, usize::MAX), 24);

        assert_eq!(frame.scroll_offset, frame.max_scroll);
        assert!(frame.text.contains("[GPU 1]"));
        assert!(!frame.text.contains("[GPU 0]"));
        assert_eq!(frame.text.lines().count(), 24);
        assert!(frame.text.lines().last().unwrap().contains("Quit"));
    }

    #[test]
    fn test_short_frame_has_nothing_to_scroll() {
        let history = HistoryStore::new(80);
        let view = DashboardView {
            devices: Vec::new(),
            history: &history,
            degraded: &[],
            options: PanelOptions::default(),
            now: now(),
            scroll_offset: 5,
        };
        let frame = render_dashboard(&view, 24);
        assert_eq!(frame.max_scroll, 0);
        assert_eq!(frame.scroll_offset, 0);
        assert!(frame.text.contains(NO_HARDWARE_MESSAGE));
    }
}
