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

use crossterm::style::Color;

use crate::common::config::{AppConfig, ThemeConfig};
use crate::device::{Device, DeviceAttributes, DeviceIdentity};
use crate::metrics::HistorySeries;
use crate::ui::graph::{self, GlyphSet};
use crate::ui::text::{
    format_fan, format_memory, format_metric, print_colored_text, print_line_break,
};
use crate::ui::theme::family_ramp;

const INDENT: &str = "  ";
const SIMULATED_MARKER: &str = " [simulated]";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelOptions {
    pub glyphs: GlyphSet,
    pub show_per_core: bool,
    pub graph_width: usize,
    pub graph_height: usize,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            glyphs: GlyphSet::Braille,
            show_per_core: false,
            graph_width: AppConfig::GRAPH_WIDTH,
            graph_height: AppConfig::GRAPH_HEIGHT,
        }
    }
}

/// Static identity details shown under the title.
pub fn attribute_line(identity: &DeviceIdentity) -> String {
    match &identity.attributes {
        DeviceAttributes::Gpu {
            driver_version,
            cuda_version,
            compute_capability,
        } => format!("Driver {driver_version} | CUDA {cuda_version} | CC {compute_capability}"),
        DeviceAttributes::Cpu { cores, threads } => format!("{cores} cores | {threads} threads"),
        DeviceAttributes::Npu {
            vendor_name,
            pci_path,
            ..
        } => format!("{vendor_name} | {}", pci_path.display()),
    }
}

/// Render one device: title, attributes, readings and the utilization graph.
pub fn print_device_panel<W: Write>(
    out: &mut W,
    device: &Device,
    synthetic: bool,
    history: Option<&HistorySeries>,
    options: &PanelOptions,
) -> io::Result<()> {
    let family = device.identity.family;
    let accent = ThemeConfig::family_color(family);
    let snapshot = &device.snapshot;

    print_colored_text(out, &format!("[{}] ", device.label()), accent, None)?;
    print_colored_text(out, &device.identity.name, Color::White, None)?;
    if synthetic {
        print_colored_text(out, SIMULATED_MARKER, Color::DarkYellow, None)?;
    }
    print_line_break(out)?;

    print_colored_text(
        out,
        &format!("{INDENT}{}", attribute_line(&device.identity)),
        Color::DarkGrey,
        None,
    )?;
    print_line_break(out)?;

    print_colored_text(out, &format!("{INDENT}Util: "), Color::Yellow, None)?;
    let util_color = snapshot
        .utilization
        .map(ThemeConfig::utilization_color)
        .unwrap_or(Color::DarkGrey);
    print_colored_text(out, &format_metric(snapshot.utilization, 1, "%"), util_color, Some(8))?;
    print_colored_text(out, "Mem: ", Color::Blue, None)?;
    print_colored_text(out, &format_memory(snapshot), Color::White, None)?;
    print_line_break(out)?;

    print_colored_text(out, &format!("{INDENT}Power: "), Color::Red, None)?;
    print_colored_text(out, &format_metric(snapshot.power_watts, 1, " W"), Color::White, Some(9))?;
    print_colored_text(out, "Temp: ", Color::Magenta, None)?;
    print_colored_text(
        out,
        &format_metric(snapshot.temperature_celsius, 1, "°C"),
        Color::White,
        Some(9),
    )?;
    print_colored_text(out, "Fan: ", Color::Cyan, None)?;
    print_colored_text(out, &format_fan(snapshot), Color::White, None)?;
    print_line_break(out)?;

    if let Some(frequency) = snapshot.frequency_ghz {
        print_colored_text(out, &format!("{INDENT}Freq: "), Color::Green, None)?;
        print_colored_text(out, &format!("{frequency:.2} GHz"), Color::White, None)?;
        print_line_break(out)?;
    }

    if options.show_per_core && !snapshot.core_utilization.is_empty() {
        print_core_strip(out, &snapshot.core_utilization, options.graph_width)?;
    }

    if let Some(series) = history {
        let rows = graph::render(
            &series.to_vec(),
            options.graph_width,
            options.graph_height,
            AppConfig::UTILIZATION_MAX,
            options.glyphs,
            &family_ramp(family),
        );
        for row in rows {
            print_colored_text(out, INDENT, Color::Reset, None)?;
            print_colored_text(out, &row.text, row.color, None)?;
            print_line_break(out)?;
        }
    }

    Ok(())
}

/// Per-core utilization, wrapped to the graph width.
fn print_core_strip<W: Write>(out: &mut W, cores: &[f64], width: usize) -> io::Result<()> {
    const CELL: usize = 7;
    let per_line = (width / CELL).max(1);

    for chunk in cores.chunks(per_line) {
        print_colored_text(out, INDENT, Color::Reset, None)?;
        for core in chunk {
            print_colored_text(
                out,
                &format!("{core:>5.1}%"),
                ThemeConfig::utilization_color(*core),
                Some(CELL),
            )?;
        }
        print_line_break(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceFamily, DeviceIdentity};
    use crate::ui::test_utils::MockWriter;

    fn gpu() -> Device {
        Device::new(DeviceIdentity {
            family: DeviceFamily::Gpu,
            index: 0,
            name: "NVIDIA RTX A6000".to_string(),
            attributes: DeviceAttributes::Gpu {
                driver_version: "550.54".to_string(),
                cuda_version: "12.4".to_string(),
                compute_capability: "8.6".to_string(),
            },
        })
    }

    fn cpu() -> Device {
        Device::new(DeviceIdentity {
            family: DeviceFamily::Cpu,
            index: 0,
            name: "Test CPU".to_string(),
            attributes: DeviceAttributes::Cpu {
                cores: 2,
                threads: 4,
            },
        })
    }

    fn render(device: &Device, synthetic: bool, options: &PanelOptions) -> String {
        let mut out = MockWriter::new();
        let series = HistorySeries::new(10);
        print_device_panel(&mut out, device, synthetic, Some(&series), options).unwrap();
        out.get_output()
    }

    #[test]
    fn test_fanless_panel_shows_indicator_not_number() {
        let mut device = gpu();
        device.snapshot.utilization = Some(42.0);
        device.snapshot.temperature_celsius = Some(61.0);
        let output = render(&device, false, &PanelOptions::default());

        assert!(output.contains("[GPU 0] "));
        assert!(output.contains("Driver 550.54 | CUDA 12.4 | CC 8.6"));
        assert!(output.contains("N/A (fanless)"));
        assert!(!output.contains("RPM"));
        assert!(!output.contains("[simulated]"));
    }

    #[test]
    fn test_graph_has_configured_height() {
        let options = PanelOptions {
            graph_width: 10,
            graph_height: 4,
            ..Default::default()
        };
        let output = render(&gpu(), false, &options);
        // title, attributes, util/mem, power/temp/fan, then the graph
        assert_eq!(output.matches("\r\n").count(), 4 + 4);
    }

    #[test]
    fn test_synthetic_cpu_panel() {
        let mut device = cpu();
        device.snapshot.frequency_ghz = Some(3.21);
        device.snapshot.core_utilization = vec![12.5, 80.0];
        let options = PanelOptions {
            show_per_core: true,
            ..Default::default()
        };
        let output = render(&device, true, &options);

        assert!(output.contains("[simulated]"));
        assert!(output.contains("3.21 GHz"));
        assert!(output.contains(" 12.5%"));
        assert!(output.contains(" 80.0%"));
        assert!(output.contains("2 cores | 4 threads"));
    }

    #[test]
    fn test_core_strip_hidden_by_default() {
        let mut device = cpu();
        device.snapshot.core_utilization = vec![12.5, 80.0];
        let output = render(&device, true, &PanelOptions::default());
        assert!(!output.contains(" 80.0%"));
    }
}
