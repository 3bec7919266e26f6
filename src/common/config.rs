use std::path::PathBuf;

use crossterm::style::Color;

use crate::device::DeviceFamily;
use crate::error::{Error, Result};
use crate::ui::graph::GlyphSet;

/// Application configuration constants
pub struct AppConfig;

impl AppConfig {
    // Polling
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 700;
    pub const EVENT_POLL_TIMEOUT_MS: u64 = 50;

    // UI Rendering Constants
    pub const MIN_RENDER_INTERVAL_MS: u64 = 33; // ~30 FPS
    pub const GRAPH_WIDTH: usize = 76;
    pub const GRAPH_HEIGHT: usize = 11;
    pub const UTILIZATION_MAX: f64 = 100.0;
    pub const DEFAULT_TERMINAL_WIDTH: u16 = 80;
    pub const DEFAULT_TERMINAL_HEIGHT: u16 = 24;

    // History
    pub const HISTORY_CAPACITY: usize = 80;

    // Logging
    pub const DEFAULT_LOG_DIR: &'static str = "xtop-logs";
    pub const DEFAULT_TRACE_DIRECTIVE: &'static str = "xtop=info";

    // Color Thresholds
    pub const CRITICAL_THRESHOLD: f64 = 80.0;
    pub const WARNING_THRESHOLD: f64 = 50.0;
    pub const NORMAL_THRESHOLD: f64 = 20.0;
}

/// Settings for one monitoring session, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub families: Vec<DeviceFamily>,
    pub glyphs: GlyphSet,
    pub legacy: bool,
    pub log_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub trace_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            families: vec![DeviceFamily::Cpu, DeviceFamily::Gpu],
            glyphs: GlyphSet::Braille,
            legacy: false,
            log_dir: None,
            poll_interval_ms: AppConfig::DEFAULT_POLL_INTERVAL_MS,
            trace_file: None,
        }
    }
}

impl SessionConfig {
    /// Reject combinations the renderers cannot serve.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::UnsupportedPlatform(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.legacy {
            if self.families.contains(&DeviceFamily::Cpu) {
                return Err(Error::UnsupportedPlatform(
                    "the legacy renderer does not support the CPU family".to_string(),
                ));
            }
            if self.families.len() > 1 {
                return Err(Error::UnsupportedPlatform(
                    "the legacy renderer shows one device family at a time".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn logging_enabled(&self) -> bool {
        self.log_dir.is_some()
    }
}

/// UI Theme configuration
pub struct ThemeConfig;

impl ThemeConfig {
    pub const RAMP_STOPS: usize = 8;

    pub const GPU_RGB: (u8, u8, u8) = (0x06, 0xB6, 0xD4);
    pub const CPU_RGB: (u8, u8, u8) = (0xA8, 0x55, 0xF7);
    pub const NPU_RGB: (u8, u8, u8) = (0xEC, 0x48, 0x99);

    pub fn family_rgb(family: DeviceFamily) -> (u8, u8, u8) {
        match family {
            DeviceFamily::Gpu => Self::GPU_RGB,
            DeviceFamily::Cpu => Self::CPU_RGB,
            DeviceFamily::Npu => Self::NPU_RGB,
        }
    }

    pub fn family_color(family: DeviceFamily) -> Color {
        let (r, g, b) = Self::family_rgb(family);
        Color::Rgb { r, g, b }
    }

    pub fn utilization_color(utilization: f64) -> Color {
        if utilization > AppConfig::CRITICAL_THRESHOLD {
            Color::Red
        } else if utilization > AppConfig::WARNING_THRESHOLD {
            Color::Yellow
        } else if utilization > AppConfig::NORMAL_THRESHOLD {
            Color::Green
        } else {
            Color::DarkGrey
        }
    }
}
