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

use std::path::PathBuf;

use clap::Parser;

use crate::common::config::{AppConfig, SessionConfig};
use crate::device::DeviceFamily;
use crate::error::Result;
use crate::ui::graph::GlyphSet;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Monitor NVIDIA GPUs (discrete or Jetson).
    #[arg(short, long)]
    pub gpu: bool,
    /// Monitor the host CPU (simulated readings).
    #[arg(short, long)]
    pub cpu: bool,
    /// Monitor Intel NPUs.
    #[arg(short, long)]
    pub npu: bool,
    /// Append per-device utilization to CSV files.
    #[arg(short, long)]
    pub log: bool,
    /// Directory for CSV logs. Implies --log.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Use the plain text layout (one family, GPU or NPU).
    #[arg(long)]
    pub legacy: bool,
    /// Graph glyph set.
    #[arg(long, value_enum, default_value_t = GlyphSet::Braille)]
    pub style: GlyphSet,
    /// Poll interval in milliseconds.
    #[arg(short, long, value_name = "MS", default_value_t = AppConfig::DEFAULT_POLL_INTERVAL_MS)]
    pub interval: u64,
    /// Write diagnostics to this file instead of discarding them.
    #[arg(long, value_name = "PATH")]
    pub trace_file: Option<PathBuf>,
    /// Print one JSON snapshot of all devices and exit.
    #[arg(long)]
    pub snapshot: bool,
}

impl Cli {
    /// Selected families in mount order. No flag means GPU and CPU.
    pub fn families(&self) -> Vec<DeviceFamily> {
        if !(self.gpu || self.cpu || self.npu) {
            return vec![DeviceFamily::Cpu, DeviceFamily::Gpu];
        }
        [
            (self.cpu, DeviceFamily::Cpu),
            (self.gpu, DeviceFamily::Gpu),
            (self.npu, DeviceFamily::Npu),
        ]
        .into_iter()
        .filter_map(|(enabled, family)| enabled.then_some(family))
        .collect()
    }

    pub fn session_config(&self) -> Result<SessionConfig> {
        let log_dir = match (&self.log_dir, self.log) {
            (Some(dir), _) => Some(dir.clone()),
            (None, true) => Some(PathBuf::from(AppConfig::DEFAULT_LOG_DIR)),
            (None, false) => None,
        };

        let config = SessionConfig {
            families: self.families(),
            glyphs: self.style,
            legacy: self.legacy,
            log_dir,
            poll_interval_ms: self.interval,
            trace_file: self.trace_file.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xtop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_family_flag_means_gpu_and_cpu() {
        let cli = parse(&[]);
        assert_eq!(cli.families(), vec![DeviceFamily::Cpu, DeviceFamily::Gpu]);
        let config = cli.session_config().unwrap();
        assert_eq!(config.poll_interval_ms, 700);
        assert_eq!(config.glyphs, GlyphSet::Braille);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_flags_select_families() {
        assert_eq!(parse(&["-n"]).families(), vec![DeviceFamily::Npu]);
        assert_eq!(
            parse(&["--gpu", "--npu"]).families(),
            vec![DeviceFamily::Gpu, DeviceFamily::Npu]
        );
    }

    #[test]
    fn test_log_flag_uses_default_dir() {
        let config = parse(&["-l"]).session_config().unwrap();
        assert_eq!(config.log_dir, Some(PathBuf::from("xtop-logs")));

        let config = parse(&["--log-dir", "/tmp/x"]).session_config().unwrap();
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_style_and_interval() {
        let config = parse(&["--style", "block", "-i", "250"]).session_config().unwrap();
        assert_eq!(config.glyphs, GlyphSet::Block);
        assert_eq!(config.poll_interval_ms, 250);
    }

    #[test]
    fn test_unsupported_combinations() {
        assert!(parse(&["--legacy"]).session_config().is_err());
        assert!(parse(&["--legacy", "-c"]).session_config().is_err());
        assert!(parse(&["--legacy", "-g", "-n"]).session_config().is_err());
        assert!(parse(&["-i", "0"]).session_config().is_err());
        assert!(parse(&["--legacy", "-n"]).session_config().is_ok());
    }
}
