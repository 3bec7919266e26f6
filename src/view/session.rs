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

//! One monitoring session: poll, record, log and render, in that order,
//! on a single loop.

use std::io::{stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event},
    terminal::size,
};
use tracing::debug;

use crate::common::config::{AppConfig, SessionConfig};
use crate::device::{DeviceFamily, Poller, TickReport};
use crate::error::Result;
use crate::metrics::log_sink::epoch_seconds;
use crate::metrics::{CsvLogSink, HistoryStore};
use crate::ui::buffer::DifferentialRenderer;
use crate::ui::dashboard::{render_dashboard, DashboardView};
use crate::ui::graph::GlyphSet;
use crate::ui::legacy::render_legacy;
use crate::ui::panels::PanelOptions;
use crate::view::event_handler::{handle_key_event, KeyAction};

pub struct Session {
    poller: Poller,
    history: HistoryStore,
    log_sink: Option<CsvLogSink>,
    glyphs: GlyphSet,
    show_per_core: bool,
    legacy_family: Option<DeviceFamily>,
    last_report: TickReport,
    cols: u16,
    rows: u16,
    scroll_offset: usize,
    max_scroll: usize,
    page_rows: usize,
}

impl Session {
    pub fn new(poller: Poller, config: &SessionConfig) -> Self {
        let legacy_family = if config.legacy {
            config.families.first().copied()
        } else {
            None
        };

        Self {
            poller,
            history: HistoryStore::new(AppConfig::HISTORY_CAPACITY),
            log_sink: config.log_dir.clone().map(CsvLogSink::new),
            glyphs: config.glyphs,
            show_per_core: false,
            legacy_family,
            last_report: TickReport::default(),
            cols: AppConfig::DEFAULT_TERMINAL_WIDTH,
            rows: AppConfig::DEFAULT_TERMINAL_HEIGHT,
            scroll_offset: 0,
            max_scroll: 0,
            page_rows: 1,
        }
    }

    pub fn has_family(&self, family: DeviceFamily) -> bool {
        self.poller.has_family(family)
    }

    pub fn has_gpu(&self) -> bool {
        self.has_family(DeviceFamily::Gpu)
    }

    pub fn has_cpu(&self) -> bool {
        self.has_family(DeviceFamily::Cpu)
    }

    pub fn has_npu(&self) -> bool {
        self.has_family(DeviceFamily::Npu)
    }

    pub fn has_any_hardware(&self) -> bool {
        !self.poller.is_empty()
    }

    pub fn glyphs(&self) -> GlyphSet {
        self.glyphs
    }

    pub fn show_per_core(&self) -> bool {
        self.show_per_core
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Terminal size the next frame is composed for.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    /// Refresh all backends, then push the snapshots into history and the
    /// optional CSV log.
    pub fn tick(&mut self) -> &TickReport {
        self.last_report = self.poller.tick();
        let epoch = epoch_seconds();

        for (device, _) in self.poller.devices() {
            self.history.record(device);
            if let Some(sink) = self.log_sink.as_mut() {
                sink.append(device, epoch);
            }
        }
        &self.last_report
    }

    /// Apply a key action; returns true when the session should end.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::Quit => return true,
            KeyAction::ToggleGlyphs => {
                self.glyphs = self.glyphs.toggled();
                debug!("Graph style switched to {}", self.glyphs.name());
            }
            KeyAction::TogglePerCore => self.show_per_core = !self.show_per_core,
            KeyAction::ScrollUp => self.scroll_to(self.scroll_offset.saturating_sub(1)),
            KeyAction::ScrollDown => self.scroll_to(self.scroll_offset.saturating_add(1)),
            KeyAction::PageUp => {
                self.scroll_to(self.scroll_offset.saturating_sub(self.page_rows))
            }
            KeyAction::PageDown => {
                self.scroll_to(self.scroll_offset.saturating_add(self.page_rows))
            }
            KeyAction::Ignore => {}
        }
        false
    }

    // Bounded by the last composed frame
    fn scroll_to(&mut self, offset: usize) {
        self.scroll_offset = offset.min(self.max_scroll);
    }

    /// Compose the full frame for the current terminal size.
    ///
    /// Panels that do not fit scroll between the pinned header and footer.
    pub fn render(&mut self, now: DateTime<Local>) -> String {
        if let Some(family) = self.legacy_family {
            return render_legacy(family, self.poller.devices().map(|(d, _)| d), now);
        }

        let view = DashboardView {
            devices: self.poller.devices().collect(),
            history: &self.history,
            degraded: &self.last_report.degraded,
            options: PanelOptions {
                glyphs: self.glyphs,
                show_per_core: self.show_per_core,
                graph_width: AppConfig::GRAPH_WIDTH
                    .min((self.cols as usize).saturating_sub(2).max(1)),
                graph_height: AppConfig::GRAPH_HEIGHT,
            },
            now,
            scroll_offset: self.scroll_offset,
        };
        let frame = render_dashboard(&view, self.rows as usize);

        self.scroll_offset = frame.scroll_offset;
        self.max_scroll = frame.max_scroll;
        self.page_rows = frame.body_rows;
        frame.text
    }

    /// Release every backend handle.
    pub fn shutdown(&mut self) {
        self.poller.release_all();
    }
}

/// Drive `session` until quit or `shutdown` is raised.
///
/// Input is polled in short slices so the quit key is noticed well inside
/// one poll interval.
pub async fn run_session(
    session: &mut Session,
    interval: Duration,
    shutdown: &AtomicBool,
) -> Result<()> {
    let (cols, rows) = size().unwrap_or((
        AppConfig::DEFAULT_TERMINAL_WIDTH,
        AppConfig::DEFAULT_TERMINAL_HEIGHT,
    ));
    let mut renderer = DifferentialRenderer::new(rows);
    session.resize(cols, rows);
    let mut out = stdout();

    session.tick();
    let mut last_tick = Instant::now();
    let min_render_interval = Duration::from_millis(AppConfig::MIN_RENDER_INTERVAL_MS);
    let mut last_render: Option<Instant> = None;
    let mut dirty = true;

    while !shutdown.load(Ordering::Relaxed) {
        if dirty && last_render.map_or(true, |at| at.elapsed() >= min_render_interval) {
            let frame = session.render(Local::now());
            renderer.render_differential(&mut out, &frame)?;
            last_render = Some(Instant::now());
            dirty = false;
        }

        if event::poll(Duration::from_millis(AppConfig::EVENT_POLL_TIMEOUT_MS))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if session.apply(handle_key_event(key_event)) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(width, height) => {
                    session.resize(width, height);
                    renderer.resize(height);
                    renderer.force_clear(&mut out)?;
                    dirty = true;
                }
                _ => {}
            }
        }

        if last_tick.elapsed() >= interval {
            session.tick();
            last_tick = Instant::now();
            dirty = true;
        }

        tokio::task::yield_now().await;
    }

    out.flush()?;
    Ok(())
}
