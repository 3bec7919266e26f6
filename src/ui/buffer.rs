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
    cursor, queue,
    style::Print,
    terminal::{Clear, ClearType},
};

/// In-memory frame; renderers queue into it, then it is flushed in one go.
pub struct BufferWriter {
    buffer: String,
    line_count: usize,
}

impl Default for BufferWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferWriter {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(64 * 1024),
            line_count: 0,
        }
    }

    pub fn get_buffer(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = std::str::from_utf8(buf)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid UTF-8"))?;

        self.line_count += s.matches('\n').count();
        self.buffer.push_str(s);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Differential renderer that only rewrites lines that changed since the
/// previous frame, which avoids flicker on every tick.
pub struct DifferentialRenderer {
    previous_lines: Vec<String>,
    screen_height: usize,
}

impl DifferentialRenderer {
    pub fn new(screen_height: u16) -> Self {
        Self {
            previous_lines: vec![String::new(); screen_height as usize],
            screen_height: screen_height as usize,
        }
    }

    pub fn resize(&mut self, screen_height: u16) {
        self.screen_height = screen_height as usize;
        self.previous_lines
            .resize(self.screen_height, String::new());
    }

    /// Write `content` to `out`, touching only lines that differ.
    pub fn render_differential<W: Write>(&mut self, out: &mut W, content: &str) -> io::Result<()> {
        let current_lines: Vec<String> = content.lines().map(|line| line.to_string()).collect();
        let visible = current_lines.len().min(self.screen_height);

        for (line_num, current_line) in current_lines.iter().enumerate().take(visible) {
            if self.previous_lines.get(line_num) != Some(current_line) {
                queue!(
                    out,
                    cursor::MoveTo(0, line_num as u16),
                    Clear(ClearType::CurrentLine),
                    Print(current_line)
                )?;
            }
        }

        // Blank lines the new frame no longer covers
        for line_num in visible..self.previous_lines.len().min(self.screen_height) {
            if !self.previous_lines[line_num].is_empty() {
                queue!(
                    out,
                    cursor::MoveTo(0, line_num as u16),
                    Clear(ClearType::CurrentLine)
                )?;
            }
        }

        out.flush()?;

        self.previous_lines.clear();
        self.previous_lines
            .extend(current_lines.into_iter().take(visible));
        self.previous_lines
            .resize(self.screen_height, String::new());
        Ok(())
    }

    /// Clear the whole screen, e.g. on resize.
    pub fn force_clear<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, Clear(ClearType::All))?;
        out.flush()?;

        self.previous_lines.clear();
        self.previous_lines
            .resize(self.screen_height, String::new());
        Ok(())
    }
}
