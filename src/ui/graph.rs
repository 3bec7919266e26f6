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

//! Bar graph of a sample series on a character grid.
//!
//! Each column is one sample, each row one unit of bar height. A row
//! partially covered by the top of a bar gets a partial glyph from the
//! active glyph set. Rows are colored by their position, not by value.

use clap::ValueEnum;
use crossterm::style::Color;
use serde::{Deserialize, Serialize};

const BLOCK_GLYPHS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const BRAILLE_GLYPHS: [char; 9] = [' ', '⢀', '⢠', '⢰', '⢸', '⣀', '⣄', '⣤', '⣴'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphSet {
    /// Finer sub-cell braille dots
    Braille,
    /// Coarse eighth blocks
    Block,
}

impl GlyphSet {
    pub fn glyphs(self) -> &'static [char] {
        match self {
            GlyphSet::Block => &BLOCK_GLYPHS,
            GlyphSet::Braille => &BRAILLE_GLYPHS,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            GlyphSet::Block => GlyphSet::Braille,
            GlyphSet::Braille => GlyphSet::Block,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GlyphSet::Block => "block",
            GlyphSet::Braille => "braille",
        }
    }

    pub fn full(self) -> char {
        let glyphs = self.glyphs();
        glyphs[glyphs.len() - 1]
    }
}

/// One rendered row and the ramp color it is drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRow {
    pub text: String,
    pub color: Color,
}

/// Render the most recent `width` samples as `height` rows, top row first.
///
/// Short series are left-padded with zeros. `None` samples leave their
/// column blank, while any non-negative sample gets at least one unit of
/// bar height so a live zero stays visible.
pub fn render(
    series: &[Option<f64>],
    width: usize,
    height: usize,
    max_value: f64,
    glyphs: GlyphSet,
    ramp: &[Color],
) -> Vec<GraphRow> {
    let window = &series[series.len().saturating_sub(width)..];
    let padding = width - window.len();
    let columns: Vec<Option<f64>> = std::iter::repeat(Some(0.0))
        .take(padding)
        .chain(window.iter().copied())
        .collect();

    let bars: Vec<Option<f64>> = columns
        .iter()
        .map(|sample| sample.map(|value| bar_height(value, max_value, height)))
        .collect();

    (0..height)
        .map(|row| {
            let row_from_bottom = height - 1 - row;
            let text = bars
                .iter()
                .map(|bar| match bar {
                    Some(bar) => glyph_for(*bar, row_from_bottom, glyphs),
                    None => ' ',
                })
                .collect();
            GraphRow {
                text,
                color: row_color(row_from_bottom, height, ramp),
            }
        })
        .collect()
}

fn bar_height(value: f64, max_value: f64, height: usize) -> f64 {
    let normalized = if max_value > 0.0 {
        (value / max_value).min(1.0)
    } else {
        0.0
    };
    let bar = normalized * height as f64;
    if bar < 1.0 && value >= 0.0 {
        1.0
    } else {
        bar
    }
}

fn glyph_for(bar: f64, row_from_bottom: usize, glyphs: GlyphSet) -> char {
    let set = glyphs.glyphs();
    let floor = row_from_bottom as f64;
    if bar > floor + 1.0 {
        glyphs.full()
    } else if bar > floor {
        let index = ((bar - floor) * set.len() as f64) as usize;
        set[index.min(set.len() - 1)]
    } else {
        ' '
    }
}

fn row_color(row_from_bottom: usize, height: usize, ramp: &[Color]) -> Color {
    if ramp.is_empty() {
        return Color::Reset;
    }
    let span = height.saturating_sub(1).max(1);
    let index = row_from_bottom * (ramp.len() - 1) / span;
    ramp[index.min(ramp.len() - 1)]
}
