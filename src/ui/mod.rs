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

pub mod buffer;
pub mod dashboard;
pub mod graph;
pub mod legacy;
pub mod panels;
pub mod text;
pub mod theme;

#[cfg(test)]
pub mod test_utils;

pub use buffer::{BufferWriter, DifferentialRenderer};
pub use dashboard::{render_dashboard, DashboardView, NO_HARDWARE_MESSAGE};
pub use graph::{GlyphSet, GraphRow};
pub use legacy::render_legacy;
pub use panels::PanelOptions;
