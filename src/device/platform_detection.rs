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

use crate::device::common::SysfsRoot;
use crate::error::{Error, Result};

pub const TEGRA_RELEASE_PATH: &str = "/etc/nv_tegra_release";
pub const DEVICE_TREE_MODEL_PATH: &str = "/proc/device-tree/model";

pub fn get_os_type() -> &'static str {
    std::env::consts::OS
}

/// Fail with `UnsupportedPlatform` on anything but Linux.
pub fn ensure_supported_os() -> Result<()> {
    match get_os_type() {
        "linux" => Ok(()),
        other => Err(Error::UnsupportedPlatform(format!(
            "only Linux is supported for now (current OS: {other})"
        ))),
    }
}

pub fn is_jetson(root: &SysfsRoot) -> bool {
    if root.exists(TEGRA_RELEASE_PATH) {
        return true;
    }

    if let Some(model) = root.read(DEVICE_TREE_MODEL_PATH) {
        let model = model.to_lowercase();
        return model.contains("jetson") || (model.contains("nvidia") && model.contains("tegra"));
    }

    false
}
