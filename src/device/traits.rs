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

use crate::device::{Device, DeviceFamily};
use crate::error::Result;

/// Capability set shared by every device family.
///
/// A backend owns its devices. `discover` populates identities and empty
/// snapshots, `refresh` overwrites the snapshots in place, and `release`
/// drops any held handles. `release` must be idempotent and safe to call
/// when `discover` never succeeded.
pub trait Backend: Send {
    fn family(&self) -> DeviceFamily;

    /// Enumerate devices. Returns `Error::BackendUnavailable` when the
    /// access path does not exist on this host.
    fn discover(&mut self) -> Result<()>;

    /// Update every device snapshot. A failing device does not stop its
    /// siblings from being updated.
    fn refresh(&mut self) -> Result<()>;

    fn release(&mut self);

    fn devices(&self) -> &[Device];

    /// True for backends that generate values instead of reading hardware.
    fn is_synthetic(&self) -> bool {
        false
    }
}
