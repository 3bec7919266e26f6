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

//! Best-effort reads of kernel pseudo-files.
//!
//! Kernel paths differ between SoC revisions and kernel versions, so most
//! readings are found by walking an ordered list of candidate paths and
//! keeping the first one that reads and parses. Candidate lists live next
//! to the backend that uses them as plain `&[&str]` tables.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Root that absolute kernel paths are resolved against.
///
/// `/` on a real host; a temporary directory in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsRoot {
    root: PathBuf,
}

impl Default for SysfsRoot {
    fn default() -> Self {
        Self::host()
    }
}

impl SysfsRoot {
    pub fn host() -> Self {
        Self {
            root: PathBuf::from("/"),
        }
    }

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    pub fn read(&self, path: &str) -> Option<String> {
        read_trimmed(&self.resolve(path))
    }

    /// Entries of a directory in name order; empty if it cannot be listed.
    pub fn list_dir(&self, path: &str) -> Vec<PathBuf> {
        list_dir_sorted(&self.resolve(path))
    }
}

/// Read a file and strip surrounding whitespace and device-tree NULs.
///
/// Returns `None` when the file is missing, unreadable or empty.
pub fn read_trimmed(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\0');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Directory entries ordered the way the kernel numbers them, so
/// `thermal_zone2` comes before `thermal_zone10`.
pub fn list_dir_sorted(path: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = match fs::read_dir(path) {
        Ok(dir) => dir.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    };
    entries.sort_by_cached_key(|entry| {
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        numbered_key(&name)
    });
    entries
}

/// Sort key: the name without its trailing digits, then those digits as a
/// number, then the full name.
fn numbered_key(name: &str) -> (String, Option<u64>, String) {
    let prefix = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[prefix.len()..].parse::<u64>().ok();
    (prefix.to_string(), number, name.to_string())
}

/// Walk `candidates` in order and return the first value that both reads
/// and parses.
pub fn probe_first<T, F>(root: &SysfsRoot, candidates: &[&str], parse: F) -> Option<T>
where
    F: Fn(&str) -> Option<T>,
{
    candidates
        .iter()
        .find_map(|candidate| root.read(candidate).and_then(|raw| parse(&raw)))
}

pub fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse::<T>().ok()
}

/// Parse a value that may be written either as an integer or a float.
pub fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &TempDir, rel: &str, content: &str) {
        let path = root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_resolve_strips_leading_slash() {
        let root = SysfsRoot::new("/tmp/fake");
        assert_eq!(
            root.resolve("/sys/devices/gpu.0/load"),
            PathBuf::from("/tmp/fake/sys/devices/gpu.0/load")
        );
        assert_eq!(SysfsRoot::host().resolve("/proc/meminfo"), PathBuf::from("/proc/meminfo"));
    }

    #[test]
    fn test_read_trims_nul_and_whitespace() {
        let dir = TempDir::new().unwrap();
        write(&dir, "proc/device-tree/model", "NVIDIA Jetson Orin Nano\0");
        write(&dir, "empty", "  \n");
        let root = SysfsRoot::new(dir.path());

        assert_eq!(
            root.read("/proc/device-tree/model").as_deref(),
            Some("NVIDIA Jetson Orin Nano")
        );
        assert_eq!(root.read("/empty"), None);
        assert_eq!(root.read("/missing"), None);
    }

    #[test]
    fn test_probe_first_skips_missing_and_unparseable() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b/load", "garbage");
        write(&dir, "c/load", "420");
        write(&dir, "d/load", "999");
        let root = SysfsRoot::new(dir.path());

        let value = probe_first(&root, &["/a/load", "/b/load", "/c/load", "/d/load"], |raw| {
            parse_number::<u32>(raw)
        });
        assert_eq!(value, Some(420));

        let none: Option<u32> = probe_first(&root, &["/a/load"], parse_number::<u32>);
        assert_eq!(none, None);
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("500"), Some(500.0));
        assert_eq!(parse_float(" 12.5 "), Some(12.5));
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("x"), None);
    }

    #[test]
    fn test_list_dir_sorted() {
        let dir = TempDir::new().unwrap();
        write(&dir, "zones/thermal_zone1/type", "b");
        write(&dir, "zones/thermal_zone0/type", "a");
        let root = SysfsRoot::new(dir.path());

        let names: Vec<String> = root
            .list_dir("/zones")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["thermal_zone0", "thermal_zone1"]);
        assert!(root.list_dir("/nope").is_empty());
    }

    #[test]
    fn test_list_dir_orders_numbered_entries_numerically() {
        let dir = TempDir::new().unwrap();
        for zone in ["thermal_zone10", "thermal_zone2", "thermal_zone1", "hwmon11", "hwmon3"] {
            write(&dir, &format!("zones/{zone}/type"), "x");
        }
        let root = SysfsRoot::new(dir.path());

        let names: Vec<String> = root
            .list_dir("/zones")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["hwmon3", "hwmon11", "thermal_zone1", "thermal_zone2", "thermal_zone10"]
        );
    }
}
