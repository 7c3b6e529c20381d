//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! String-based path helpers.
//!
//! Dependency identifiers and install paths are handled as '/'-separated
//! strings on every host so that a plan computed for one platform reads the
//! same regardless of where it was computed.

use std::path::Path;

/// Joins `rel` onto `base` with exactly one '/' between them.
///
/// Empty components are skipped.
pub fn join(base: &str, rel: &str) -> String {
    if base.is_empty() == true {
        return rel.to_string();
    }
    if rel.is_empty() == true {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        rel.trim_start_matches('/')
    )
}

/// Returns the last component of `path`.
pub fn file_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, name)) => name,
        None => path,
    }
}

/// Returns the file name of `path` without any of its suffixes.
pub fn base_name(path: &str) -> &str {
    let name = file_name(path);
    match name.split_once('.') {
        Some((base, _)) => base,
        None => name,
    }
}

/// Returns everything before the last component of `path`.
pub fn parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    }
}

/// Converts a filesystem path into the '/'-separated string form.
pub fn into_std_str<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().display().to_string().replace('\\', "/")
}
