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

//! Readers for the fixed text formats of the dependency inspection tools.

use crate::error::Error;
use regex::Regex;
use std::sync::OnceLock;

pub const OTOOL: &str = "otool";
pub const DUMPBIN: &str = "dumpbin";

/// The line that opens the dependency block in `dumpbin /dependents` output.
const DUMPBIN_MARKER: &str = "  Image has the following dependencies:";

fn otool_entry() -> &'static Regex {
    static ENTRY: OnceLock<Regex> = OnceLock::new();
    ENTRY.get_or_init(|| {
        Regex::new(
            r"^\s+(.+) \(compatibility version \d+\.\d+\.\d+, current version \d+\.\d+\.\d+\)$",
        )
        .expect("otool entry pattern is valid")
    })
}

/// Parses the `otool -L` output for `binary`.
///
/// The output is expected in the following format (example):
/// ```text
/// ../Imports/Qt/labs/platform/liblabsplatformplugin.dylib:
///     @rpath/QtLabsPlatform.framework/Versions/A/QtLabsPlatform (compatibility version 6.0.0, current version 6.8.0)
///     @rpath/QtQml.framework/Versions/A/QtQml (compatibility version 6.0.0, current version 6.8.0)
///     /usr/lib/libc++.1.dylib (compatibility version 1.0.0, current version 1700.255.0)
/// ```
///
/// Every listed dependency is returned in order of appearance. Lines that do
/// not fit the entry format are reported and skipped.
pub fn parse_otool(binary: &str, output: &str) -> Result<Vec<String>, Error> {
    let mut lines = output.lines().skip_while(|l| l.trim().is_empty());
    // the first line restates the library being explored
    match lines.next() {
        Some(header) => {
            if header.starts_with(binary) == false {
                return Err(Error::FormatMismatch(
                    OTOOL,
                    format!("expected first line to name {:?} but found {:?}", binary, header),
                ));
            }
        }
        None => {
            return Err(Error::FormatMismatch(
                OTOOL,
                format!("no output was produced for {:?}", binary),
            ))
        }
    }

    let mut deps = Vec::new();
    for line in lines {
        match otool_entry().captures(line) {
            Some(caps) => deps.push(caps[1].to_string()),
            None => {
                if line.trim().is_empty() == false {
                    tracing::warn!("unmatched dependency of {}: {}", binary, line.trim());
                }
            }
        }
    }
    Ok(deps)
}

/// Parses the `dumpbin /dependents` output, keeping only the files whose name
/// begins with `namespace`.
///
/// The output is expected in the following format (example):
/// ```text
/// Dump of file .\Qt6Qml.dll
///
/// File Type: DLL
///
///   Image has the following dependencies:
///
///     Qt6Network.dll
///     SHELL32.dll
///     Qt6Core.dll
///     KERNEL32.dll
///
///   Summary
///
///        20000 .data
/// ```
pub fn parse_dumpbin(output: &str, namespace: &str) -> Result<Vec<String>, Error> {
    let lines: Vec<&str> = output.lines().collect();

    let marker = match lines.iter().position(|l| l.trim_end() == DUMPBIN_MARKER) {
        Some(i) => i,
        None => {
            return Err(Error::FormatMismatch(
                DUMPBIN,
                format!("missing the line {:?}", DUMPBIN_MARKER.trim()),
            ))
        }
    };
    // the block starts after the blank line following the marker and runs
    // until the next blank line
    Ok(lines
        .iter()
        .skip(marker + 2)
        .take_while(|l| l.trim().is_empty() == false)
        .map(|l| l.trim())
        .filter(|l| l.starts_with(namespace))
        .map(|l| l.to_string())
        .collect())
}
