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

//! Discovery of the QML modules an application imports.

use crate::core::platform::Platform;
use crate::core::tool::{Process, ToolCommand};
use crate::util::anyerror::{Fault, FileFault};
use crate::util::filesystem;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

pub const IMPORT_SCANNER: &str = "qmlimportscanner";

/// A module import that ships a plugin with the application.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QmlImport {
    name: String,
    path: String,
}

impl QmlImport {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    /// The dotted module name.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The plugin file of the module.
    pub fn get_path(&self) -> &str {
        &self.path
    }
}

/// The fields of one scanner entry that deployment cares about.
///
/// The scanner reports more (`type`, `classname`, `relativePath`, ...), which
/// are ignored.
#[derive(Debug, Deserialize)]
struct ScannedEntry {
    name: Option<String>,
    path: Option<String>,
    plugin: Option<String>,
}

/// Keeps the entries of the scanner's JSON `output` that name a plugin of the
/// platform's namespace.
pub fn filter_imports(output: &str, platform: &dyn Platform) -> Result<Vec<QmlImport>, Fault> {
    let entries: Vec<ScannedEntry> = serde_json::from_str(output)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let (name, path, plugin) = match (entry.name, entry.path, entry.plugin) {
                (Some(n), Some(p), Some(l)) => (n, p, l),
                _ => return None,
            };
            if name.starts_with(platform.namespace()) == false {
                return None;
            }
            let file = filesystem::join(&path, &platform.plugin_file_name(&plugin));
            Some(QmlImport { name: name, path: file })
        })
        .collect())
}

/// Invocation settings for the import scanner tool.
#[derive(Debug, PartialEq, Clone)]
pub struct ImportScanner {
    program: String,
    import_path: String,
}

impl ImportScanner {
    pub fn new(import_path: &str) -> Self {
        Self {
            program: String::from(IMPORT_SCANNER),
            import_path: import_path.to_string(),
        }
    }

    /// Sets the scanner executable.
    pub fn program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn command<S: AsRef<str>>(&self, qrc_files: &[S]) -> ToolCommand {
        ToolCommand::new(&self.program)
            .arg("-qrcFiles")
            .args(qrc_files)
            .arg("-importPath")
            .arg(&self.import_path)
    }

    /// Runs the scanner over the resource files and returns the deployable
    /// imports it found.
    pub fn scan<S: AsRef<str>>(
        &self,
        process: &dyn Process,
        platform: &dyn Platform,
        qrc_files: &[S],
    ) -> Result<Vec<QmlImport>, Fault> {
        let output = process.capture(&self.command(qrc_files))?;
        let imports = filter_imports(&output, platform)?;
        tracing::info!("found {} deployable imports", imports.len());
        Ok(imports)
    }
}

/// Loads a previously written import list.
pub fn read_imports(path: &Path) -> Result<Vec<QmlImport>, Fault> {
    let text = std::fs::read_to_string(path).map_err(|e| FileFault::new(path, e))?;
    let imports: Vec<QmlImport> =
        serde_json::from_str(&text).map_err(|e| FileFault::new(path, e))?;
    Ok(imports)
}

pub fn write_imports(path: &Path, imports: &[QmlImport]) -> Result<(), Fault> {
    let text = serde_json::to_string_pretty(imports)?;
    std::fs::write(path, text + "\n").map_err(|e| FileFault::new(path, e))?;
    Ok(())
}
