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

//! Reader for the `qmldir` module manifest.

use crate::core::platform::Platform;
use crate::util::anyerror::{Fault, FileFault};
use crate::util::filesystem;
use regex::Regex;
use serde_derive::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

pub const QMLDIR: &str = "qmldir";

/// Line prefixes that are recognized but carry nothing needed for deployment.
const IGNORED: [&str; 5] = [
    "linktarget",
    "prefer",
    "classname",
    "designersupported",
    "system",
];

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Kind {
    Module,
    Plugin,
    Depends,
    Import,
    TypeInfo,
    Internal,
    Object,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Module => "module",
            Self::Plugin => "plugin",
            Self::Depends => "depends",
            Self::Import => "import",
            Self::TypeInfo => "typeinfo",
            Self::Internal => "internal",
            Self::Object => "object declaration",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("cannot parse the {kind} statement: {line:?}")]
pub struct GrammarError {
    kind: Kind,
    line: String,
}

impl GrammarError {
    fn new(kind: Kind, line: &str) -> Self {
        Self {
            kind: kind,
            line: line.to_string(),
        }
    }

    pub fn get_kind(&self) -> Kind {
        self.kind
    }

    pub fn get_line(&self) -> &str {
        &self.line
    }
}

/// The compiled sub-pattern of every statement kind.
struct Grammar {
    module: Regex,
    plugin: Regex,
    depends: Regex,
    import: Regex,
    typeinfo: Regex,
    internal: Regex,
    object: Regex,
}

impl Grammar {
    fn get() -> &'static Grammar {
        static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
        GRAMMAR.get_or_init(|| {
            let compile = |p: &str| Regex::new(p).expect("qmldir grammar pattern is valid");
            Grammar {
                module: compile(r"^module\s+([\w.]+)?$"),
                plugin: compile(r"^(optional\s+)?plugin\s+(\w+)(?:\s+([\w/]+))?$"),
                depends: compile(r"^depends\s+([\w.]+)(?:\s+(auto|\d+(?:\.\d+)*))?$"),
                import: compile(
                    r"^(?:default\s+)?(optional\s+)?import\s+([\w.]+)\s+(auto|\d+(?:\.\d+)*)$",
                ),
                typeinfo: compile(r"^typeinfo\s+(.+)$"),
                internal: compile(r"^internal\s+(\w+)\s+(.+)$"),
                object: compile(r"^(singleton\s+)?(\w+)\s+(\d+\.\d+)\s+(.+)$"),
            }
        })
    }
}

/// Removes a leading `word` and the whitespace after it.
///
/// Returns `None` if `line` does not start with `word` followed by whitespace.
fn strip_word<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(word)?;
    let trimmed = rest.trim_start();
    match trimmed.len() < rest.len() {
        true => Some(trimmed),
        false => None,
    }
}

/// One line of a `qmldir` file.
#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    /// Blank lines, comments, and keywords that are not needed.
    Skip,
    Module {
        name: String,
    },
    Plugin {
        optional: bool,
        name: String,
        path: Option<String>,
    },
    Depends {
        name: String,
        version: Option<String>,
    },
    Import {
        optional: bool,
        name: String,
        version: String,
    },
    TypeInfo {
        path: String,
    },
    Internal {
        name: String,
        path: String,
    },
    Object {
        singleton: bool,
        name: String,
        version: String,
        path: String,
    },
}

impl Statement {
    /// Decides which statement kind `line` claims to be by its leading keyword.
    ///
    /// Returns `None` for lines that are skipped entirely.
    fn classify(line: &str) -> Option<Kind> {
        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }
        if IGNORED.iter().any(|k| line.starts_with(k)) {
            return None;
        }
        let unqualified = strip_word(line, "default").unwrap_or(line);
        let unqualified = strip_word(unqualified, "optional").unwrap_or(unqualified);

        let kind = if line.starts_with("module") {
            Kind::Module
        } else if line.starts_with("plugin")
            || strip_word(line, "optional").is_some_and(|r| r.starts_with("plugin"))
        {
            Kind::Plugin
        } else if line.starts_with("depends") {
            Kind::Depends
        } else if unqualified.starts_with("import") {
            Kind::Import
        } else if line.starts_with("typeinfo") {
            Kind::TypeInfo
        } else if line.starts_with("internal") {
            Kind::Internal
        } else {
            Kind::Object
        };
        Some(kind)
    }

    fn parse_module(line: &str) -> Option<Self> {
        let caps = Grammar::get().module.captures(line)?;
        Some(Self::Module {
            name: caps.get(1).map_or("", |m| m.as_str()).to_string(),
        })
    }

    fn parse_plugin(line: &str) -> Option<Self> {
        let caps = Grammar::get().plugin.captures(line)?;
        Some(Self::Plugin {
            optional: caps.get(1).is_some(),
            name: caps[2].to_string(),
            path: caps.get(3).map(|m| m.as_str().to_string()),
        })
    }

    fn parse_depends(line: &str) -> Option<Self> {
        let caps = Grammar::get().depends.captures(line)?;
        Some(Self::Depends {
            name: caps[1].to_string(),
            version: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }

    fn parse_import(line: &str) -> Option<Self> {
        let caps = Grammar::get().import.captures(line)?;
        Some(Self::Import {
            optional: caps.get(1).is_some(),
            name: caps[2].to_string(),
            version: caps[3].to_string(),
        })
    }

    fn parse_typeinfo(line: &str) -> Option<Self> {
        let caps = Grammar::get().typeinfo.captures(line)?;
        Some(Self::TypeInfo {
            path: caps[1].to_string(),
        })
    }

    fn parse_internal(line: &str) -> Option<Self> {
        let caps = Grammar::get().internal.captures(line)?;
        Some(Self::Internal {
            name: caps[1].to_string(),
            path: caps[2].to_string(),
        })
    }

    fn parse_object(line: &str) -> Option<Self> {
        let caps = Grammar::get().object.captures(line)?;
        Some(Self::Object {
            singleton: caps.get(1).is_some(),
            name: caps[2].to_string(),
            version: caps[3].to_string(),
            path: caps[4].to_string(),
        })
    }
}

impl FromStr for Statement {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match Self::classify(s) {
            Some(k) => k,
            None => return Ok(Self::Skip),
        };
        let stmt = match kind {
            Kind::Module => Self::parse_module(s),
            Kind::Plugin => Self::parse_plugin(s),
            Kind::Depends => Self::parse_depends(s),
            Kind::Import => Self::parse_import(s),
            Kind::TypeInfo => Self::parse_typeinfo(s),
            Kind::Internal => Self::parse_internal(s),
            Kind::Object => Self::parse_object(s),
        };
        stmt.ok_or_else(|| GrammarError::new(kind, s))
    }
}

/// Everything a `qmldir` file says about its module.
#[derive(Debug, PartialEq, Default, Serialize)]
pub struct ModuleDescriptor {
    module: String,
    plugins: BTreeSet<String>,
    depends: BTreeSet<String>,
    imports: BTreeSet<String>,
    optional_imports: BTreeSet<String>,
    files: BTreeSet<String>,
}

impl ModuleDescriptor {
    /// Parses the manifest `text`, naming plugin files for `platform`.
    ///
    /// Stops at the first line that fails its statement's pattern.
    pub fn parse(text: &str, platform: &dyn Platform) -> Result<Self, GrammarError> {
        let mut descriptor = Self::default();
        for line in text.lines() {
            descriptor.apply(line.parse::<Statement>()?, platform);
        }
        Ok(descriptor)
    }

    /// Reads and parses the manifest file at `path`.
    pub fn from_file(path: &Path, platform: &dyn Platform) -> Result<Self, Fault> {
        let text = std::fs::read_to_string(path).map_err(|e| FileFault::new(path, e))?;
        let descriptor = Self::parse(&text, platform).map_err(|e| FileFault::new(path, e))?;
        tracing::debug!("parsed {} from {}", descriptor, path.display());
        Ok(descriptor)
    }

    fn apply(&mut self, stmt: Statement, platform: &dyn Platform) {
        match stmt {
            Statement::Skip => (),
            // a later declaration replaces an earlier one
            Statement::Module { name } => self.module = name,
            Statement::Plugin { name, path, .. } => {
                let file = platform.plugin_file_name(&name);
                self.plugins.insert(match path {
                    Some(dir) => filesystem::join(&dir, &file),
                    None => file,
                });
            }
            Statement::Depends { name, .. } => {
                self.depends.insert(name);
            }
            Statement::Import {
                optional: true,
                name,
                ..
            } => {
                self.optional_imports.insert(name);
            }
            Statement::Import { name, .. } => {
                self.imports.insert(name);
            }
            Statement::TypeInfo { path }
            | Statement::Internal { path, .. }
            | Statement::Object { path, .. } => {
                self.files.insert(path);
            }
        }
    }

    pub fn get_module(&self) -> &str {
        &self.module
    }

    pub fn get_plugins(&self) -> &BTreeSet<String> {
        &self.plugins
    }

    pub fn get_depends(&self) -> &BTreeSet<String> {
        &self.depends
    }

    pub fn get_imports(&self) -> &BTreeSet<String> {
        &self.imports
    }

    pub fn get_optional_imports(&self) -> &BTreeSet<String> {
        &self.optional_imports
    }

    pub fn get_files(&self) -> &BTreeSet<String> {
        &self.files
    }
}

impl Display for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = |set: &BTreeSet<String>| {
            set.iter()
                .fold(String::new(), |acc, x| acc + "  " + x.as_str() + "\n")
        };
        write!(
            f,
            "\
Module: {}
Plugins:
{}Depends:
{}Imports:
{}Optional imports:
{}Files:
{}",
            self.module,
            list(&self.plugins),
            list(&self.depends),
            list(&self.imports),
            list(&self.optional_imports),
            list(&self.files),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::platform::{MacOs, Windows};

    const QTQUICK_CONTROLS: &str = "\
module QtQuick.Controls
linktarget Qt6::qtquickcontrols2plugin
optional plugin qtquickcontrols2plugin
classname QtQuickControls2Plugin
designersupported
typeinfo plugins.qmltypes
depends QtQuick.Controls.impl auto
# Fusion is the fallback style
import QtQuick.Controls.Fusion auto
default import QtQuick.Controls.Basic auto
optional import QtQuick.Controls.Material 6.0
prefer :/qt-project.org/imports/QtQuick/Controls/
";

    #[test]
    fn statement_kinds() {
        assert_eq!(
            Statement::from_str("module QtQuick.Controls").unwrap(),
            Statement::Module { name: String::from("QtQuick.Controls") }
        );
        assert_eq!(
            Statement::from_str("optional plugin qtquick2plugin plugins/quick").unwrap(),
            Statement::Plugin {
                optional: true,
                name: String::from("qtquick2plugin"),
                path: Some(String::from("plugins/quick")),
            }
        );
        assert_eq!(
            Statement::from_str("depends QtQuick.Controls auto").unwrap(),
            Statement::Depends {
                name: String::from("QtQuick.Controls"),
                version: Some(String::from("auto")),
            }
        );
        assert_eq!(
            Statement::from_str("default optional import QtQml.Models 6.0").unwrap(),
            Statement::Import {
                optional: true,
                name: String::from("QtQml.Models"),
                version: String::from("6.0"),
            }
        );
        assert_eq!(
            Statement::from_str("internal Overlay impl/Overlay.qml").unwrap(),
            Statement::Internal {
                name: String::from("Overlay"),
                path: String::from("impl/Overlay.qml"),
            }
        );
        assert_eq!(
            Statement::from_str("singleton Theme 1.0 Theme.qml").unwrap(),
            Statement::Object {
                singleton: true,
                name: String::from("Theme"),
                version: String::from("1.0"),
                path: String::from("Theme.qml"),
            }
        );
        assert_eq!(Statement::from_str("").unwrap(), Statement::Skip);
        assert_eq!(Statement::from_str("   ").unwrap(), Statement::Skip);
        assert_eq!(Statement::from_str("# comment").unwrap(), Statement::Skip);
        assert_eq!(Statement::from_str("system QtQml").unwrap(), Statement::Skip);
    }

    #[test]
    fn module_name_may_be_absent() {
        assert_eq!(
            Statement::from_str("module ").unwrap(),
            Statement::Module { name: String::new() }
        );
    }

    #[test]
    fn grammar_failures() {
        let err = Statement::from_str("module !!").unwrap_err();
        assert_eq!(err.get_kind(), Kind::Module);
        assert_eq!(err.get_line(), "module !!");
        assert!(Statement::from_str("module").is_err());

        let err = Statement::from_str("plugin").unwrap_err();
        assert_eq!(err.get_kind(), Kind::Plugin);
        assert_eq!(
            err.to_string(),
            "cannot parse the plugin statement: \"plugin\""
        );

        assert_eq!(
            Statement::from_str("import QtQml").unwrap_err().get_kind(),
            Kind::Import
        );
        assert_eq!(
            Statement::from_str("depends QtQml 6.x").unwrap_err().get_kind(),
            Kind::Depends
        );
        assert_eq!(
            Statement::from_str("internal Overlay").unwrap_err().get_kind(),
            Kind::Internal
        );
        assert_eq!(
            Statement::from_str("Button Button.qml").unwrap_err().get_kind(),
            Kind::Object
        );
    }

    #[test]
    fn plugin_files_per_platform() {
        let mac = MacOs::new("Qt");
        let desc = ModuleDescriptor::parse("plugin platforminputcontextplugin", &mac).unwrap();
        assert_eq!(
            desc.get_plugins(),
            &BTreeSet::from([String::from("libplatforminputcontextplugin.dylib")])
        );

        let win = Windows::new("Qt6");
        let desc = ModuleDescriptor::parse("plugin platforminputcontextplugin", &win).unwrap();
        assert_eq!(
            desc.get_plugins(),
            &BTreeSet::from([String::from("platforminputcontextplugin.dll")])
        );

        let win = Windows::new("Qt6").debug(true);
        let desc = ModuleDescriptor::parse("plugin qtquick2plugin plugins/quick", &win).unwrap();
        assert_eq!(
            desc.get_plugins(),
            &BTreeSet::from([String::from("plugins/quick/qtquick2plugind.dll")])
        );
    }

    #[test]
    fn parse_full_manifest() {
        let mac = MacOs::new("Qt");
        let desc = ModuleDescriptor::parse(QTQUICK_CONTROLS, &mac).unwrap();
        assert_eq!(desc.get_module(), "QtQuick.Controls");
        assert_eq!(
            desc.get_plugins(),
            &BTreeSet::from([String::from("libqtquickcontrols2plugin.dylib")])
        );
        assert_eq!(
            desc.get_depends(),
            &BTreeSet::from([String::from("QtQuick.Controls.impl")])
        );
        assert_eq!(
            desc.get_imports(),
            &BTreeSet::from([
                String::from("QtQuick.Controls.Basic"),
                String::from("QtQuick.Controls.Fusion"),
            ])
        );
        assert_eq!(
            desc.get_optional_imports(),
            &BTreeSet::from([String::from("QtQuick.Controls.Material")])
        );
        assert_eq!(
            desc.get_files(),
            &BTreeSet::from([String::from("plugins.qmltypes")])
        );
    }

    #[test]
    fn component_files_collapse() {
        let mac = MacOs::new("Qt");
        let text = "\
Button 6.0 Button.qml
Button 6.2 Button.qml
internal ButtonPanel impl/ButtonPanel.qml
typeinfo controls.qmltypes
";
        let desc = ModuleDescriptor::parse(text, &mac).unwrap();
        assert_eq!(
            desc.get_files(),
            &BTreeSet::from([
                String::from("Button.qml"),
                String::from("controls.qmltypes"),
                String::from("impl/ButtonPanel.qml"),
            ])
        );
    }

    #[test]
    fn later_module_line_wins() {
        let mac = MacOs::new("Qt");
        let desc = ModuleDescriptor::parse("module First\nmodule Second\r\n", &mac).unwrap();
        assert_eq!(desc.get_module(), "Second");
    }

    #[test]
    fn malformed_line_fails_whole_manifest() {
        let mac = MacOs::new("Qt");
        let err = ModuleDescriptor::parse("module QtQml\nplugin\nimport QtCore 6.0\n", &mac)
            .unwrap_err();
        assert_eq!(err.get_line(), "plugin");
    }

    #[test]
    fn from_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(QMLDIR);
        std::fs::write(&path, "module QtQml\ntypeinfo\n").unwrap();
        let mac = MacOs::new("Qt");
        let err = ModuleDescriptor::from_file(&path, &mac).unwrap_err();
        assert!(err.to_string().starts_with("failed to read file"));

        std::fs::write(&path, "module QtQml\ntypeinfo qml.qmltypes\n").unwrap();
        let desc = ModuleDescriptor::from_file(&path, &mac).unwrap();
        assert_eq!(desc.get_module(), "QtQml");
    }
}
