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

use crate::core::layout::LinkedModule;
use crate::core::platform::TargetOs;
use crate::core::scanner::IMPORT_SCANNER;
use crate::core::toolout::{DUMPBIN, OTOOL};
use crate::error::{Error, Hint, LastError};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_FILE: &str = "deploy.toml";

const DEFAULT_NAMESPACE: &str = "Qt";

#[derive(PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Target {
    os: Option<TargetOs>,
    arch: Option<String>,
    debug: Option<bool>,
    framework: Option<bool>,
}

#[derive(PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Toolchain {
    lib_path: Option<String>,
    plugins_path: Option<String>,
    import_path: Option<String>,
    toolchain_path: Option<String>,
    otool: Option<String>,
    dumpbin: Option<String>,
    import_scanner: Option<String>,
}

#[derive(PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    namespace: Option<String>,
    plugins: Option<Vec<String>>,
}

#[derive(PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct Install {
    root: Option<String>,
    contents_path: Option<String>,
    libraries: Option<String>,
    plugins: Option<String>,
    qml: Option<String>,
}

/// Settings for one deployment, read from `deploy.toml`.
#[derive(PartialEq, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    target: Target,
    #[serde(default)]
    toolchain: Toolchain,
    #[serde(default)]
    project: Project,
    #[serde(default)]
    install: Install,
    #[serde(rename = "module", default)]
    modules: Vec<LinkedModule>,
}

fn require<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, Error> {
    match value {
        Some(v) => Ok(v.as_str()),
        None => Err(Error::MissingSetting(key.to_string(), Hint::SetInConfig(key))),
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigNotLoaded(path.to_path_buf(), LastError(e.to_string())))?;
        Self::from_str(&contents)
            .map_err(|e| Error::ConfigNotLoaded(path.to_path_buf(), LastError(e.to_string())))
    }

    /// The configured operating system, or the host's when none is set.
    pub fn get_os(&self) -> Result<TargetOs, Error> {
        match self.target.os {
            Some(os) => Ok(os),
            None => TargetOs::host(),
        }
    }

    /// The architecture slice to inspect in universal binaries.
    pub fn get_arch(&self) -> String {
        match &self.target.arch {
            Some(a) => a.clone(),
            None => match std::env::consts::ARCH {
                "aarch64" => String::from("arm64"),
                other => other.to_string(),
            },
        }
    }

    pub fn is_debug(&self) -> bool {
        self.target.debug.unwrap_or(false)
    }

    /// Checks if the libraries were built as macOS frameworks.
    pub fn is_framework(&self) -> bool {
        self.target.framework.unwrap_or(true)
    }

    pub fn get_lib_path(&self) -> Option<&str> {
        self.toolchain.lib_path.as_deref()
    }

    pub fn get_plugins_path(&self) -> Result<&str, Error> {
        require(&self.toolchain.plugins_path, "toolchain.plugins-path")
    }

    pub fn get_import_path(&self) -> Result<&str, Error> {
        require(&self.toolchain.import_path, "toolchain.import-path")
    }

    pub fn get_toolchain_path(&self) -> Option<&str> {
        self.toolchain.toolchain_path.as_deref()
    }

    pub fn get_otool(&self) -> &str {
        self.toolchain.otool.as_deref().unwrap_or(OTOOL)
    }

    pub fn get_dumpbin(&self) -> &str {
        self.toolchain.dumpbin.as_deref().unwrap_or(DUMPBIN)
    }

    pub fn get_import_scanner(&self) -> &str {
        self.toolchain
            .import_scanner
            .as_deref()
            .unwrap_or(IMPORT_SCANNER)
    }

    /// The prefix every deployable library and module name starts with.
    pub fn get_namespace(&self) -> &str {
        self.project
            .namespace
            .as_deref()
            .unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Plugins to deploy, written as "plugintype/pluginname".
    pub fn get_plugins(&self) -> &[String] {
        self.project.plugins.as_deref().unwrap_or(&[])
    }

    pub fn get_install_root(&self) -> Result<&str, Error> {
        require(&self.install.root, "install.root")
    }

    pub fn get_contents_path(&self) -> &str {
        self.install.contents_path.as_deref().unwrap_or("")
    }

    pub fn get_install_libraries(&self) -> Option<&str> {
        self.install.libraries.as_deref()
    }

    pub fn get_install_plugins(&self) -> Option<&str> {
        self.install.plugins.as_deref()
    }

    pub fn get_install_qml(&self) -> Option<&str> {
        self.install.qml.as_deref()
    }

    pub fn get_modules(&self) -> &[LinkedModule] {
        &self.modules
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const C_0: &str = r#"
# This is a blank configuration file.
"#;

    const C_1: &str = r#"
[target]
os = "macos"
arch = "x86_64"
debug = false

[toolchain]
lib-path = "/opt/Qt/6.8.0/macos/lib"
plugins-path = "/opt/Qt/6.8.0/macos/plugins"
import-path = "/opt/Qt/6.8.0/macos/qml"
import-scanner = "/opt/Qt/6.8.0/macos/libexec/qmlimportscanner"

[project]
plugins = ["platforms/qcocoa", "imageformats/qjpeg"]

[install]
root = "dist"
contents-path = "Viewer.app/Contents"

[[module]]
name = "Core"
library = "/opt/Qt/6.8.0/macos/lib/QtCore.framework/QtCore"

[[module]]
name = "QmlIntegration"
"#;

    const C_2: &str = r#"
[target]
os = "windows"
debug = true

[toolchain]
lib-path = "C:/Qt/6.8.0/msvc2022_64/bin"
toolchain-path = "C:/Program Files/Microsoft Visual Studio/2022/Community/VC/Tools/MSVC/14.40.33807/bin/Hostx64/x64"

[project]
namespace = "Qt6"

[install]
root = "dist"
libraries = "."

[[module]]
name = "Gui"
library = "Qt6::Gui"
static = false
"#;

    #[test]
    fn parse_empty_config() {
        let cfg = Config::from_str(C_0).unwrap();
        assert_eq!(cfg, Config::new());
        assert_eq!(cfg.get_namespace(), "Qt");
        assert_eq!(cfg.is_framework(), true);
        assert_eq!(cfg.is_debug(), false);
        assert_eq!(cfg.get_plugins().len(), 0);
        assert_eq!(cfg.get_otool(), "otool");
        assert_eq!(cfg.get_import_scanner(), "qmlimportscanner");
    }

    #[test]
    fn parse_macos_config() {
        let cfg = Config::from_str(C_1).unwrap();
        assert_eq!(cfg.get_os().unwrap(), TargetOs::MacOs);
        assert_eq!(cfg.get_arch(), "x86_64");
        assert_eq!(cfg.get_lib_path(), Some("/opt/Qt/6.8.0/macos/lib"));
        assert_eq!(cfg.get_plugins(), &["platforms/qcocoa", "imageformats/qjpeg"]);
        assert_eq!(cfg.get_install_root().unwrap(), "dist");
        assert_eq!(cfg.get_contents_path(), "Viewer.app/Contents");
        assert_eq!(cfg.get_modules().len(), 2);
        assert_eq!(cfg.get_modules()[1].get_library(), None);
        assert_eq!(
            cfg.get_import_scanner(),
            "/opt/Qt/6.8.0/macos/libexec/qmlimportscanner"
        );
    }

    #[test]
    fn parse_windows_config() {
        let cfg = Config::from_str(C_2).unwrap();
        assert_eq!(cfg.get_os().unwrap(), TargetOs::Windows);
        assert_eq!(cfg.is_debug(), true);
        assert_eq!(cfg.get_namespace(), "Qt6");
        assert_eq!(cfg.get_install_libraries(), Some("."));
        assert_eq!(cfg.get_dumpbin(), "dumpbin");
        assert_eq!(cfg.get_modules()[0].get_library(), Some("Qt6::Gui"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_str("[target]\nos = \"macos\"\ncpu = \"arm64\"\n").is_err());
        assert!(Config::from_str("[package]\nname = \"viewer\"\n").is_err());
        assert!(Config::from_str("[target]\nos = \"linux\"\n").is_err());
    }

    #[test]
    fn missing_settings_name_their_key() {
        let cfg = Config::new();
        assert_eq!(
            cfg.get_import_path().unwrap_err(),
            Error::MissingSetting(
                String::from("toolchain.import-path"),
                Hint::SetInConfig("toolchain.import-path")
            )
        );
        assert!(cfg.get_install_root().is_err());
        assert!(cfg.get_plugins_path().is_err());
    }

    #[test]
    fn from_file_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[install]\nroot = 5\n").unwrap();
        match Config::from_file(&path) {
            Err(Error::ConfigNotLoaded(p, _)) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
        std::fs::write(&path, C_1).unwrap();
        assert!(Config::from_file(&path).is_ok());
    }
}
