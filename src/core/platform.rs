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

use crate::core::layout;
use crate::core::layout::LinkedModule;
use crate::core::tool::ToolCommand;
use crate::core::toolout;
use crate::error::{Error, Hint};
use crate::util::filesystem;
use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Operating systems a bundle can be laid out for.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    MacOs,
    Windows,
}

impl TargetOs {
    /// Detects the operating system this program was built for.
    pub fn host() -> Result<Self, Error> {
        Self::from_str(std::env::consts::OS)
    }
}

impl FromStr for TargetOs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "macos" => Ok(Self::MacOs),
            "windows" => Ok(Self::Windows),
            _ => Err(Error::UnsupportedPlatform(
                s.to_string(),
                Hint::SupportedPlatforms,
            )),
        }
    }
}

impl Display for TargetOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Everything that differs between target platforms.
///
/// One strategy is selected per run and every caller goes through it.
pub trait Platform: std::fmt::Debug {
    fn os(&self) -> TargetOs;

    /// The prefix identifying the project's own libraries and modules.
    fn namespace(&self) -> &str;

    /// The directory holding the project's runtime libraries.
    fn library_dir(&self) -> Result<&str, Error>;

    /// Builds the inspection tool invocation listing `binary`'s direct dependencies.
    fn inspect_command(&self, binary: &str) -> ToolCommand;

    /// Reads the inspection `output` for `binary` into the absolute paths of
    /// its in-namespace direct dependencies.
    fn direct_dependencies(&self, binary: &str, output: &str) -> Result<Vec<String>, Error>;

    /// Converts a plugin name into the file the runtime loads.
    fn plugin_file_name(&self, name: &str) -> String;

    /// Expands a resolved library into every path that must be installed for it.
    fn install_paths(&self, library: &str) -> Result<Vec<String>, Error>;

    /// The binary to inspect for a linked module, if it has one at runtime.
    fn module_library(&self, module: &LinkedModule) -> Result<Option<String>, Error>;

    /// Every path that must be installed for a linked module.
    fn module_binaries(&self, module: &LinkedModule) -> Result<Vec<String>, Error>;
}

fn require_lib_path(lib_path: &Option<String>) -> Result<&str, Error> {
    match lib_path {
        Some(p) => Ok(p.as_str()),
        None => Err(Error::MissingSetting(
            String::from(LIB_PATH_KEY),
            Hint::SetInConfig(LIB_PATH_KEY),
        )),
    }
}

const LIB_PATH_KEY: &str = "toolchain.lib-path";

const RPATH: &str = "@rpath/";

/// Framework-style bundles as laid out on macOS.
#[derive(Debug, PartialEq, Clone)]
pub struct MacOs {
    otool: String,
    arch: String,
    lib_path: Option<String>,
    namespace: String,
    frameworks: bool,
}

impl MacOs {
    pub fn new(namespace: &str) -> Self {
        Self {
            otool: String::from(toolout::OTOOL),
            arch: String::from("arm64"),
            lib_path: None,
            namespace: namespace.to_string(),
            frameworks: true,
        }
    }

    pub fn otool(mut self, program: &str) -> Self {
        self.otool = program.to_string();
        self
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.arch = arch.to_string();
        self
    }

    pub fn lib_path(mut self, path: Option<&str>) -> Self {
        self.lib_path = path.map(|p| p.to_string());
        self
    }

    /// Sets whether the libraries were built as frameworks.
    pub fn frameworks(mut self, enabled: bool) -> Self {
        self.frameworks = enabled;
        self
    }

    /// Strips the `@rpath/` reference down to the framework-relative binary path.
    ///
    /// Only references of the form `@rpath/<N>.framework/Versions/A/<N>` are accepted.
    fn rpath_framework(reference: &str) -> Result<&str, Error> {
        let rel = reference.strip_prefix(RPATH).unwrap_or(reference);
        if let Some((name, rest)) = rel.split_once(".framework/") {
            if name.is_empty() == false && rest == format!("Versions/A/{}", name) {
                return Ok(rel);
            }
        }
        Err(Error::InvalidFrameworkPath(reference.to_string()))
    }
}

impl Platform for MacOs {
    fn os(&self) -> TargetOs {
        TargetOs::MacOs
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn library_dir(&self) -> Result<&str, Error> {
        require_lib_path(&self.lib_path)
    }

    fn inspect_command(&self, binary: &str) -> ToolCommand {
        ToolCommand::new(&self.otool)
            .arg("-L")
            .arg(binary)
            .arg("-arch")
            .arg(&self.arch)
    }

    fn direct_dependencies(&self, binary: &str, output: &str) -> Result<Vec<String>, Error> {
        let prefix = format!("{}{}", RPATH, self.namespace);
        let lib_path = self.library_dir()?;
        toolout::parse_otool(binary, output)?
            .iter()
            .filter(|dep| dep.starts_with(&prefix))
            .map(|dep| Ok(filesystem::join(lib_path, Self::rpath_framework(dep)?)))
            .collect()
    }

    fn plugin_file_name(&self, name: &str) -> String {
        format!("lib{}.dylib", name)
    }

    fn install_paths(&self, library: &str) -> Result<Vec<String>, Error> {
        layout::framework_contents(library)
    }

    fn module_library(&self, module: &LinkedModule) -> Result<Option<String>, Error> {
        match module.is_deployable() && self.frameworks == true {
            true => Ok(module.get_library().map(|l| l.to_string())),
            false => Ok(None),
        }
    }

    fn module_binaries(&self, module: &LinkedModule) -> Result<Vec<String>, Error> {
        match self.module_library(module)? {
            Some(library) => layout::module_framework(&library),
            None => {
                tracing::debug!("module {} has no framework to install", module.get_name());
                Ok(Vec::new())
            }
        }
    }
}

/// Flat DLL placement as laid out on Windows.
#[derive(Debug, PartialEq, Clone)]
pub struct Windows {
    dumpbin: String,
    toolchain_path: Option<String>,
    lib_path: Option<String>,
    namespace: String,
    debug: bool,
}

impl Windows {
    pub fn new(namespace: &str) -> Self {
        Self {
            dumpbin: String::from(toolout::DUMPBIN),
            toolchain_path: None,
            lib_path: None,
            namespace: namespace.to_string(),
            debug: false,
        }
    }

    pub fn dumpbin(mut self, program: &str) -> Self {
        self.dumpbin = program.to_string();
        self
    }

    pub fn toolchain_path(mut self, path: Option<&str>) -> Self {
        self.toolchain_path = path.map(|p| p.to_string());
        self
    }

    pub fn lib_path(mut self, path: Option<&str>) -> Self {
        self.lib_path = path.map(|p| p.to_string());
        self
    }

    /// Sets whether binaries carry the debug `d` suffix.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    fn debug_suffix(&self) -> &'static str {
        match self.debug {
            true => "d",
            false => "",
        }
    }
}

impl Platform for Windows {
    fn os(&self) -> TargetOs {
        TargetOs::Windows
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn library_dir(&self) -> Result<&str, Error> {
        require_lib_path(&self.lib_path)
    }

    fn inspect_command(&self, binary: &str) -> ToolCommand {
        let program = format!("{}.exe", self.dumpbin);
        let program = match &self.toolchain_path {
            Some(dir) => filesystem::join(dir, &program),
            None => program,
        };
        ToolCommand::new(&program)
            .arg("/nologo")
            .arg("/dependents")
            .arg(binary)
    }

    fn direct_dependencies(&self, _binary: &str, output: &str) -> Result<Vec<String>, Error> {
        let lib_path = self.library_dir()?;
        Ok(toolout::parse_dumpbin(output, &self.namespace)?
            .iter()
            .map(|dep| filesystem::join(lib_path, dep))
            .collect())
    }

    fn plugin_file_name(&self, name: &str) -> String {
        format!("{}{}.dll", name, self.debug_suffix())
    }

    fn install_paths(&self, library: &str) -> Result<Vec<String>, Error> {
        Ok(vec![library.to_string()])
    }

    fn module_library(&self, module: &LinkedModule) -> Result<Option<String>, Error> {
        if module.is_deployable() == false {
            return Ok(None);
        }
        match module.get_library() {
            Some(library) => Ok(Some(filesystem::join(
                self.library_dir()?,
                &format!(
                    "{}{}.dll",
                    filesystem::base_name(library),
                    self.debug_suffix()
                ),
            ))),
            None => Ok(None),
        }
    }

    fn module_binaries(&self, module: &LinkedModule) -> Result<Vec<String>, Error> {
        Ok(self.module_library(module)?.into_iter().collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const OTOOL_QML: &str = "\
/opt/Qt/lib/QtQml.framework/Versions/A/QtQml:
\t@rpath/QtQml.framework/Versions/A/QtQml (compatibility version 6.0.0, current version 6.8.0)
\t@rpath/QtNetwork.framework/Versions/A/QtNetwork (compatibility version 6.0.0, current version 6.8.0)
\t@rpath/QtCore.framework/Versions/A/QtCore (compatibility version 6.0.0, current version 6.8.0)
\t/usr/lib/libc++.1.dylib (compatibility version 1.0.0, current version 1700.255.0)
";

    fn macos() -> MacOs {
        MacOs::new("Qt").lib_path(Some("/opt/Qt/lib"))
    }

    fn windows() -> Windows {
        Windows::new("Qt6")
            .lib_path(Some("C:/Qt/bin"))
            .toolchain_path(Some("C:/VS/bin/Hostx64/x64"))
    }

    #[test]
    fn target_os_from_str() {
        assert_eq!(TargetOs::from_str("macos").unwrap(), TargetOs::MacOs);
        assert_eq!(TargetOs::from_str("windows").unwrap(), TargetOs::Windows);
        assert!(TargetOs::from_str("linux").is_err());
        assert_eq!(TargetOs::Windows.to_string(), "windows");
    }

    #[test]
    fn inspect_commands() {
        let cmd = macos().arch("x86_64").inspect_command("libfoo.dylib");
        assert_eq!(cmd.get_program(), "otool");
        assert_eq!(cmd.get_args(), &vec!["-L", "libfoo.dylib", "-arch", "x86_64"]);

        let cmd = windows().inspect_command("C:/Qt/bin/Qt6Qml.dll");
        assert_eq!(cmd.get_program(), "C:/VS/bin/Hostx64/x64/dumpbin.exe");
        assert_eq!(
            cmd.get_args(),
            &vec!["/nologo", "/dependents", "C:/Qt/bin/Qt6Qml.dll"]
        );
    }

    #[test]
    fn macos_dependencies_are_filtered_and_absolute() {
        let deps = macos()
            .direct_dependencies("/opt/Qt/lib/QtQml.framework/Versions/A/QtQml", OTOOL_QML)
            .unwrap();
        assert_eq!(
            deps,
            vec![
                "/opt/Qt/lib/QtQml.framework/Versions/A/QtQml",
                "/opt/Qt/lib/QtNetwork.framework/Versions/A/QtNetwork",
                "/opt/Qt/lib/QtCore.framework/Versions/A/QtCore",
            ]
        );
    }

    #[test]
    fn macos_rejects_unversioned_reference() {
        let output = "\
libfoo.dylib:
\t@rpath/QtCore.framework/QtCore (compatibility version 6.0.0, current version 6.8.0)
";
        let err = macos().direct_dependencies("libfoo.dylib", output).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFrameworkPath(String::from("@rpath/QtCore.framework/QtCore"))
        );
    }

    #[test]
    fn macos_requires_lib_path() {
        let err = MacOs::new("Qt")
            .direct_dependencies("/opt/Qt/lib/QtQml.framework/Versions/A/QtQml", OTOOL_QML)
            .unwrap_err();
        assert!(matches!(err, Error::MissingSetting(_, _)));
    }

    #[test]
    fn windows_dependencies_are_absolute() {
        let output = "  Image has the following dependencies:\n\n    Qt6Core.dll\n    KERNEL32.dll\n\n  Summary\n";
        let deps = windows().direct_dependencies("Qt6Gui.dll", output).unwrap();
        assert_eq!(deps, vec!["C:/Qt/bin/Qt6Core.dll"]);
    }

    #[test]
    fn plugin_file_names() {
        assert_eq!(
            macos().plugin_file_name("platforminputcontextplugin"),
            "libplatforminputcontextplugin.dylib"
        );
        assert_eq!(
            windows().plugin_file_name("platforminputcontextplugin"),
            "platforminputcontextplugin.dll"
        );
        assert_eq!(
            windows().debug(true).plugin_file_name("platforminputcontextplugin"),
            "platforminputcontextplugind.dll"
        );
    }

    #[test]
    fn framework_install_paths() {
        let paths = macos()
            .install_paths("/opt/Qt/lib/QtCore.framework/Versions/A/QtCore")
            .unwrap();
        assert_eq!(paths.len(), 5);
        let paths = windows().install_paths("C:/Qt/bin/Qt6Core.dll").unwrap();
        assert_eq!(paths, vec!["C:/Qt/bin/Qt6Core.dll"]);
    }

    #[test]
    fn module_binaries() {
        let core = LinkedModule::new("core").library("C:/Qt/lib/Qt6Core.lib");
        assert_eq!(
            windows().module_binaries(&core).unwrap(),
            vec!["C:/Qt/bin/Qt6Core.dll"]
        );
        assert_eq!(
            windows().debug(true).module_binaries(&core).unwrap(),
            vec!["C:/Qt/bin/Qt6Cored.dll"]
        );

        let quick = LinkedModule::new("quick").library("/opt/Qt/lib/QtQuick.framework/QtQuick");
        let paths = macos().module_binaries(&quick).unwrap();
        assert_eq!(paths.len(), 5);
        assert_eq!(
            macos().module_library(&quick).unwrap(),
            Some(String::from("/opt/Qt/lib/QtQuick.framework/QtQuick"))
        );
        // a non-framework build installs no module binaries
        assert!(macos().frameworks(false).module_binaries(&quick).unwrap().is_empty());

        let headers = LinkedModule::new("headers");
        assert!(windows().module_binaries(&headers).unwrap().is_empty());
        assert!(macos().module_binaries(&headers).unwrap().is_empty());

        let fixed = LinkedModule::new("static").library("C:/Qt/lib/Qt6Static.lib").static_lib(true);
        assert!(windows().module_binaries(&fixed).unwrap().is_empty());
    }
}
