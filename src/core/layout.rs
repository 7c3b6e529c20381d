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

//! Mapping of resolved artifacts onto their place inside the bundle.
//!
//! Nothing in here touches the filesystem or spawns a process.

use crate::core::platform::{Platform, TargetOs};
use crate::core::qmldir::{ModuleDescriptor, QMLDIR};
use crate::core::scanner::QmlImport;
use crate::error::Error;
use crate::util::filesystem;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// The only framework version that is ever deployed.
const FRAMEWORK_VERSION: &str = "A";

/// A library module the application links against, as reported by the build
/// system.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinkedModule {
    name: String,
    /// The linker name on Windows or the release library file on macOS.
    library: Option<String>,
    #[serde(rename = "static", default)]
    static_lib: bool,
}

impl LinkedModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            library: None,
            static_lib: false,
        }
    }

    pub fn library(mut self, path: &str) -> Self {
        self.library = Some(path.to_string());
        self
    }

    pub fn static_lib(mut self, is_static: bool) -> Self {
        self.static_lib = is_static;
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_library(&self) -> Option<&str> {
        self.library.as_deref()
    }

    /// Checks if the module has a shared library to carry into the bundle.
    pub fn is_deployable(&self) -> bool {
        self.library.is_some() && self.static_lib == false
    }
}

/// Lists the five entries that make up a framework bundle at `framework_dir`
/// whose binary is called `name`.
fn framework_layout(framework_dir: &str, name: &str) -> Vec<String> {
    let versions = filesystem::join(framework_dir, "Versions");
    let version = filesystem::join(&versions, FRAMEWORK_VERSION);
    vec![
        filesystem::join(framework_dir, name),
        filesystem::join(framework_dir, "Resources"),
        filesystem::join(&versions, "Current"),
        filesystem::join(&version, "Resources/Info.plist"),
        filesystem::join(&version, name),
    ]
}

/// Expands a framework binary path `<dir>/<N>.framework/<...>/<N>` into the
/// framework's contents.
pub fn framework_contents(binary: &str) -> Result<Vec<String>, Error> {
    let name = filesystem::file_name(binary);
    let marker = format!("/{}.framework/", name);
    if let Some(i) = binary.rfind(&marker) {
        let inner = &binary[i + marker.len()..];
        // there must be at least one directory between the framework and its binary
        if i > 0 && inner.len() > name.len() && inner.ends_with(&format!("/{}", name)) {
            return Ok(framework_layout(&binary[..i + marker.len() - 1], name));
        }
    }
    Err(Error::InvalidFrameworkPath(binary.to_string()))
}

/// Expands a module's release library, which may sit directly inside the
/// framework directory, into the framework's contents.
pub fn module_framework(library: &str) -> Result<Vec<String>, Error> {
    const SUFFIX: &str = ".framework/";
    match library.rfind(SUFFIX) {
        Some(i) => Ok(framework_layout(
            &library[..i + SUFFIX.len() - 1],
            filesystem::file_name(library),
        )),
        None => Err(Error::InvalidFrameworkPath(library.to_string())),
    }
}

/// Converts plugin specifications written as "plugintype/pluginname" into
/// their file paths relative to the plugins directory.
pub fn plugin_specs_to_file_names<S: AsRef<str>>(
    specs: &[S],
    platform: &dyn Platform,
) -> Result<Vec<String>, Error> {
    specs
        .iter()
        .map(|spec| {
            let parts: Vec<&str> = spec.as_ref().split('/').collect();
            match parts.as_slice() {
                [kind, name] if kind.is_empty() == false && name.is_empty() == false => Ok(
                    filesystem::join(kind, &platform.plugin_file_name(name)),
                ),
                _ => Err(Error::MalformedPluginSpec(spec.as_ref().to_string())),
            }
        })
        .collect()
}

/// Destination directories inside the bundle's contents.
#[derive(Debug, PartialEq, Clone)]
pub struct InstallDirs {
    libraries: String,
    plugins: String,
    qml: String,
}

impl InstallDirs {
    /// The conventional directories for the given platform.
    pub fn for_os(os: TargetOs) -> Self {
        match os {
            TargetOs::MacOs => Self {
                libraries: String::from("Frameworks"),
                plugins: String::from("PlugIns"),
                qml: String::from("Resources/qml"),
            },
            TargetOs::Windows => Self {
                libraries: String::new(),
                plugins: String::from("plugins"),
                qml: String::from("qml"),
            },
        }
    }

    pub fn libraries(mut self, dir: Option<&str>) -> Self {
        if let Some(d) = dir {
            self.libraries = d.to_string();
        }
        self
    }

    pub fn plugins(mut self, dir: Option<&str>) -> Self {
        if let Some(d) = dir {
            self.plugins = d.to_string();
        }
        self
    }

    pub fn qml(mut self, dir: Option<&str>) -> Self {
        if let Some(d) = dir {
            self.qml = d.to_string();
        }
        self
    }
}

/// Where the bundle's contents start and how they are divided.
#[derive(Debug, PartialEq, Clone)]
pub struct BundleLayout {
    root: String,
    dirs: InstallDirs,
}

impl BundleLayout {
    pub fn new(install_root: &str, contents_path: &str, dirs: InstallDirs) -> Self {
        Self {
            root: filesystem::join(install_root, contents_path),
            dirs: dirs,
        }
    }

    /// Moves `file` from underneath `from_dir` to underneath `install_dir` in
    /// the bundle.
    pub fn target_path(&self, file: &str, from_dir: &str, install_dir: &str) -> Result<String, Error> {
        let rel = match file.strip_prefix(from_dir) {
            Some(r) if from_dir.ends_with('/') || r.is_empty() || r.starts_with('/') => r,
            _ => {
                return Err(Error::PathOutsideRoot(
                    file.to_string(),
                    from_dir.to_string(),
                ))
            }
        };
        Ok(filesystem::join(
            &filesystem::join(&self.root, install_dir),
            rel,
        ))
    }
}

/// A single file or directory to copy into the bundle.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize)]
pub struct InstallEntry {
    source: String,
    destination: String,
}

impl InstallEntry {
    pub fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    pub fn get_source(&self) -> &str {
        &self.source
    }

    pub fn get_destination(&self) -> &str {
        &self.destination
    }
}

impl Display for InstallEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// The complete set of copies handed to the installer.
#[derive(Debug)]
pub struct InstallPlan<'a> {
    layout: &'a BundleLayout,
    platform: &'a dyn Platform,
    entries: BTreeSet<InstallEntry>,
}

impl<'a> InstallPlan<'a> {
    pub fn new(layout: &'a BundleLayout, platform: &'a dyn Platform) -> Self {
        Self {
            layout: layout,
            platform: platform,
            entries: BTreeSet::new(),
        }
    }

    fn add(&mut self, source: &str, from_dir: &str, install_dir: &str) -> Result<(), Error> {
        let destination = self.layout.target_path(source, from_dir, install_dir)?;
        self.entries.insert(InstallEntry::new(source, &destination));
        Ok(())
    }

    /// Adds resolved runtime libraries.
    pub fn add_libraries<'b, I>(&mut self, libraries: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'b String>,
    {
        let lib_dir = self.platform.library_dir()?.to_string();
        let dest = self.layout.dirs.libraries.clone();
        for library in libraries {
            for path in self.platform.install_paths(library)? {
                self.add(&path, &lib_dir, &dest)?;
            }
        }
        Ok(())
    }

    /// Adds the binaries of the modules the application links against.
    pub fn add_modules(&mut self, modules: &[LinkedModule]) -> Result<(), Error> {
        let mut binaries = Vec::new();
        for module in modules {
            binaries.append(&mut self.platform.module_binaries(module)?);
        }
        if binaries.is_empty() == true {
            return Ok(());
        }
        let lib_dir = self.platform.library_dir()?.to_string();
        let dest = self.layout.dirs.libraries.clone();
        for path in binaries {
            self.add(&path, &lib_dir, &dest)?;
        }
        Ok(())
    }

    /// Adds plugins given as "plugintype/pluginname" from `plugins_dir`.
    pub fn add_plugins<S: AsRef<str>>(&mut self, plugins_dir: &str, specs: &[S]) -> Result<(), Error> {
        let dest = self.layout.dirs.plugins.clone();
        for file in plugin_specs_to_file_names(specs, self.platform)? {
            self.add(&filesystem::join(plugins_dir, &file), plugins_dir, &dest)?;
        }
        Ok(())
    }

    /// Adds a scanned import's plugin along with its module's manifest and
    /// everything the manifest declares.
    pub fn add_import(
        &mut self,
        import_path: &str,
        import: &QmlImport,
        module: Option<&ModuleDescriptor>,
    ) -> Result<(), Error> {
        let dest = self.layout.dirs.qml.clone();
        self.add(import.get_path(), import_path, &dest)?;

        let module_dir = filesystem::parent(import.get_path()).to_string();
        if let Some(descriptor) = module {
            self.add(&filesystem::join(&module_dir, QMLDIR), import_path, &dest)?;
            for file in descriptor.get_plugins().iter().chain(descriptor.get_files()) {
                self.add(&filesystem::join(&module_dir, file), import_path, &dest)?;
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &InstallEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<InstallEntry> {
        self.entries.into_iter().collect()
    }
}
