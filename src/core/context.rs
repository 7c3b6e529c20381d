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

use crate::core::config::{Config, CONFIG_FILE};
use crate::core::layout::{BundleLayout, InstallDirs};
use crate::core::platform::{MacOs, Platform, TargetOs, Windows};
use crate::error::Error;
use crate::util::environment::{self, QDEPLOY_CONFIG};
use std::path::PathBuf;

/// The loaded configuration and the platform it selects, shared by every
/// command of a single run.
#[derive(Debug)]
pub struct Context {
    config_file: Option<PathBuf>,
    config: Config,
    platform: Box<dyn Platform>,
}

impl Context {
    /// Loads the configuration from the first of: `file`, the path in
    /// `QDEPLOY_CONFIG`, or `deploy.toml` in the working directory.
    ///
    /// Falls back to an empty configuration when none of them exist.
    pub fn load(file: Option<PathBuf>) -> Result<Self, Error> {
        let file = match file.or_else(|| environment::path_from_env(QDEPLOY_CONFIG)) {
            Some(f) => Some(f),
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                match local.is_file() {
                    true => Some(local),
                    false => None,
                }
            }
        };
        let config = match &file {
            Some(f) => {
                tracing::debug!("loading configuration {}", f.display());
                Config::from_file(f)?
            }
            None => {
                tracing::debug!("no configuration file found; using defaults");
                Config::new()
            }
        };
        let mut context = Self::from_config(config)?;
        context.config_file = file;
        Ok(context)
    }

    /// Selects the platform described by `config`.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let platform: Box<dyn Platform> = match config.get_os()? {
            TargetOs::MacOs => Box::new(
                MacOs::new(config.get_namespace())
                    .otool(config.get_otool())
                    .arch(&config.get_arch())
                    .lib_path(config.get_lib_path())
                    .frameworks(config.is_framework()),
            ),
            TargetOs::Windows => Box::new(
                Windows::new(config.get_namespace())
                    .dumpbin(config.get_dumpbin())
                    .toolchain_path(config.get_toolchain_path())
                    .lib_path(config.get_lib_path())
                    .debug(config.is_debug()),
            ),
        };
        tracing::debug!("deploying for {}", platform.os());
        Ok(Self {
            config_file: None,
            config: config,
            platform: platform,
        })
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    pub fn get_platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    /// Builds the bundle layout rooted at `root`, or at the configured install
    /// root when `root` is not given.
    pub fn layout(&self, root: Option<&str>) -> Result<BundleLayout, Error> {
        let root = match root {
            Some(r) => r,
            None => self.config.get_install_root()?,
        };
        let dirs = InstallDirs::for_os(self.platform.os())
            .libraries(self.config.get_install_libraries())
            .plugins(self.config.get_install_plugins())
            .qml(self.config.get_install_qml());
        Ok(BundleLayout::new(root, self.config.get_contents_path(), dirs))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn selects_platform_from_config() {
        let cfg = Config::from_str("[target]\nos = \"windows\"\n[project]\nnamespace = \"Qt6\"\n")
            .unwrap();
        let ctx = Context::from_config(cfg).unwrap();
        assert_eq!(ctx.get_platform().os(), TargetOs::Windows);
        assert_eq!(ctx.get_platform().namespace(), "Qt6");
        assert_eq!(ctx.get_platform().plugin_file_name("qwindows"), "qwindows.dll");
    }

    #[test]
    fn layout_uses_configured_dirs() {
        let cfg = Config::from_str(
            "[target]\nos = \"macos\"\n[install]\nroot = \"dist\"\ncontents-path = \"Viewer.app/Contents\"\nqml = \"Resources/imports\"\n",
        )
        .unwrap();
        let ctx = Context::from_config(cfg).unwrap();
        let layout = ctx.layout(None).unwrap();
        assert_eq!(
            layout.target_path("/opt/Qt/qml/QtQml/qmldir", "/opt/Qt/qml", "Resources/imports").unwrap(),
            "dist/Viewer.app/Contents/Resources/imports/QtQml/qmldir"
        );
        let layout = ctx.layout(Some("out")).unwrap();
        assert_eq!(
            layout.target_path("/opt/Qt/lib/QtCore.framework", "/opt/Qt/lib", "Frameworks").unwrap(),
            "out/Viewer.app/Contents/Frameworks/QtCore.framework"
        );
    }

    #[test]
    fn layout_requires_install_root() {
        let cfg = Config::from_str("[target]\nos = \"macos\"\n").unwrap();
        let ctx = Context::from_config(cfg).unwrap();
        assert!(matches!(ctx.layout(None), Err(Error::MissingSetting(_, _))));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("release.toml");
        std::fs::write(&path, "[target]\nos = \"macos\"\narch = \"x86_64\"\n").unwrap();
        let ctx = Context::load(Some(path.clone())).unwrap();
        assert_eq!(ctx.get_config_file(), Some(&path));
        assert_eq!(ctx.get_config().get_arch(), "x86_64");

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Context::load(Some(missing)),
            Err(Error::ConfigNotLoaded(_, _))
        ));
    }
}
