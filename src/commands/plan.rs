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

use crate::commands::helps::plan;
use crate::core::context::Context;
use crate::core::depsfile;
use crate::core::layout::InstallPlan;
use crate::core::qmldir::{ModuleDescriptor, QMLDIR};
use crate::core::scanner;
use crate::util::filesystem;
use std::path::PathBuf;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Help, Subcommand};

#[derive(Debug, PartialEq)]
pub struct Plan {
    deps: Vec<PathBuf>,
    imports: Option<PathBuf>,
    root: Option<String>,
    json: bool,
    output: Option<PathBuf>,
}

impl Subcommand<Context> for Plan {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(plan::HELP))?;
        Ok(Plan {
            // flags
            json: cli.check(Arg::flag("json"))?,
            // options
            deps: cli
                .get_all(Arg::option("deps").value("file"))?
                .unwrap_or(Vec::new()),
            imports: cli.get(Arg::option("imports").value("file"))?,
            root: cli.get(Arg::option("root").value("dir"))?,
            output: cli.get(Arg::option("output").value("file"))?,
        })
    }

    fn execute(self, c: &Context) -> proc::Result {
        let platform = c.get_platform();
        let config = c.get_config();
        let layout = c.layout(self.root.as_deref())?;

        let mut install = InstallPlan::new(&layout, platform);
        install.add_libraries(&depsfile::read_all(&self.deps)?)?;
        install.add_modules(config.get_modules())?;
        if config.get_plugins().is_empty() == false {
            install.add_plugins(config.get_plugins_path()?, config.get_plugins())?;
        }

        if let Some(file) = &self.imports {
            let import_path = config.get_import_path()?;
            for import in scanner::read_imports(file)? {
                let manifest = PathBuf::from(filesystem::join(
                    filesystem::parent(import.get_path()),
                    QMLDIR,
                ));
                let descriptor = match manifest.is_file() {
                    true => Some(ModuleDescriptor::from_file(&manifest, platform)?),
                    false => {
                        tracing::warn!("module {} has no {} file", import.get_name(), QMLDIR);
                        None
                    }
                };
                install.add_import(import_path, &import, descriptor.as_ref())?;
            }
        }
        tracing::info!("planned {} install entries", install.len());

        let entries = install.into_entries();
        let text = match self.json {
            true => serde_json::to_string_pretty(&entries)? + "\n",
            false => entries
                .iter()
                .map(|e| e.to_string() + "\n")
                .collect::<String>(),
        };
        match &self.output {
            Some(file) => std::fs::write(file, text)?,
            None => print!("{}", text),
        }
        Ok(())
    }
}
