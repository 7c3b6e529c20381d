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

use crate::commands::helps::deps;
use crate::core::context::Context;
use crate::core::depsfile;
use crate::core::layout;
use crate::core::resolver::Resolver;
use crate::core::scanner;
use crate::core::tool::Subprocess;
use crate::util::anyerror::{AnyError, Fault};
use crate::util::filesystem;
use std::path::PathBuf;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Help, Subcommand};

#[derive(Debug, PartialEq)]
pub struct Deps {
    binaries: Vec<PathBuf>,
    imports: Option<PathBuf>,
    modules: bool,
    plugins: bool,
    output: Option<PathBuf>,
}

impl Subcommand<Context> for Deps {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(deps::HELP))?;
        Ok(Deps {
            // flags
            modules: cli.check(Arg::flag("modules"))?,
            plugins: cli.check(Arg::flag("plugins"))?,
            // options
            binaries: cli
                .get_all(Arg::option("binary").value("path"))?
                .unwrap_or(Vec::new()),
            imports: cli.get(Arg::option("imports").value("file"))?,
            output: cli.get(Arg::option("output").value("file"))?,
        })
    }

    fn execute(self, c: &Context) -> proc::Result {
        let starts = self.collect_starts(c)?;
        if starts.is_empty() == true {
            return Err(AnyError(format!(
                "nothing to resolve; pass '--binary', '--imports', '--modules', or '--plugins'"
            )))?;
        }

        let mut resolver = Resolver::new(c.get_platform(), &Subprocess);
        let libraries = resolver.resolve_all(&starts)?;
        tracing::info!(
            "{} libraries from {} binaries ({} inspected)",
            libraries.len(),
            starts.len(),
            resolver.inspections()
        );

        match &self.output {
            Some(file) => depsfile::write(file, &libraries)?,
            None => print!("{}", depsfile::render(&libraries)),
        }
        Ok(())
    }
}

impl Deps {
    /// Gathers the binaries whose closures are requested.
    fn collect_starts(&self, c: &Context) -> Result<Vec<String>, Fault> {
        let platform = c.get_platform();
        let config = c.get_config();

        let mut starts: Vec<String> = self
            .binaries
            .iter()
            .map(|b| filesystem::into_std_str(b))
            .collect();

        if let Some(file) = &self.imports {
            starts.extend(
                scanner::read_imports(file)?
                    .iter()
                    .map(|i| i.get_path().to_string()),
            );
        }
        if self.modules == true {
            for module in config.get_modules() {
                if let Some(library) = platform.module_library(module)? {
                    starts.push(library);
                }
            }
        }
        if self.plugins == true && config.get_plugins().is_empty() == false {
            let plugins_dir = config.get_plugins_path()?;
            for file in layout::plugin_specs_to_file_names(config.get_plugins(), platform)? {
                starts.push(filesystem::join(plugins_dir, &file));
            }
        }
        Ok(starts)
    }
}
