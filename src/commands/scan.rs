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

use crate::commands::helps::scan;
use crate::core::context::Context;
use crate::core::scanner::{self, ImportScanner};
use crate::core::tool::Subprocess;
use crate::util::anyerror::AnyError;
use std::path::PathBuf;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Help, Subcommand};

#[derive(Debug, PartialEq)]
pub struct Scan {
    qrc: Vec<String>,
    import_path: Option<String>,
    output: Option<PathBuf>,
}

impl Subcommand<Context> for Scan {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(scan::HELP))?;
        Ok(Scan {
            qrc: cli
                .get_all(Arg::option("qrc").value("file"))?
                .unwrap_or(Vec::new()),
            import_path: cli.get(Arg::option("import-path").value("dir"))?,
            output: cli.get(Arg::option("output").value("file"))?,
        })
    }

    fn execute(self, c: &Context) -> proc::Result {
        if self.qrc.is_empty() == true {
            return Err(AnyError(format!(
                "at least one resource file must be given with '--qrc'"
            )))?;
        }
        let config = c.get_config();
        let import_path = match &self.import_path {
            Some(p) => p.as_str(),
            None => config.get_import_path()?,
        };
        let imports = ImportScanner::new(import_path)
            .program(config.get_import_scanner())
            .scan(&Subprocess, c.get_platform(), &self.qrc)?;

        match &self.output {
            Some(file) => scanner::write_imports(file, &imports)?,
            None => println!("{}", serde_json::to_string_pretty(&imports)?),
        }
        Ok(())
    }
}
