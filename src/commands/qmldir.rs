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

use crate::commands::helps::qmldir;
use crate::core::context::Context;
use crate::core::qmldir::{ModuleDescriptor, QMLDIR};
use std::path::PathBuf;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Help, Subcommand};

#[derive(Debug, PartialEq)]
pub struct Qmldir {
    path: PathBuf,
    json: bool,
}

impl Subcommand<Context> for Qmldir {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(qmldir::HELP))?;
        Ok(Qmldir {
            json: cli.check(Arg::flag("json"))?,
            path: cli.require(Arg::positional("path"))?,
        })
    }

    fn execute(self, c: &Context) -> proc::Result {
        // accept the module directory in place of its manifest
        let path = match self.path.is_dir() {
            true => self.path.join(QMLDIR),
            false => self.path,
        };
        let descriptor = ModuleDescriptor::from_file(&path, c.get_platform())?;
        match self.json {
            true => println!("{}", serde_json::to_string_pretty(&descriptor)?),
            false => print!("{}", descriptor),
        }
        Ok(())
    }
}
