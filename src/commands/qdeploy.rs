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

use crate::commands::helps::qdeploy;
use crate::core::context::Context;
use crate::util::color::ColorMode;
use crate::util::logging;
use std::path::PathBuf;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Command, Help, Subcommand};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, PartialEq)]
pub struct Qdeploy {
    version: bool,
    verbose: bool,
    color: Option<ColorMode>,
    config: Option<PathBuf>,
    command: Option<QdeploySubcommand>,
}

impl Command for Qdeploy {
    fn interpret(cli: &mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(qdeploy::HELP))?;
        Ok(Qdeploy {
            // flags
            version: cli.check(Arg::flag("version"))?,
            verbose: cli.check(Arg::flag("verbose").switch('v'))?,
            // options
            color: cli.get(Arg::option("color").value("when"))?,
            config: cli.get(Arg::option("config").value("path"))?,
            // the subcommand is always checked last
            command: cli.nest(Arg::subcommand("command"))?,
        })
    }

    fn execute(self) -> proc::Result {
        // set the coloring mode before anything is printed
        self.color.unwrap_or_default().apply();
        logging::init(self.verbose);

        // prioritize version information
        if self.version == true {
            println!("qdeploy {}", VERSION);
            return Ok(());
        }
        match self.command {
            Some(command) => {
                let context = Context::load(self.config)?;
                command.execute(&context)
            }
            // if no command is given then print default help
            None => Ok(println!("{}", qdeploy::HELP)),
        }
    }
}

use crate::commands::deps::Deps;
use crate::commands::plan::Plan;
use crate::commands::qmldir::Qmldir;
use crate::commands::scan::Scan;

#[derive(Debug, PartialEq)]
enum QdeploySubcommand {
    Qmldir(Qmldir),
    Scan(Scan),
    Deps(Deps),
    Plan(Plan),
}

impl Subcommand<Context> for QdeploySubcommand {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        match cli.select(&["qmldir", "scan", "deps", "plan"])?.as_ref() {
            "qmldir" => Ok(QdeploySubcommand::Qmldir(Qmldir::interpret(cli)?)),
            "scan" => Ok(QdeploySubcommand::Scan(Scan::interpret(cli)?)),
            "deps" => Ok(QdeploySubcommand::Deps(Deps::interpret(cli)?)),
            "plan" => Ok(QdeploySubcommand::Plan(Plan::interpret(cli)?)),
            _ => panic!("an unimplemented command was passed through!"),
        }
    }

    fn execute(self, context: &Context) -> proc::Result {
        match self {
            QdeploySubcommand::Qmldir(c) => c.execute(context),
            QdeploySubcommand::Scan(c) => c.execute(context),
            QdeploySubcommand::Deps(c) => c.execute(context),
            QdeploySubcommand::Plan(c) => c.execute(context),
        }
    }
}
