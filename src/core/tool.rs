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

use crate::error::{Error, LastError};
use crate::util::anyerror::Fault;
use std::fmt::Display;

/// An external program invocation whose standard output is the product.
#[derive(Debug, PartialEq, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Appends a single argument.
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Appends a sequence of arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn get_program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &Vec<String> {
        &self.args
    }
}

impl Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            self.program,
            self.args
                .iter()
                .fold(String::new(), |x, y| x + " \"" + y.as_str() + "\"")
        )
    }
}

/// Runs a tool to completion and hands back what it wrote to stdout.
///
/// The resolver and the import scanner only ever talk to the outside world
/// through this trait.
pub trait Process {
    fn capture(&self, command: &ToolCommand) -> Result<String, Fault>;
}

/// Spawns the command as a child process and blocks until it exits.
#[derive(Debug, Default)]
pub struct Subprocess;

impl Process for Subprocess {
    fn capture(&self, command: &ToolCommand) -> Result<String, Fault> {
        tracing::debug!("running: {}", command);
        let output = match std::process::Command::new(command.get_program())
            .args(command.get_args())
            .output()
        {
            Ok(o) => o,
            Err(e) => {
                return Err(Error::ToolProcFailed(
                    command.get_program().to_string(),
                    LastError(e.to_string()),
                ))?
            }
        };
        match output.status.code() {
            Some(num) => {
                if num != 0 {
                    Err(Error::ChildProcErrorCode(
                        command.get_program().to_string(),
                        num,
                    ))?
                } else {
                    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
                }
            }
            None => Err(Error::ChildProcTerminated(
                command.get_program().to_string(),
            ))?,
        }
    }
}
