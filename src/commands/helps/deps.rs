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

pub const HELP: &str = r#"Resolve the runtime library closure.

Usage:
    qdeploy deps [options]

Options:
    --binary <path>...      binary to resolve the dependencies of
    --imports <file>        include the plugins of a scanned import list
    --modules               include the binaries of the linked modules
    --plugins               include the configured plugins
    --output <file>         write the dependency list to a file instead of stdout

Use 'qdeploy deps --help' to read more about the command.
"#;
