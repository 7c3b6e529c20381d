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

pub const HELP: &str = r#"Map every deployable file into the bundle.

Usage:
    qdeploy plan [options]

Options:
    --deps <file>...        dependency list to install libraries from
    --imports <file>        scanned import list to install qml modules from
    --root <dir>            install root to use instead of the configured one
    --json                  print the plan as json
    --output <file>         write the plan to a file instead of stdout

Use 'qdeploy plan --help' to read more about the command.
"#;
