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

pub const HELP: &str = r#"Qdeploy gathers what a Qt application needs at runtime.

Usage:
    qdeploy [options] [command]

Commands:
    qmldir                read a qml module manifest
    scan                  find the qml modules an application imports
    deps                  resolve the runtime library closure
    plan                  map every deployable file into the bundle

Options:
    --version             print version information and exit
    --config <path>       configuration file to load instead of deploy.toml
    --verbose, -v         report what is being resolved
    --color <when>        coloring: auto, always, never
    --help, -h            print help information

Use 'qdeploy <command> --help' for more information about a command."#;
