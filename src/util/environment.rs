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

use std::env;
use std::path::PathBuf;

/// Path to the configuration file to load instead of the working directory's.
pub const QDEPLOY_CONFIG: &str = "QDEPLOY_CONFIG";

/// Log filter directives (`tracing-subscriber` syntax).
pub const QDEPLOY_LOG: &str = "QDEPLOY_LOG";

/// Reads an environment variable as a path, ignoring empty values.
pub fn path_from_env(key: &str) -> Option<PathBuf> {
    match env::var(key) {
        Ok(s) if s.is_empty() == false => Some(PathBuf::from(s)),
        _ => None,
    }
}
