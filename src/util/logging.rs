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

use tracing_subscriber::EnvFilter;

use super::environment::QDEPLOY_LOG;

/// Installs the global subscriber writing to stderr.
///
/// The filter is taken from `QDEPLOY_LOG` when set, otherwise `debug` when
/// `verbose` is raised and `warn` by default. Calling this more than once is
/// harmless.
pub fn init(verbose: bool) {
    let fallback = match verbose {
        true => "debug",
        false => "warn",
    };
    let filter = EnvFilter::try_from_env(QDEPLOY_LOG).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .ok();
}
