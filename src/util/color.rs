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

use super::anyerror::AnyError;
use std::str::FromStr;

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ColorMode {
    Always,
    Never,
    #[default]
    Auto,
}

impl ColorMode {
    /// Forces or releases colored output for the rest of the process.
    pub fn apply(&self) {
        match self {
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
            Self::Auto => (),
        }
    }
}

impl FromStr for ColorMode {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "auto" => Ok(Self::Auto),
            _ => Err(AnyError(format!(
                "color mode must be 'always', 'never', or 'auto'"
            ))),
        }
    }
}
