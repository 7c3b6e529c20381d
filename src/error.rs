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

use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("failed to parse {0} output: {1}")]
    FormatMismatch(&'static str, String),
    #[error("invalid framework library path {0:?}")]
    InvalidFrameworkPath(String),
    #[error("plugin {0:?} is not specified as \"plugintype/pluginname\"")]
    MalformedPluginSpec(String),
    #[error("path {0:?} is not located under {1:?}")]
    PathOutsideRoot(String, String),
    #[error("failed to execute {0:?}: {1}")]
    ToolProcFailed(String, LastError),
    #[error("{0:?} exited with error code: {1}")]
    ChildProcErrorCode(String, i32),
    #[error("{0:?} terminated by signal")]
    ChildProcTerminated(String),
    #[error("target os {0:?} is not supported{1}")]
    UnsupportedPlatform(String, Hint),
    #[error("missing setting {0:?}{1}")]
    MissingSetting(String, Hint),
    #[error("failed to load configuration {0:?}: {1}")]
    ConfigNotLoaded(PathBuf, LastError),
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl Error {
    pub fn lowerize(s: String) -> String {
        // get the first word
        let first_word = match s.split_whitespace().next() {
            Some(w) => w,
            None => return s,
        };
        // retain punctuation if the first word is all-caps and longer than 1 character
        if first_word.len() > 1
            && first_word
                .chars()
                .find(|c| c.is_ascii_lowercase() == true)
                .is_none()
        {
            s.to_string()
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    SupportedPlatforms,
    SetInConfig(&'static str),
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::SupportedPlatforms => {
                String::from("set `target.os` to \"macos\" or \"windows\" in the configuration")
            }
            Self::SetInConfig(key) => format!(
                "set `{}` in the configuration file or pass it on the command-line",
                key
            ),
        };
        write!(f, "\n\n{}: {}", "hint".green(), Error::lowerize(message))
    }
}
