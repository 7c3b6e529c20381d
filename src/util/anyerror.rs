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

use std::error::Error;
use std::fmt::Display;
use std::path::PathBuf;

/// Quickly implement a custom/unique error message.
///
/// Can also be used to wrap an error's message.
#[derive(Debug, PartialEq)]
pub struct AnyError(pub String);

impl Error for AnyError {}

impl Display for AnyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Fault> for AnyError {
    fn from(value: Fault) -> Self {
        AnyError(value.to_string())
    }
}

impl From<&str> for AnyError {
    fn from(value: &str) -> Self {
        AnyError(value.to_string())
    }
}

pub type Fault = Box<dyn Error>;

/// Stores the (file on disk, error message) for failures tied to a specific
/// manifest, dependency list, or import list.
#[derive(Debug)]
pub struct FileFault(pub PathBuf, pub Fault);

impl Error for FileFault {}

impl FileFault {
    pub fn new<E: Into<Fault>>(path: &std::path::Path, err: E) -> Self {
        Self(path.to_path_buf(), err.into())
    }

    /// References the file that produced the error.
    pub fn as_file(&self) -> &PathBuf {
        &self.0
    }
}

impl Display for FileFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to read file {:?}: {}", self.0, self.1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_fault_names_the_file() {
        let err = FileFault::new(
            &PathBuf::from("qml/QtQuick/qmldir"),
            AnyError::from("bad line"),
        );
        assert_eq!(
            err.to_string(),
            "failed to read file \"qml/QtQuick/qmldir\": bad line"
        );
        assert_eq!(err.as_file(), &PathBuf::from("qml/QtQuick/qmldir"));
    }
}
