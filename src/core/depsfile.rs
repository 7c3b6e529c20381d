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

//! The dependency list file: one resolved library path per line.

use crate::util::anyerror::{Fault, FileFault};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub fn parse(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(|l| l.trim())
        .filter(|l| l.is_empty() == false)
        .map(|l| l.to_string())
        .collect()
}

pub fn render<'a, I>(libraries: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    libraries
        .into_iter()
        .fold(String::new(), |acc, x| acc + x.as_str() + "\n")
}

pub fn read(path: &Path) -> Result<BTreeSet<String>, Fault> {
    let text = std::fs::read_to_string(path).map_err(|e| FileFault::new(path, e))?;
    Ok(parse(&text))
}

/// Reads every list and merges them into one set.
pub fn read_all(paths: &[PathBuf]) -> Result<BTreeSet<String>, Fault> {
    let mut libraries = BTreeSet::new();
    for path in paths {
        libraries.append(&mut read(path)?);
    }
    Ok(libraries)
}

pub fn write(path: &Path, libraries: &BTreeSet<String>) -> Result<(), Fault> {
    std::fs::write(path, render(libraries)).map_err(|e| FileFault::new(path, e))?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        let text = "\n/opt/Qt/lib/QtCore.framework/Versions/A/QtCore\n\n  \n/opt/Qt/lib/QtGui.framework/Versions/A/QtGui\r\n";
        let libs = parse(text);
        assert_eq!(
            libs,
            BTreeSet::from([
                String::from("/opt/Qt/lib/QtCore.framework/Versions/A/QtCore"),
                String::from("/opt/Qt/lib/QtGui.framework/Versions/A/QtGui"),
            ])
        );
        assert_eq!(parse(""), BTreeSet::new());
    }

    #[test]
    fn render_one_per_line() {
        let libs = BTreeSet::from([String::from("C:/Qt/bin/Qt6Gui.dll"), String::from("C:/Qt/bin/Qt6Core.dll")]);
        assert_eq!(render(&libs), "C:/Qt/bin/Qt6Core.dll\nC:/Qt/bin/Qt6Gui.dll\n");
        assert_eq!(parse(&render(&libs)), libs);
    }

    #[test]
    fn lists_are_unioned() {
        let dir = tempfile::tempdir().unwrap();
        let plugins = dir.path().join("plugins.deps");
        let imports = dir.path().join("imports.deps");
        write(
            &plugins,
            &BTreeSet::from([String::from("C:/Qt/bin/Qt6Gui.dll"), String::from("C:/Qt/bin/Qt6Core.dll")]),
        )
        .unwrap();
        std::fs::write(&imports, "C:/Qt/bin/Qt6Qml.dll\nC:/Qt/bin/Qt6Core.dll\n\n").unwrap();

        let libs = read_all(&[plugins, imports]).unwrap();
        assert_eq!(libs.len(), 3);
        assert!(libs.contains("C:/Qt/bin/Qt6Qml.dll"));

        assert!(read(&dir.path().join("missing.deps")).is_err());
    }
}
