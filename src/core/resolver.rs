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

//! Transitive closure of the shared libraries a binary loads at runtime.

use crate::core::platform::Platform;
use crate::core::tool::Process;
use crate::util::anyerror::Fault;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Walks the runtime dependencies of binaries through the platform's
/// inspection tool.
///
/// The direct dependencies of each binary are remembered for the lifetime of
/// the resolver, so the tool runs at most once per unique binary.
pub struct Resolver<'a> {
    platform: &'a dyn Platform,
    process: &'a dyn Process,
    inspected: HashMap<String, Vec<String>>,
}

impl<'a> Resolver<'a> {
    pub fn new(platform: &'a dyn Platform, process: &'a dyn Process) -> Self {
        Self {
            platform: platform,
            process: process,
            inspected: HashMap::new(),
        }
    }

    /// Runs the inspection tool on `binary` unless it was already inspected.
    fn inspect(&mut self, binary: &str) -> Result<&Vec<String>, Fault> {
        if self.inspected.contains_key(binary) == false {
            let output = self
                .process
                .capture(&self.platform.inspect_command(binary))?;
            let deps = self.platform.direct_dependencies(binary, &output)?;
            tracing::debug!("{} directly depends on {} libraries", binary, deps.len());
            self.inspected.insert(binary.to_string(), deps);
        }
        Ok(&self.inspected[binary])
    }

    /// Computes every library reachable from `start`.
    ///
    /// `start` itself is never part of the result, even when a cycle leads
    /// back to it. Any tool or parsing failure aborts the whole walk.
    pub fn resolve(&mut self, start: &str) -> Result<BTreeSet<String>, Fault> {
        let mut visited = HashSet::new();
        let mut resolved = BTreeSet::new();
        let mut to_process = vec![start.to_string()];
        visited.insert(start.to_string());

        while let Some(binary) = to_process.pop() {
            for dep in self.inspect(&binary)? {
                if visited.insert(dep.clone()) == true {
                    resolved.insert(dep.clone());
                    to_process.push(dep.clone());
                }
            }
        }
        tracing::info!("resolved {} libraries for {}", resolved.len(), start);
        Ok(resolved)
    }

    /// Computes the union of the closures of all `starts`.
    ///
    /// Each start is walked on its own, so a start only shows up in the
    /// result when another start depends on it.
    pub fn resolve_all<S: AsRef<str>>(&mut self, starts: &[S]) -> Result<BTreeSet<String>, Fault> {
        let mut libraries = BTreeSet::new();
        for start in starts {
            libraries.append(&mut self.resolve(start.as_ref())?);
        }
        Ok(libraries)
    }

    /// Number of distinct binaries inspected so far.
    pub fn inspections(&self) -> usize {
        self.inspected.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::layout::LinkedModule;
    use crate::core::platform::TargetOs;
    use crate::core::tool::ToolCommand;
    use crate::error::Error;
    use std::cell::RefCell;

    /// A platform whose "tool output" is the comma-separated dependency list.
    #[derive(Debug)]
    struct Listing;

    impl Platform for Listing {
        fn os(&self) -> TargetOs {
            TargetOs::MacOs
        }

        fn namespace(&self) -> &str {
            "Qt"
        }

        fn library_dir(&self) -> Result<&str, Error> {
            Ok("/lib")
        }

        fn inspect_command(&self, binary: &str) -> ToolCommand {
            ToolCommand::new("list").arg(binary)
        }

        fn direct_dependencies(&self, _binary: &str, output: &str) -> Result<Vec<String>, Error> {
            Ok(output
                .split(',')
                .filter(|s| s.is_empty() == false)
                .map(|s| s.to_string())
                .collect())
        }

        fn plugin_file_name(&self, name: &str) -> String {
            name.to_string()
        }

        fn install_paths(&self, library: &str) -> Result<Vec<String>, Error> {
            Ok(vec![library.to_string()])
        }

        fn module_library(&self, _module: &LinkedModule) -> Result<Option<String>, Error> {
            Ok(None)
        }

        fn module_binaries(&self, _module: &LinkedModule) -> Result<Vec<String>, Error> {
            Ok(Vec::new())
        }
    }

    /// An in-memory dependency graph that counts how often each binary is
    /// inspected.
    struct Graph {
        edges: HashMap<&'static str, &'static str>,
        calls: RefCell<HashMap<String, usize>>,
    }

    impl Graph {
        fn new(edges: &[(&'static str, &'static str)]) -> Self {
            Self {
                edges: edges.iter().cloned().collect(),
                calls: RefCell::new(HashMap::new()),
            }
        }

        fn calls(&self, binary: &str) -> usize {
            self.calls.borrow().get(binary).cloned().unwrap_or(0)
        }
    }

    impl Process for Graph {
        fn capture(&self, command: &ToolCommand) -> Result<String, Fault> {
            let binary = command.get_args()[0].as_str();
            *self
                .calls
                .borrow_mut()
                .entry(binary.to_string())
                .or_insert(0) += 1;
            match self.edges.get(binary) {
                Some(deps) => Ok(deps.to_string()),
                None => Err(Error::ChildProcErrorCode(String::from("list"), 1))?,
            }
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cycle_terminates_without_start() {
        let graph = Graph::new(&[("A", "B"), ("B", "A")]);
        let mut resolver = Resolver::new(&Listing, &graph);
        assert_eq!(resolver.resolve("A").unwrap(), set(&["B"]));
        assert_eq!(graph.calls("A"), 1);
        assert_eq!(graph.calls("B"), 1);
    }

    #[test]
    fn self_reference_is_ignored() {
        let graph = Graph::new(&[("A", "A,B"), ("B", "B")]);
        let mut resolver = Resolver::new(&Listing, &graph);
        assert_eq!(resolver.resolve("A").unwrap(), set(&["B"]));
    }

    #[test]
    fn diamond_inspects_shared_dependency_once() {
        let graph = Graph::new(&[("A", "B,C"), ("B", "D"), ("C", "D"), ("D", "")]);
        let mut resolver = Resolver::new(&Listing, &graph);
        assert_eq!(resolver.resolve("A").unwrap(), set(&["B", "C", "D"]));
        assert_eq!(graph.calls("D"), 1);
        assert_eq!(resolver.inspections(), 4);
    }

    #[test]
    fn resolution_is_idempotent() {
        let graph = Graph::new(&[("A", "B,C"), ("B", "C"), ("C", "")]);
        let first = Resolver::new(&Listing, &graph).resolve("A").unwrap();
        let second = Resolver::new(&Listing, &graph).resolve("A").unwrap();
        assert_eq!(first, second);
        assert_eq!(graph.calls("A"), 2);
    }

    #[test]
    fn leaf_has_empty_closure() {
        let graph = Graph::new(&[("A", "")]);
        let mut resolver = Resolver::new(&Listing, &graph);
        assert_eq!(resolver.resolve("A").unwrap(), BTreeSet::new());
    }

    #[test]
    fn tool_failure_aborts_resolution() {
        // C is never described so its inspection fails
        let graph = Graph::new(&[("A", "B,C"), ("B", "")]);
        let mut resolver = Resolver::new(&Listing, &graph);
        let err = resolver.resolve("A").unwrap_err();
        assert_eq!(err.to_string(), "\"list\" exited with error code: 1");
    }

    #[test]
    fn resolve_all_shares_inspections() {
        let graph = Graph::new(&[
            ("plugin1", "QtGui"),
            ("plugin2", "QtGui,QtNetwork"),
            ("QtGui", "QtCore"),
            ("QtNetwork", "QtCore"),
            ("QtCore", ""),
        ]);
        let mut resolver = Resolver::new(&Listing, &graph);
        let libs = resolver.resolve_all(&["plugin1", "plugin2"]).unwrap();
        assert_eq!(libs, set(&["QtCore", "QtGui", "QtNetwork"]));
        assert_eq!(graph.calls("QtGui"), 1);
        assert_eq!(graph.calls("QtCore"), 1);
        // each start still gets its own walk
        assert_eq!(resolver.resolve("plugin2").unwrap(), set(&["QtCore", "QtGui", "QtNetwork"]));
        assert_eq!(graph.calls("plugin2"), 1);
    }
}
