//! The resource graph: a DAG over project-relative filesystem paths, built
//! from the [`CmdRecord`](crate::analyzer::CmdRecord) stream and rewritten
//! in place by the virtual linker.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyzer::CmdRecord;
use crate::error::{Result, ScanError};
use crate::util;

/// One filesystem resource, keyed by its path relative to the project
/// root. Parent/child links are stored as vertex indices into the owning
/// graph's `vertices` vector.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceVertex {
    pub path: String,
    pub parents: Vec<usize>,
    pub children: Vec<usize>,
    pub indexfile_resources: Vec<String>,
    pub indexfile_path: String,
    pub indexfile_targets: Vec<String>,
}

impl ResourceVertex {
    fn new(path: String) -> Self {
        Self {
            path,
            parents: Vec::new(),
            children: Vec::new(),
            indexfile_resources: Vec::new(),
            indexfile_path: String::new(),
            indexfile_targets: Vec::new(),
        }
    }
}

/// Vertex set plus the derived edge structure. Acyclic by contract;
/// [`topological_sort`](Self::topological_sort) is the primary way callers
/// discover and enforce that.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceGraph {
    vertices: Vec<ResourceVertex>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a record stream, resolving paths against each
    /// record's `pwd` and relativizing them to `project_root`. Records with
    /// a mismatched input/output arity (other than N-to-1 or N-to-N) are
    /// skipped with a warning.
    pub fn from_records(records: &[CmdRecord], project_root: &Path) -> Self {
        let mut graph = Self::new();

        for record in records {
            if record.arginfo.inputs.is_empty() || record.arginfo.outputs.is_empty() {
                continue;
            }
            let Some(pwd) = record.pwd.as_deref() else {
                continue;
            };
            let pwd = Path::new(pwd);

            let inputs: Vec<String> = record
                .arginfo
                .inputs
                .iter()
                .map(|raw| util::project_relative_of(project_root, pwd, raw))
                .collect();
            let outputs: Vec<String> = record
                .arginfo
                .outputs
                .iter()
                .map(|raw| util::project_relative_of(project_root, pwd, raw))
                .collect();

            if outputs.len() == 1 {
                let output = graph.vertex_id(&outputs[0]);
                for input in &inputs {
                    let input = graph.vertex_id(input);
                    graph.add_edge(input, output);
                }
            } else if outputs.len() == inputs.len() {
                for (input, output) in inputs.iter().zip(outputs.iter()) {
                    let input = graph.vertex_id(input);
                    let output = graph.vertex_id(output);
                    graph.add_edge(input, output);
                }
            } else {
                warn!(
                    inputs = inputs.len(),
                    outputs = outputs.len(),
                    "record has mismatched input/output arity; skipping graph edges"
                );
            }
        }

        graph
    }

    pub fn vertices(&self) -> &[ResourceVertex] {
        &self.vertices
    }

    pub fn vertex(&self, idx: usize) -> &ResourceVertex {
        &self.vertices[idx]
    }

    pub fn vertex_mut(&mut self, idx: usize) -> &mut ResourceVertex {
        &mut self.vertices[idx]
    }

    pub fn find(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    /// Finds or creates the vertex for `path`, memoized by relative path.
    pub fn vertex_id(&mut self, path: &str) -> usize {
        if let Some(&id) = self.index.get(path) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(ResourceVertex::new(path.to_string()));
        self.index.insert(path.to_string(), id);
        id
    }

    /// Adds an edge `from -> to`, no-op on self-loops or existing edges.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        if !self.vertices[from].children.contains(&to) {
            self.vertices[from].children.push(to);
        }
        if !self.vertices[to].parents.contains(&from) {
            self.vertices[to].parents.push(from);
        }
    }

    /// Removes a vertex and every edge incident to it, in both directions.
    /// Indices of other vertices are preserved; the removed slot becomes a
    /// tombstone so existing indices stay valid.
    pub fn remove_vertex(&mut self, path: &str) {
        let Some(id) = self.index.remove(path) else {
            return;
        };
        let parents = std::mem::take(&mut self.vertices[id].parents);
        let children = std::mem::take(&mut self.vertices[id].children);
        for p in parents {
            self.vertices[p].children.retain(|&c| c != id);
        }
        for c in children {
            self.vertices[c].parents.retain(|&p| p != id);
        }
        self.vertices[id].path.clear();
    }

    fn is_removed(&self, id: usize) -> bool {
        self.vertices[id].path.is_empty()
    }

    /// Kahn's algorithm over parent edges (`transpose = false`) or child
    /// edges (`transpose = true`). Returns vertex indices in topological
    /// order. Degree bookkeeping is local to the call and never persisted.
    pub fn topological_sort(&self, transpose: bool) -> Result<Vec<usize>> {
        let total = self.index.len();
        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        for &id in self.index.values() {
            let incoming = if transpose { &self.vertices[id].children } else { &self.vertices[id].parents };
            in_degree.insert(id, incoming.len());
        }

        let mut queue: std::collections::VecDeque<usize> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(total);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            let outgoing = if transpose { &self.vertices[id].parents } else { &self.vertices[id].children };
            for &next in outgoing {
                if self.is_removed(next) {
                    continue;
                }
                let deg = in_degree.get_mut(&next).expect("neighbor must be a live vertex");
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() != total {
            return Err(ScanError::GraphCycle { visited: order.len(), total });
        }

        Ok(order)
    }

    /// `(nodes, edges)` suitable for graph visualization tooling.
    pub fn cytoscape_export(&self) -> (Vec<&str>, Vec<(&str, &str)>) {
        let nodes = self.index.values().map(|&id| self.vertices[id].path.as_str()).collect();
        let mut edges = Vec::new();
        for &id in self.index.values() {
            for &child in &self.vertices[id].children {
                edges.push((self.vertices[id].path.as_str(), self.vertices[child].path.as_str()));
            }
        }
        (nodes, edges)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes).map_err(|e| ScanError::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;
        let mut graph: Self = bincode::deserialize(&bytes)?;
        graph.rebuild_index();
        Ok(graph)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.path.is_empty())
            .map(|(id, v)| (v.path.clone(), id))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ArgInfo;

    fn record(inputs: &[&str], outputs: &[&str], pwd: &str) -> CmdRecord {
        CmdRecord {
            argv: vec!["gcc".to_string()],
            pwd: Some(pwd.to_string()),
            arginfo: ArgInfo {
                inputs: inputs.iter().map(|s| s.to_string()).collect(),
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                options: Vec::new(),
                lang: None,
                archs: Vec::new(),
            },
        }
    }

    #[test]
    fn n_to_1_builds_fan_in_edges() {
        let records = vec![record(&["a.c", "b.c"], &["out.o"], "/tmp/p")];
        let graph = ResourceGraph::from_records(&records, Path::new("/tmp/p"));
        let out = graph.find("out.o").unwrap();
        assert_eq!(graph.vertex(out).parents.len(), 2);
    }

    #[test]
    fn n_to_n_builds_parallel_edges() {
        let records = vec![record(&["a.c", "b.c"], &["a.o", "b.o"], "/tmp/p")];
        let graph = ResourceGraph::from_records(&records, Path::new("/tmp/p"));
        let a_o = graph.find("a.o").unwrap();
        let b_o = graph.find("b.o").unwrap();
        assert_eq!(graph.vertex(a_o).parents.len(), 1);
        assert_eq!(graph.vertex(b_o).parents.len(), 1);
    }

    #[test]
    fn mismatched_arity_is_skipped() {
        let records = vec![record(&["a.c", "b.c", "c.c"], &["x.o", "y.o"], "/tmp/p")];
        let graph = ResourceGraph::from_records(&records, Path::new("/tmp/p"));
        assert_eq!(graph.vertices().len(), 0);
    }

    #[test]
    fn topological_sort_orders_edges_correctly() {
        let mut g = ResourceGraph::new();
        let a = g.vertex_id("a.c");
        let o = g.vertex_id("a.o");
        let lib = g.vertex_id("lib.a");
        g.add_edge(a, o);
        g.add_edge(o, lib);

        let order = g.topological_sort(false).unwrap();
        let pos = |id: usize| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(a) < pos(o));
        assert!(pos(o) < pos(lib));
    }

    #[test]
    fn cycle_is_detected() {
        let mut g = ResourceGraph::new();
        let a = g.vertex_id("a");
        let b = g.vertex_id("b");
        g.add_edge(a, b);
        g.add_edge(b, a);

        let err = g.topological_sort(false).unwrap_err();
        matches!(err, ScanError::GraphCycle { .. });
    }

    #[test]
    fn remove_vertex_clears_incident_edges() {
        let mut g = ResourceGraph::new();
        let a = g.vertex_id("a.c");
        let o = g.vertex_id("a.o");
        g.add_edge(a, o);
        g.remove_vertex("a.o");

        assert!(g.vertex(a).children.is_empty());
        assert!(g.find("a.o").is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut g = ResourceGraph::new();
        let a = g.vertex_id("a.c");
        let o = g.vertex_id("a.o");
        g.add_edge(a, o);

        let tmp = tempfile::NamedTempFile::new().unwrap();
        g.save(tmp.path()).unwrap();
        let loaded = ResourceGraph::load(tmp.path()).unwrap();

        assert_eq!(loaded.vertices(), g.vertices());
        assert_eq!(loaded.find("a.c"), g.find("a.c"));
    }

    #[test]
    fn no_self_loops() {
        let mut g = ResourceGraph::new();
        let a = g.vertex_id("a.c");
        g.add_edge(a, a);
        assert!(g.vertex(a).children.is_empty());
    }
}
