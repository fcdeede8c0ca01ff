//! Threads per-TU `.index` artifacts through the resource graph so that a
//! CTU-mode analysis of a downstream translation unit can see every
//! upstream index.

use std::fs;
use std::path::Path;

use tracing::trace;

use crate::error::{Result, ScanError};
use crate::graph::ResourceGraph;

/// Runs the seed / forward-merge / prune / backward-accumulate passes
/// described for the virtual linker, mutating `graph` in place. `ast_dir`
/// is the directory holding both source `.index` files (dropped there by
/// the fake compiler's single-TU phase) and the merged indexes this
/// function creates.
pub fn link(graph: &mut ResourceGraph, ast_dir: &Path) -> Result<()> {
    seed_sources(graph, ast_dir);
    forward_merge(graph, ast_dir)?;
    prune_unindexed(graph);
    backward_accumulate(graph)?;
    Ok(())
}

fn seed_sources(graph: &mut ResourceGraph, ast_dir: &Path) {
    let ids: Vec<usize> = (0..graph.vertices().len())
        .filter(|&id| graph.vertex(id).parents.is_empty() && !graph.vertex(id).path.is_empty())
        .collect();

    for id in ids {
        let candidate = ast_dir.join(format!("{}.index", graph.vertex(id).path));
        if candidate.is_file() {
            graph
                .vertex_mut(id)
                .indexfile_resources
                .push(candidate.to_string_lossy().into_owned());
        }
    }
}

fn forward_merge(graph: &mut ResourceGraph, ast_dir: &Path) -> Result<()> {
    let order = graph.topological_sort(false)?;

    for id in order {
        let resources = graph.vertex(id).indexfile_resources.clone();
        let merged_path = match resources.as_slice() {
            [] => None,
            [single] => Some(single.clone()),
            many => {
                let path = ast_dir.join(format!("{}.index", graph.vertex(id).path));
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
                }
                concatenate(many, &path)?;
                Some(path.to_string_lossy().into_owned())
            }
        };

        if let Some(path) = merged_path {
            graph.vertex_mut(id).indexfile_path = path.clone();
            let children = graph.vertex(id).children.clone();
            for child in children {
                graph.vertex_mut(child).indexfile_resources.push(path.clone());
            }
        }
    }

    Ok(())
}

fn concatenate(sources: &[String], dest: &Path) -> Result<()> {
    let mut out = Vec::new();
    for source in sources {
        let bytes = fs::read(source).map_err(|e| ScanError::io(source, e))?;
        out.extend_from_slice(&bytes);
    }
    fs::write(dest, out).map_err(|e| ScanError::io(dest, e))?;
    trace!(dest = %dest.display(), count = sources.len(), "merged index files");
    Ok(())
}

fn prune_unindexed(graph: &mut ResourceGraph) {
    let paths: Vec<String> = graph
        .vertices()
        .iter()
        .filter(|v| !v.path.is_empty() && v.indexfile_path.is_empty())
        .map(|v| v.path.clone())
        .collect();
    for path in paths {
        graph.remove_vertex(&path);
    }
}

fn backward_accumulate(graph: &mut ResourceGraph) -> Result<()> {
    let order = graph.topological_sort(true)?;

    for id in order {
        if graph.vertex(id).children.is_empty() {
            let path = graph.vertex(id).indexfile_path.clone();
            if !path.is_empty() && Path::new(&path).exists() {
                graph.vertex_mut(id).indexfile_targets = vec![path];
            }
        }

        let targets = graph.vertex(id).indexfile_targets.clone();
        let parents = graph.vertex(id).parents.clone();
        for parent in parents {
            graph.vertex_mut(parent).indexfile_targets.extend(targets.iter().cloned());
        }
    }

    Ok(())
}
