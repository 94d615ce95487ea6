//! Pruning the trees of a batch to the common taxa.

use crate::batch::CommonTaxa;
use crate::model::Tree;
use crate::newick::to_newick;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A tree pruned to the common taxa, together with the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedTree {
    source: PathBuf,
    tree: Tree,
    newick: String,
}

impl PrunedTree {
    /// Prunes `tree` to `common`; `tree` itself is left unchanged.
    pub fn new(source: impl Into<PathBuf>, tree: &Tree, common: &CommonTaxa) -> Self {
        let pruned = tree.prune_to(common);
        let newick = to_newick(&pruned);
        Self {
            source: source.into(),
            tree: pruned,
            newick,
        }
    }

    /// Tree file the tree was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Newick string of the pruned tree, terminated by `;`.
    pub fn newick(&self) -> &str {
        &self.newick
    }
}

/// Prunes every tree to `common`, keeping the processing order.
pub fn prune_trees<'a, I>(trees: I, common: &CommonTaxa) -> Vec<PrunedTree>
where
    I: IntoIterator<Item = (&'a Path, &'a Tree)>,
{
    trees
        .into_iter()
        .map(|(source, tree)| {
            let pruned = PrunedTree::new(source, tree, common);
            debug!(
                file = %source.display(),
                leaves_before = tree.num_leaves(),
                leaves_after = pruned.tree.num_leaves(),
                "pruned tree"
            );
            pruned
        })
        .collect()
}
