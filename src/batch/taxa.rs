//! Taxon extraction and the common taxa of a batch.

use crate::error::{Error, Result, ValidationError};
use crate::model::Tree;
use crate::newick;
use std::collections::BTreeSet;
use std::fs;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::debug;

// =#========================================================================#=
// TAXON LABEL SET
// =#========================================================================#=
/// The taxon labels of one tree file, in the order of the tree's namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonLabelSet {
    source: PathBuf,
    labels: Vec<String>,
}

impl TaxonLabelSet {
    /// Creates the label set of `tree`, read from `source`.
    pub fn from_tree(source: impl Into<PathBuf>, tree: &Tree) -> Self {
        Self {
            source: source.into(),
            labels: tree.labels().labels().to_vec(),
        }
    }

    /// File the labels were read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Labels in namespace order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Parses the tree file at `path` and returns the tree and its labels.
///
/// # Errors
/// * [Error::Io] if the file cannot be read
/// * [Error::Parse] if it is not valid Newick
pub fn extract_taxa(path: &Path) -> Result<(Tree, TaxonLabelSet)> {
    let content = fs::read(path).map_err(|err| Error::io(path, err))?;
    let tree = newick::parse_bytes(content).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let labels = TaxonLabelSet::from_tree(path, &tree);
    debug!(file = %path.display(), taxa = labels.len(), "extracted taxa");
    Ok((tree, labels))
}

// =#========================================================================#=
// COMMON TAXA
// =#========================================================================#=
/// The taxa present in every tree of a batch.
///
/// Derefs to a sorted [BTreeSet], so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonTaxa(BTreeSet<String>);

impl CommonTaxa {
    /// Intersects the label sets of all trees.
    ///
    /// The result does not depend on the order of `sets`.
    ///
    /// # Errors
    /// [ValidationError::NoTreeFiles] if `sets` is empty.
    ///
    /// # Example
    /// ```
    /// use nexprune::batch::{CommonTaxa, TaxonLabelSet};
    /// use nexprune::newick::parse_str;
    ///
    /// let first = TaxonLabelSet::from_tree("t1.contree", &parse_str("(A,(B,C));").unwrap());
    /// let second = TaxonLabelSet::from_tree("t2.contree", &parse_str("((B,C),D);").unwrap());
    /// let common = CommonTaxa::resolve(&[first, second]).unwrap();
    ///
    /// assert_eq!(common.iter().collect::<Vec<_>>(), ["B", "C"]);
    /// ```
    pub fn resolve(sets: &[TaxonLabelSet]) -> Result<Self> {
        let (first, rest) = sets.split_first().ok_or(ValidationError::NoTreeFiles)?;

        let mut common: BTreeSet<String> = first.labels.iter().cloned().collect();
        for set in rest {
            let labels: BTreeSet<&str> = set.labels.iter().map(String::as_str).collect();
            common.retain(|label| labels.contains(label.as_str()));
        }

        Ok(Self(common))
    }

    /// The common labels as a set.
    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }
}

impl Deref for CommonTaxa {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BTreeSet<String>> for CommonTaxa {
    fn from(set: BTreeSet<String>) -> Self {
        Self(set)
    }
}
