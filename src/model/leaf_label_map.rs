//! Leaf label module for phylogenetic tree representation.
//!
//! - `LeafLabelMap`: Taxon namespace of a tree, storage and lookup of its leaf labels.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Index of a leaf label in a [LeafLabelMap].
pub type LabelIndex = usize;

// =#========================================================================#=
// LEAF LABEL MAP
// =#========================================================================#=
/// Maps leaf labels (strings) to compact indices.
///
/// Each [Tree](crate::model::Tree) owns one map, its taxon namespace.
/// Labels keep the order in which they were first inserted,
/// which for a parsed tree is the order of appearance in the Newick string.
/// Labels are matched exactly: case-sensitive, no whitespace trimming,
/// underscores are not spaces.
///
/// # Example
/// ```
/// use nexprune::model::LeafLabelMap;
///
/// let mut labels = LeafLabelMap::new(3);
///
/// let idx_a = labels.get_or_insert("A");  // idx_a = 0
/// let idx_b = labels.get_or_insert("B");  // idx_b = 1
/// let idx_a2 = labels.get_or_insert("A"); // idx_a2 = 0 (deduplicated)
///
/// assert_eq!(idx_a, idx_a2);
/// assert_eq!(labels.get_label(idx_b), Some("B"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafLabelMap {
    /// List of unique labels
    labels: Vec<String>,
    /// Map from label to its index
    map: HashMap<String, LabelIndex>,
}

impl LeafLabelMap {
    /// Creates a new LeafLabelMap with pre-allocated capacity.
    ///
    /// # Arguments
    /// * `num_leaves` - Expected number of unique leaf labels
    pub fn new(num_leaves: usize) -> Self {
        LeafLabelMap {
            labels: Vec::with_capacity(num_leaves),
            map: HashMap::with_capacity(num_leaves),
        }
    }

    /// Gets the index for a label, inserting it if it doesn't exist.
    ///
    /// # Arguments
    /// * `label` - The label string to look up or insert
    ///
    /// # Returns
    /// The index associated with this label
    pub fn get_or_insert(&mut self, label: &str) -> LabelIndex {
        if let Some(&index) = self.map.get(label) {
            index
        } else {
            let index = self.labels.len();
            self.labels.push(label.to_string());
            self.map.insert(label.to_string(), index);
            index
        }
    }

    /// Inserts a label that must not be present yet.
    ///
    /// # Returns
    /// * `Some(index)` - index of the newly inserted label
    /// * `None` - if the label already existed
    pub fn insert_new(&mut self, label: &str) -> Option<LabelIndex> {
        if self.map.contains_key(label) {
            return None;
        }
        Some(self.get_or_insert(label))
    }

    /// Retrieves the index for a given label.
    pub fn get_index(&self, label: &str) -> Option<LabelIndex> {
        self.map.get(label).copied()
    }

    /// Retrieves the leaf label for a given index.
    ///
    /// # Returns
    /// `Some(&str)` if the index is valid, `None` otherwise
    pub fn get_label(&self, index: LabelIndex) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Checks if a label exists in the map.
    pub fn contains_label(&self, label: &str) -> bool {
        self.map.contains_key(label)
    }

    /// Returns the number of labels currently stored.
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Returns whether no label is stored.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the labels in namespace order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the labels as a set, e.g. to compare namespaces irrespective of order.
    pub fn to_set(&self) -> BTreeSet<String> {
        self.labels.iter().cloned().collect()
    }
}

impl fmt::Display for LeafLabelMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LeafLabelMap ({} labels):", self.labels.len())?;
        for (idx, label) in self.labels.iter().enumerate() {
            writeln!(f, "  [{}] {}", idx, label)?;
        }
        Ok(())
    }
}

impl std::ops::Index<LabelIndex> for LeafLabelMap {
    type Output = str;

    fn index(&self, index: LabelIndex) -> &Self::Output {
        &self.labels[index]
    }
}
