//! Tree module for phylogenetic tree representation.
//!
//! This module provides the core data structure for representing phylogenetic trees:
//! - [Tree]: The tree structure using the arena pattern, owning its taxon namespace.
//! - [VertexIndex] is used to index vertices.
//!
//! Pruning never modifies a tree in place; [Tree::prune_to] derives a new one.

use crate::model::leaf_label_map::{LabelIndex, LeafLabelMap};
use crate::model::vertex::{BranchLength, Vertex};
use std::collections::BTreeSet;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;


// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A phylogenetic tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by [VertexIndex].
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena
/// - Index of root is maintained; an empty tree has no root
/// - Internal vertices may have any number of children (multifurcations)
/// - Leaves contain a [LabelIndex] pointing into the tree's own [LeafLabelMap]
/// - Leaf labels are unique within a tree
///
/// # Construction
/// Bottom-up: add leaves, then internal vertices referencing already added
/// children, and finally declare the root with [Tree::set_root].
/// Test validity with [Tree::is_valid].
///
/// # Example
/// ```
/// use nexprune::model::{BranchLength, Tree};
///
/// // Create a tree: ((A:0.2,B:0.2):0.2,C:0.4);
/// let mut tree = Tree::new(3);
/// let a = tree.add_leaf("A", Some(BranchLength::new(0.2))).unwrap();
/// let b = tree.add_leaf("B", Some(BranchLength::new(0.2))).unwrap();
/// let c = tree.add_leaf("C", Some(BranchLength::new(0.4))).unwrap();
/// let ab = tree.add_internal_vertex(vec![a, b], None, Some(BranchLength::new(0.2)));
/// let root = tree.add_internal_vertex(vec![ab, c], None, None);
/// tree.set_root(root);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.labels().labels(), ["A", "B", "C"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree, `None` while constructing or if empty
    root_index: Option<VertexIndex>,

    /// Taxon namespace of this tree
    labels: LeafLabelMap,
}

// ============================================================================
// New, Construction (pub)
// ============================================================================
impl Tree {
    /// Creates a new, empty tree with capacity for `num_leaves` leaves.
    pub fn new(num_leaves: usize) -> Self {
        let capacity = (2 * num_leaves).saturating_sub(1);
        Tree {
            vertices: Vec::with_capacity(capacity),
            root_index: None,
            labels: LeafLabelMap::new(num_leaves),
        }
    }

    /// Adds a leaf to the tree, registering its label in the tree's namespace.
    ///
    /// # Returns
    /// * `Some(index)` - index of the newly created leaf vertex
    /// * `None` - if a leaf with the same label already exists in this tree
    pub fn add_leaf(&mut self, label: &str, branch_length: Option<BranchLength>) -> Option<VertexIndex> {
        let label_index = self.labels.insert_new(label)?;
        Some(self.push_leaf(label_index, branch_length))
    }

    /// Adds an internal vertex above the given, already added children,
    /// assigning a unique index, which gets returned.
    ///
    /// # Arguments
    /// * `children` - Child indices in Newick order
    /// * `name` - Optional name (e.g. support value) of the vertex
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    pub fn add_internal_vertex(
        &mut self,
        children: Vec<VertexIndex>,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(Some(index));
        }
        self.vertices.push(Vertex::new_internal(index, children, name, branch_length));
        index
    }

    /// Declares the vertex at `index` to be the root.
    pub fn set_root(&mut self, index: VertexIndex) {
        self.root_index = Some(index);
    }

    fn push_leaf(&mut self, label_index: LabelIndex, branch_length: Option<BranchLength>) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_leaf(index, branch_length, label_index));
        index
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - An empty tree has neither vertices nor labels
    /// - Root index is valid and the root has no parent
    /// - All vertex indices match their position in the arena
    /// - All child indices are valid and point back to correct parent
    /// - All non-root vertices have a parent listing them as child
    /// - Each label of the namespace is used by exactly one leaf
    /// - All vertices are reachable from the root
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        let Some(root_index) = self.root_index else {
            return self.vertices.is_empty() && self.labels.is_empty();
        };

        if root_index >= self.vertices.len() || !self.vertices[root_index].is_root() {
            return false;
        }

        let mut label_used = vec![false; self.labels.num_labels()];

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }

            // Only the root may lack a parent
            if vertex.is_root() != (index == root_index) {
                return false;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() || self.vertices[child].parent_index() != Some(index) {
                    return false;
                }
            }

            if let Some(parent) = vertex.parent_index() {
                if parent >= self.vertices.len() || !self.vertices[parent].children().contains(&index) {
                    return false;
                }
            }

            if vertex.is_internal() && vertex.children().is_empty() {
                return false;
            }

            if let Some(label_index) = vertex.label_index() {
                match label_used.get_mut(label_index) {
                    Some(used) if !*used => *used = true,
                    _ => return false,
                }
            }
        }

        label_used.iter().all(|&used| used) && self.pre_order_iter().count() == self.vertices.len()
    }
}

// ============================================================================
// Getters / Accessors (pub)
// ============================================================================
impl Tree {
    /// Returns the taxon namespace of this tree.
    pub fn labels(&self) -> &LeafLabelMap {
        &self.labels
    }

    /// Returns the taxon labels of this tree as a set.
    pub fn label_set(&self) -> BTreeSet<String> {
        self.labels.to_set()
    }

    /// Returns the label of a leaf vertex, `None` for internal vertices.
    pub fn leaf_label(&self, vertex: &Vertex) -> Option<&str> {
        vertex.label_index().and_then(|index| self.labels.get_label(index))
    }

    /// Returns the leaf labels in Newick order (left to right).
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.pre_order_iter()
            .filter_map(|vertex| self.leaf_label(vertex))
            .collect()
    }

    /// Returns whether this tree has no vertices.
    pub fn is_empty(&self) -> bool {
        self.root_index.is_none()
    }

    /// Returns the index of the root, `None` for an empty tree.
    pub fn root_index(&self) -> Option<VertexIndex> {
        self.root_index
    }

    /// Returns a reference to the root vertex, `None` for an empty tree.
    pub fn root(&self) -> Option<&Vertex> {
        self.root_index.map(|index| &self[index])
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices (root included) in this tree.
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

impl std::ops::Index<VertexIndex> for Tree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

// ============================================================================
// Pruning (pub)
// ============================================================================
impl Tree {
    /// Returns a copy of this tree restricted to the taxa in `keep`.
    ///
    /// See [Tree::prune_where] for the rules applied.
    ///
    /// # Example
    /// ```
    /// use std::collections::BTreeSet;
    /// use nexprune::newick::{parse_str, to_newick};
    ///
    /// let tree = parse_str("((A:1,B:2):3,(C:4,D:5):6);").unwrap();
    /// let keep: BTreeSet<String> = ["A", "C", "D"].iter().map(|s| s.to_string()).collect();
    /// let pruned = tree.prune_to(&keep);
    ///
    /// assert_eq!(to_newick(&pruned), "(A:4,(C:4,D:5):6);");
    /// assert_eq!(tree.num_leaves(), 4); // original untouched
    /// ```
    pub fn prune_to(&self, keep: &BTreeSet<String>) -> Tree {
        self.prune_where(|label| keep.contains(label))
    }

    /// Returns a copy of this tree containing only the leaves whose label
    /// satisfies `keep`.
    ///
    /// - Internal vertices losing all children are removed.
    /// - An internal vertex left with a single child by the removal is
    ///   suppressed: the child takes its place and the two branch lengths are
    ///   added up (an absent length counts as nothing, two absent lengths stay
    ///   absent). If this happens at the root, the child becomes the root.
    /// - Vertices that had a single child already in `self` are kept, so that
    ///   pruning without removing any leaf yields an identical tree.
    /// - The namespace of the result lists the retained labels in the order of
    ///   the namespace of `self`.
    ///
    /// If no leaf is retained the result is the empty tree.
    pub fn prune_where<F: Fn(&str) -> bool>(&self, keep: F) -> Tree {
        let mut pruned = Tree::new(self.labels.num_labels());

        // Namespace order of the retained labels
        let mut new_label_index = vec![None; self.labels.num_labels()];
        for (index, label) in self.labels.labels().iter().enumerate() {
            if keep(label) {
                new_label_index[index] = Some(pruned.labels.get_or_insert(label));
            }
        }

        // Image of each original vertex in the pruned arena (post-order, so children come first)
        let mut image: Vec<Option<VertexIndex>> = vec![None; self.vertices.len()];
        for vertex in self.post_order_iter() {
            let mapped = match vertex {
                Vertex::Leaf { label_index, branch_length, .. } => new_label_index[*label_index]
                    .map(|label_index| pruned.push_leaf(label_index, *branch_length)),
                Vertex::Internal { children, name, branch_length, .. } => {
                    let kept: Vec<VertexIndex> = children.iter().filter_map(|&child| image[child]).collect();
                    match kept.len() {
                        0 => None,
                        1 if children.len() > 1 => {
                            let child = kept[0];
                            let merged = merge_branch_lengths(pruned[child].branch_length(), *branch_length);
                            pruned.vertices[child].set_branch_length(merged);
                            Some(child)
                        }
                        _ => Some(pruned.add_internal_vertex(kept, name.clone(), *branch_length)),
                    }
                }
            };
            image[vertex.index()] = mapped;
        }

        pruned.root_index = self.root_index.and_then(|root| image[root]);
        pruned
    }
}

/// Length of the edge replacing two consecutive edges.
fn merge_branch_lengths(lower: Option<BranchLength>, upper: Option<BranchLength>) -> Option<BranchLength> {
    match (lower, upper) {
        (Some(lower), Some(upper)) => Some(lower + upper),
        (lower, upper) => lower.or(upper),
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited after all its descendants have been visited,
/// children from left to right.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let stack = tree.root_index.map(|root| vec![(root, false)]).unwrap_or_default();
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            if children_visited || vertex.is_leaf() {
                return Some(vertex);
            }

            self.stack.push((index, true));
            // Push children in reverse, so leftmost is processed first
            for &child in vertex.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each vertex is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree) -> Self {
        let stack = tree.root_index.map(|root| vec![root]).unwrap_or_default();
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        for &child in vertex.children().iter().rev() {
            self.stack.push(child);
        }

        Some(vertex)
    }
}
