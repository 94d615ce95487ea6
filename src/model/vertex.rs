//! Vertex module for phylogenetic tree representation.

use crate::model::leaf_label_map::LabelIndex;
use crate::model::tree::VertexIndex;
use std::fmt;
use std::ops::Deref;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a phylogenetic tree.
///
/// A vertex can be either:
/// - **Internal**: Has at least one child, might have a name (e.g. a support
///   value) and a branch_length
/// - **Leaf**: Has no children, has label (via index) and might have branch_length
///
/// The root is the one vertex without parent; it is usually internal,
/// but a tree with a single taxon has a leaf as root.
///
/// # Invariants
/// - `index` is index in arena
/// - `parent` is `None` exactly for the root
/// - Internal vertices list their children in Newick order (left to right)
/// - Leaf vertices have a `label_index` into the tree's
///   [LeafLabelMap](crate::model::LeafLabelMap)
#[derive(PartialEq, Debug, Clone)]
pub enum Vertex {
    /// Internal vertex (has children, no taxon label)
    Internal {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex, `None` for the root
        parent: Option<VertexIndex>,
        /// Indices of the child vertices
        children: Vec<VertexIndex>,
        /// Name of the vertex as written in the Newick string, often a support value
        name: Option<String>,
        /// Distance to parent node
        branch_length: Option<BranchLength>,
    },
    /// Leaf vertex (has label, no children)
    Leaf {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex, `None` for a single-leaf tree
        parent: Option<VertexIndex>,
        /// Index into the label map of the tree
        label_index: LabelIndex,
        /// Distance to parent node
        branch_length: Option<BranchLength>,
    },
}

impl Vertex {
    /// Creates a new internal vertex without parent.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `children` - Child indices in Newick order
    /// * `name` - Optional vertex name
    /// * `branch_length` - Distance to parent node
    pub fn new_internal(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        name: Option<String>,
        branch_length: Option<BranchLength>,
    ) -> Self {
        Vertex::Internal {
            index,
            parent: None,
            children,
            name,
            branch_length,
        }
    }

    /// Creates a new leaf vertex without parent.
    ///
    /// # Arguments
    /// * `index` - The unique index of this vertex in the tree (arena)
    /// * `branch_length` - Distance to parent node
    /// * `label_index` - Index into the label map for this leaf's label
    pub fn new_leaf(index: VertexIndex, branch_length: Option<BranchLength>, label_index: LabelIndex) -> Self {
        Vertex::Leaf {
            index,
            parent: None,
            label_index,
            branch_length,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        match self {
            Vertex::Internal { index, .. } | Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns the branch length, if any.
    pub fn branch_length(&self) -> Option<BranchLength> {
        match self {
            Vertex::Internal { branch_length, .. } | Vertex::Leaf { branch_length, .. } => *branch_length,
        }
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length().is_some()
    }

    /// Returns label index if this is a leaf, else `None`.
    pub fn label_index(&self) -> Option<LabelIndex> {
        match self {
            Vertex::Leaf { label_index, .. } => Some(*label_index),
            Vertex::Internal { .. } => None,
        }
    }

    /// Returns the name if this is a named internal vertex, else `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Vertex::Internal { name, .. } => name.as_deref(),
            Vertex::Leaf { .. } => None,
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex (including an internal root).
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_index().is_none()
    }

    /// Returns the children of an internal vertex, or an empty slice for a leaf.
    pub fn children(&self) -> &[VertexIndex] {
        match self {
            Vertex::Internal { children, .. } => children,
            Vertex::Leaf { .. } => &[],
        }
    }

    /// Returns the index of the parent, `None` for the root.
    pub fn parent_index(&self) -> Option<VertexIndex> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => *parent,
        }
    }

    /// Sets a new branch length.
    pub fn set_branch_length(&mut self, new_length: Option<BranchLength>) {
        match self {
            Vertex::Internal { branch_length, .. } | Vertex::Leaf { branch_length, .. } => *branch_length = new_length,
        }
    }

    /// Sets a new parent.
    pub fn set_parent(&mut self, new_parent: Option<VertexIndex>) {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => *parent = new_parent,
        }
    }
}


// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced finite.
///
/// Represents the evolutionary distance between a vertex and its parent.
/// Negative values are accepted, since distance methods such as
/// neighbour joining can produce them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is not finite; use [BranchLength::try_new] for unchecked input.
    pub fn new(length: f64) -> Self {
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }

    /// Creates a new branch length, or `None` if `length` is NaN or infinite.
    pub fn try_new(length: f64) -> Option<Self> {
        length.is_finite().then_some(BranchLength(length))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl std::ops::Add for BranchLength {
    type Output = BranchLength;

    /// Saturates at `±f64::MAX` instead of overflowing to infinity.
    fn add(self, other: BranchLength) -> BranchLength {
        let sum = self.0 + other.0;
        BranchLength::try_new(sum).unwrap_or(BranchLength(f64::MAX.copysign(sum)))
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // f64's Display is the shortest representation that parses back to the same value
        write!(f, "{}", self.0)
    }
}
