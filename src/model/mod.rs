//! Data model for phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [Tree], which uses the arena pattern to store
//! [Vertex] nodes. Each vertex is either `Internal` or a `Leaf`,
//! referenced by [VertexIndex]. Internal vertices may have any number of
//! children, since consensus trees regularly contain polytomies.
//!
//! # Label handling
//! Every tree owns its taxon namespace as a [LeafLabelMap]; leaves only
//! store a [LabelIndex] into it. Labels are compared verbatim.
//!
//! # Pruning
//! [Tree::prune_to] derives a new tree restricted to a set of labels,
//! leaving the original untouched.

pub mod leaf_label_map;
pub mod tree;
pub mod vertex;

pub use leaf_label_map::{LabelIndex, LeafLabelMap};
pub use tree::{Tree, VertexIndex};
pub use vertex::{BranchLength, Vertex};
