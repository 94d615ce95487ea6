//! Newick format serialisation and file writing.

use crate::model::{BranchLength, Tree, VertexIndex};
use crate::parser::utils::escape_label;
use std::io::{self, Write};

/// Extra buffer in Newick string length/capacity estimate
const BUFFER_CHARS: usize = 10;

/// Writes the given trees in Newick format, one tree per line.
///
/// Each tree is written as a complete Newick string followed by a newline.
///
/// # Errors
/// Returns an I/O error if writing fails.
///
/// # Example
/// ```
/// use nexprune::newick::{parse_str, write_newick_file};
///
/// let trees = vec![parse_str("(A,B);").unwrap(), parse_str("(B,A);").unwrap()];
/// let mut out = Vec::new();
/// write_newick_file(&mut out, &trees).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "(A,B);\n(B,A);\n");
/// ```
pub fn write_newick_file<'a, W, I>(mut writer: W, trees: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Tree>,
{
    for tree in trees {
        writer.write_all(to_newick(tree).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()
}

/// Returns the Newick representation of this tree with closing semicolon.
///
/// Labels and vertex names are escaped only if necessary (see
/// [escape_label]); branch lengths use the shortest decimal form that reads
/// back to the same value. The empty tree is written as `;`.
///
/// # Example
/// ```
/// use nexprune::newick::{parse_str, to_newick};
///
/// let tree = parse_str("('Little Spotted Kiwi':1.0,'Great Spotted Kiwi':1.0,Okarito_Brown_Kiwi:1.5)100;").unwrap();
/// assert_eq!(
///     to_newick(&tree),
///     "('Little Spotted Kiwi':1,'Great Spotted Kiwi':1,Okarito_Brown_Kiwi:1.5)100;"
/// );
/// ```
pub fn to_newick(tree: &Tree) -> String {
    // Helper for adding branch lengths
    fn build_newick_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
        if let Some(branch_length) = branch_length {
            newick.push(':');
            newick.push_str(&branch_length.to_string());
        }
    }

    // Pending output while walking the tree
    enum Step {
        Enter(VertexIndex),
        Comma,
        Close(VertexIndex),
    }

    // Iterative helper for building the Newick string
    fn build_newick(tree: &Tree, newick: &mut String, root: VertexIndex) {
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(index) => {
                    let vertex = &tree[index];
                    if let Some(label) = tree.leaf_label(vertex) {
                        newick.push_str(&escape_label(label));
                        build_newick_branch_length(newick, vertex.branch_length());
                        continue;
                    }

                    newick.push('(');
                    stack.push(Step::Close(index));
                    for (position, &child) in vertex.children().iter().enumerate().rev() {
                        stack.push(Step::Enter(child));
                        if position > 0 {
                            stack.push(Step::Comma);
                        }
                    }
                }
                Step::Comma => newick.push(','),
                Step::Close(index) => {
                    let vertex = &tree[index];
                    newick.push(')');
                    if let Some(name) = vertex.name() {
                        newick.push_str(&escape_label(name));
                    }
                    build_newick_branch_length(newick, vertex.branch_length());
                }
            }
        }
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree));
    if let Some(root) = tree.root_index() {
        build_newick(tree, &mut newick, root);
    }
    newick.push(';');

    newick
}

/// Estimates the length of a Newick string for a given tree,
/// accounting for structure, labels, and branch lengths.
/// The estimate is used to pre-allocate string capacity.
pub(crate) fn estimate_newick_len(tree: &Tree) -> usize {
    // Each internal node: "(,)" ~= 3 chars
    const INTERNAL_NODE_CHARS: usize = 3;
    // Branch lengths: ~20 chars each (e.g., ":0.009529961339106089")
    const BRANCH_LENGTH_CHARS: usize = 20;

    let structure_capacity = tree.num_internal() * INTERNAL_NODE_CHARS;
    let label_capacity: usize = tree.labels().labels().iter().map(|label| label.len() + 2).sum();
    let branch_capacity = tree.num_vertices() * BRANCH_LENGTH_CHARS;

    structure_capacity + label_capacity + branch_capacity + BUFFER_CHARS
}
