//! Structs and logic to parse Newick strings.

use crate::model::{BranchLength, Tree, VertexIndex};
use crate::newick::defs::{DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Parser (configuration) for Newick format phylogenetic trees.
///
/// Parses one tree per call of [parse_str](Self::parse_str); call it
/// repeatedly on the same [ByteParser] to read a sequence of trees.
///
/// # Configuration
/// * [`with_num_leaves(num_leaves)`](Self::with_num_leaves)
///     - Can be configured with number of leaves in trees to parse,
///       otherwise it is inferred from the first parsed tree and then stored.
///
/// # Format
/// * `tree ::= [vertex] ';'`
/// * `vertex ::= internal_vertex | leaf`
/// * `internal_vertex ::= '(' vertex (',' vertex)* ')' [name] [':' number]`
/// * `leaf ::= label [':' number]`
///
/// Furthermore:
/// * Whitespace and `[...]` comments can occur between elements
/// * Labels can be single quoted, with `''` standing for a quote
/// * Underscores in labels are kept as they are
/// * Annotations such as `[&R]` or `[&support=0.9]` are treated as comments
/// * Leaf labels must be unique within a tree
///
/// # Example
/// ```
/// use nexprune::newick::NewickParser;
/// use nexprune::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((A_meleagrides:1.0,A_vulturinum:1.0)95:0.5,N_meleagris:1.5,G_plumifera:1.5);");
/// let tree = NewickParser::new().parse_str(&mut byte_parser).unwrap();
///
/// assert_eq!(tree.num_leaves(), 4);
/// assert!(tree.labels().contains_label("A_meleagrides"));
/// ```
pub struct NewickParser {
    know_num_leaves: bool,
    num_leaves: usize,
}

// ============================================================================
// Construction & Configuration (pub)
// ============================================================================
impl NewickParser {
    /// Creates a new [NewickParser] with default settings:
    /// the number of leaves is unknown and will be counted during parsing.
    pub fn new() -> Self {
        Self {
            know_num_leaves: false,
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
        }
    }

    /// Sets the expected number of leaves in each parsed tree.
    ///
    /// This allows pre-allocation of data structures.
    /// If not set, the parser uses the size of the first parsed tree.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self.know_num_leaves = true;
        self
    }
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Parsing (pub)
// ============================================================================
impl NewickParser {
    /// Parses a single Newick tree, including its terminating `;`.
    ///
    /// Leading whitespace and comments are skipped. An input consisting of
    /// only `;` yields the empty tree.
    ///
    /// # Returns
    /// * `Ok(Tree)` - The parsed phylogenetic tree
    /// * `Err(ParsingError)` - If the Newick format is invalid
    pub fn parse_str(&mut self, parser: &mut ByteParser) -> Result<Tree, ParsingError> {
        let mut tree = Tree::new(self.num_leaves);

        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::unexpected_eof(parser));
        }

        if !parser.peek_is(b';') {
            let root = self.parse_vertex(parser, &mut tree)?;
            tree.set_root(root);
        }

        // Consume the terminating semicolon
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {:?}", parser.peek().map(|b| b as char)),
            ));
        }

        if !self.know_num_leaves {
            self.num_leaves = tree.num_leaves().max(1);
            self.know_num_leaves = true;
        }

        Ok(tree)
    }
}

// ============================================================================
// Parsing Logic (private)
// ============================================================================
impl NewickParser {
    /// Parses a vertex (either internal vertex or leaf) with all its
    /// descendants and returns its index.
    ///
    /// Open groups are kept on an explicit stack, so nesting depth is only
    /// limited by memory.
    fn parse_vertex(&mut self, parser: &mut ByteParser, tree: &mut Tree) -> Result<VertexIndex, ParsingError> {
        // Children parsed so far of each currently open `(`
        let mut open: Vec<Vec<VertexIndex>> = Vec::new();

        loop {
            parser.skip_comment_and_whitespace()?;
            if parser.consume_if(b'(') {
                open.push(Vec::with_capacity(2));
                continue;
            }

            let mut vertex = self.parse_leaf(parser, tree)?;

            // Attach the finished vertex and close as many groups as possible
            loop {
                let Some(children) = open.last_mut() else {
                    return Ok(vertex);
                };
                children.push(vertex);

                parser.skip_comment_and_whitespace()?;
                if parser.consume_if(b',') {
                    break;
                }
                if parser.consume_if(b')') {
                    let children = std::mem::take(children);
                    open.pop();
                    vertex = self.finish_internal_vertex(parser, tree, children)?;
                    continue;
                }
                if parser.is_eof() {
                    return Err(ParsingError::unexpected_eof(parser));
                }
                return Err(ParsingError::invalid_newick_string(
                    parser,
                    format!("Expected ',' or ')' after child but found {:?}", parser.peek().map(|b| b as char)),
                ));
            }
        }
    }

    /// Parses what follows the closing `)` of an internal vertex, adds the
    /// vertex to tree, and returns its index:
    /// - `[name][:branch_length]`
    fn finish_internal_vertex(
        &mut self,
        parser: &mut ByteParser,
        tree: &mut Tree,
        children: Vec<VertexIndex>,
    ) -> Result<VertexIndex, ParsingError> {
        let name = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let name = (!name.is_empty()).then_some(name);
        let branch_length = self.parse_branch_length(parser)?;

        Ok(tree.add_internal_vertex(children, name, branch_length))
    }

    /// Parses leaf vertex and adds it to tree:
    /// - `label[:branch_length]`
    /// - The label must be non-empty and unique within the tree
    fn parse_leaf(&mut self, parser: &mut ByteParser, tree: &mut Tree) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            if parser.is_eof() {
                return Err(ParsingError::unexpected_eof(parser));
            }
            return Err(ParsingError::missing_label(parser));
        }

        let branch_length = self.parse_branch_length(parser)?;

        match tree.add_leaf(&label, branch_length) {
            Some(index) => Ok(index),
            None => Err(ParsingError::duplicate_label(parser, label)),
        }
    }

    /// Parses optional branch length `[:number]`:
    /// - Skips comments/whitespace before and after `:`
    /// - Supports scientific notation (e.g., `1.5e-10`)
    ///
    /// # Returns
    /// - [BranchLength] if found branch length and was able to parse it
    /// - `None` if found no branch length
    /// - [ParsingError] if the value is not a finite number
    fn parse_branch_length(&mut self, parser: &mut ByteParser) -> Result<Option<BranchLength>, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b':') {
            return Ok(None);
        }
        parser.skip_comment_and_whitespace()?;

        let mut branch_length_str = String::new();
        while let Some(b) = parser.peek() {
            // Valid characters for a float: digits, '.', '-', '+', 'e', 'E'
            if b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+' || b == b'e' || b == b'E' {
                branch_length_str.push(b as char);
                parser.next_byte();
            } else {
                break; // Hit a delimiter like ',', ')', ';', or whitespace
            }
        }

        branch_length_str
            .parse::<f64>()
            .ok()
            .and_then(BranchLength::try_new)
            .map(Some)
            .ok_or_else(|| ParsingError::invalid_branch_length(parser, branch_length_str))
    }
}
