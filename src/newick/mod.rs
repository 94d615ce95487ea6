//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick format strings
//! into [`Tree`]s and the functions to serialise them again.
//!
//! # Quick API
//! * [`parse_str`] / [`parse_bytes`] - parse the (first) tree of a string or file content
//! * [`to_newick`] - serialise a tree
//! * [`write_newick_file`] - write trees, one per line
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= [vertex] ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [name] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Underscores are kept verbatim, so `Homo_sapiens` stays `Homo_sapiens`
//!
//! Round trip guarantee: for any parsed tree `t`,
//! `parse_str(to_newick(&t))` yields a tree equal to `t`.

mod defs;
mod parser;
mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{to_newick, write_newick_file};

use crate::model::Tree;
use crate::parser::ByteParser;
use crate::parser::ParsingError;
use tracing::warn;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses the first Newick tree of a string.
///
/// This is a convenience function using default settings and thus not
/// requiring configuration of a parser. Content after the first tree is
/// ignored (with a warning logged), as tree files handed to this tool are
/// expected to hold a single tree.
///
/// # Example
/// ```
/// use nexprune::newick::parse_str;
///
/// let tree = parse_str("(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));").unwrap();
/// assert_eq!(tree.labels().labels(), ["Fratercula_cirrhata", "Fratercula_arctica", "Fratercula_corniculata"]);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<Tree, ParsingError> {
    parse_bytes(newick.as_ref().as_bytes().to_vec())
}

/// Parses the first Newick tree of raw file content.
///
/// See [parse_str].
pub fn parse_bytes(content: Vec<u8>) -> Result<Tree, ParsingError> {
    let mut byte_parser = ByteParser::new(content);
    let tree = NewickParser::new().parse_str(&mut byte_parser)?;

    let trailing_ok = byte_parser.skip_comment_and_whitespace().is_ok();
    if !trailing_ok || !byte_parser.is_eof() {
        warn!(
            position = byte_parser.position(),
            "ignoring content after the first tree"
        );
    }

    Ok(tree)
}
