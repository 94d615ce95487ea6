//! Low-level parsing infrastructure.
//!
//! This module provides the byte parser underlying the Newick parser,
//! the [ParsingError] it reports, and label escaping helpers.

pub mod byte_parser;
pub mod parsing_error;
pub mod utils;

pub use byte_parser::ByteParser;
pub use parsing_error::{ParsingError, ParsingErrorType};
