//! Error types of the reconciliation pipeline.
//!
//! Every error aborts the batch it occurs in; there is no partial-success
//! mode and no retry.

use crate::parser::ParsingError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reconciling a batch.
#[derive(Error, Debug)]
pub enum Error {
    /// The batch inputs are inconsistent; raised before any file is parsed or written
    #[error("Invalid batch input: {0}")]
    Validation(#[from] ValidationError),

    /// A tree file is not valid Newick
    #[error("Could not parse tree file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParsingError,
    },

    /// The alignment file does not follow the expected layout
    #[error("Invalid alignment: {0}")]
    Format(#[from] FormatError),

    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be read or is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// The trees of a batch share no taxon and the policy forbids degenerate output
    #[error("Trees of batch '{batch}' have no taxon in common")]
    EmptyCommonTaxa { batch: String },
}

impl Error {
    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io { path: path.as_ref().to_path_buf(), source }
    }
}

/// Inconsistent batch inputs, detected before any processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Not exactly one file ends in the alignment suffix
    #[error("expected exactly one alignment file ending in '{suffix}', found {}: [{}]", .found.len(), DisplayPaths(.found))]
    AlignmentCount { suffix: String, found: Vec<PathBuf> },

    /// Only an alignment was given
    #[error("no tree files given")]
    NoTreeFiles,

    /// The same file was listed more than once
    #[error("file listed more than once: {}", .0.display())]
    DuplicateInput(PathBuf),

    /// Two inputs would be written to the same output file
    #[error("inputs [{}] would all be written to {}", DisplayPaths(.inputs), .output.display())]
    OutputCollision { output: PathBuf, inputs: Vec<PathBuf> },
}

/// Malformed alignment content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Sequence content appears before the first header line
    #[error("{}:{line}: sequence content before the first '>' header", .path.display())]
    ContentBeforeHeader { path: PathBuf, line: usize },
}

/// Comma separated display of paths for error messages.
struct DisplayPaths<'a>(&'a [PathBuf]);

impl fmt::Display for DisplayPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (position, path) in self.0.iter().enumerate() {
            if position > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}
