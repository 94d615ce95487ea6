//! Nexprune reconciles phylogenetic trees and a sequence alignment to the
//! taxa they all share.
//!
//! Given several Newick tree files and one FASTA-like alignment, it computes
//! the taxa present in every tree, prunes each tree and the alignment to that
//! set, and writes the pruned files together with a tree list and a manifest
//! recording the processing order. Downstream topology tests can then compare
//! the trees directly.
//!
//! Core functionality provided:
//! - Tree model: arena based [Tree](crate::model::Tree) with arbitrary arity,
//!   branch lengths and a per-tree taxon namespace; mutation-free pruning.
//!   See [crate::model].
//! - Newick: parse the first tree of a string or file, serialise trees with
//!   labels kept verbatim (underscores are never read as spaces).
//!   See [crate::newick].
//! - Alignment: stream an alignment and keep only the records of given taxa,
//!   byte-exact. See [crate::alignment].
//! - Batches: classify inputs, resolve the common taxa, prune and write.
//!   See [crate::batch].
//! - Configuration: batches, naming and policies from a TOML file.
//!   See [crate::config].
//!
//! Limitations:
//! - One alignment per batch
//! - Only the first tree of each tree file is read
//! - Sequences are not validated
//!
//! # Usage patterns
//! 1. [reconcile_files] runs a batch with default settings.
//! 2. Build a [Config](crate::config::Config) (or load one with
//!    [Config::from_file](crate::config::Config::from_file)) and call
//!    [run_batch](crate::batch::run_batch) / [run_all](crate::batch::run_all).
//!
//! ## Example
//! ```no_run
//! use std::path::PathBuf;
//! use nexprune::reconcile_files;
//!
//! let files: Vec<PathBuf> = ["AA_dataset.fas", "AA_gene_tree.txt.contree", "AA_concat.txt.contree"]
//!     .iter()
//!     .map(PathBuf::from)
//!     .collect();
//! let report = reconcile_files("AidanTrees", &files)?;
//! println!("{} taxa in common", report.common_taxa.len());
//! # Ok::<(), nexprune::Error>(())
//! ```

pub mod alignment;
pub mod batch;
pub mod config;
pub mod error;
pub mod model;
pub mod newick;
pub mod parser;

pub use crate::error::{Error, Result};

use crate::batch::{BatchReport, BatchSpec};
use crate::config::Config;
use std::path::PathBuf;

// ============================================================================
// Quick API
// ============================================================================
/// Reconciles the given files as one batch using the default configuration,
/// writing the outputs to the working directory.
///
/// See [batch::run_batch] for full documentation.
pub fn reconcile_files(name: &str, files: &[PathBuf]) -> Result<BatchReport> {
    let config = Config::default();
    let spec = BatchSpec::from_files(name, files, &config)?;
    batch::run_batch(&spec, &config)
}
