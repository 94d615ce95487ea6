//! Configuration of reconciliation runs.
//!
//! A [Config] is read from a TOML file; every section is optional:
//!
//! ```toml
//! output_dir = "."
//!
//! [inputs]
//! tree_suffix = ".contree"
//! alignment_suffix = ".fas"
//!
//! [naming]
//! marker = "pruned_"
//! tree_suffix = ""
//! alignment_suffix = ""
//! tree_list_suffix = "_pruned.treels"
//! manifest_suffix = "_manifest.log"
//!
//! [policy]
//! leading_content = "reject"
//! empty_common_taxa = "warn"
//!
//! [[batch]]
//! name = "AidanTrees"
//! files = ["AA_dataset.fas", "AA_gene_tree.txt.contree", "AA_concat.txt.contree"]
//! ```
//!
//! Relative paths are resolved against the working directory.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory all outputs are written to
    pub output_dir: PathBuf,
    /// How input files are recognised
    pub inputs: InputConfig,
    /// How output files are named
    pub naming: NamingConfig,
    /// Decisions on degenerate input
    pub policy: PolicyConfig,
    /// Explicitly enumerated batches
    #[serde(rename = "batch")]
    pub batches: Vec<BatchConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            inputs: InputConfig::default(),
            naming: NamingConfig::default(),
            policy: PolicyConfig::default(),
            batches: Vec::new(),
        }
    }
}

impl Config {
    /// Reads a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_toml(&content).map_err(|err| match err {
            Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.inputs.alignment_suffix.is_empty() {
            return Err(Error::Config("inputs.alignment_suffix must not be empty".to_string()));
        }
        if self.inputs.tree_suffix.is_empty() {
            return Err(Error::Config("inputs.tree_suffix must not be empty".to_string()));
        }
        if self.naming.marker.is_empty() {
            return Err(Error::Config(
                "naming.marker must not be empty, outputs could not be told apart from inputs".to_string(),
            ));
        }
        if let Some(batch) = self.batches.iter().find(|batch| batch.name.is_empty()) {
            return Err(Error::Config(format!("batch with files {:?} has no name", batch.files)));
        }
        Ok(())
    }
}

/// Suffixes recognising input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Suffix of tree files, used when discovering inputs in a directory
    pub tree_suffix: String,
    /// Suffix of the alignment file; exactly one input per batch must end in it
    pub alignment_suffix: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tree_suffix: ".contree".to_string(),
            alignment_suffix: ".fas".to_string(),
        }
    }
}

/// Output naming: `<marker><input file name><suffix>` for pruned inputs,
/// `<batch name><suffix>` for the tree list and manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Prefix tagging every pruned file; discovery skips files starting with it
    pub marker: String,
    /// Suffix appended to pruned tree files
    pub tree_suffix: String,
    /// Suffix appended to the pruned alignment file
    pub alignment_suffix: String,
    /// Suffix of the concatenated tree-list file
    pub tree_list_suffix: String,
    /// Suffix of the manifest log
    pub manifest_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            marker: "pruned_".to_string(),
            tree_suffix: String::new(),
            alignment_suffix: String::new(),
            tree_list_suffix: "_pruned.treels".to_string(),
            manifest_suffix: "_manifest.log".to_string(),
        }
    }
}

/// Decisions on degenerate input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// What to do with alignment content before the first header line
    pub leading_content: LeadingContent,
    /// What to do if the trees share no taxon
    pub empty_common_taxa: EmptyCommonTaxa,
}

/// Handling of non-blank alignment lines before the first `>` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadingContent {
    /// Fail with a [FormatError](crate::error::FormatError)
    #[default]
    Reject,
    /// Drop the lines silently
    Discard,
}

/// Handling of an empty set of common taxa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCommonTaxa {
    /// Log a warning and write zero-leaf trees and an empty alignment
    #[default]
    Warn,
    /// Abort the batch before writing anything
    Fail,
}

/// One explicitly enumerated batch: an alignment and trees, in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Name of the batch, prefix of its tree-list and manifest files
    pub name: String,
    /// Input files; the one ending in the alignment suffix is the alignment
    pub files: Vec<PathBuf>,
}
