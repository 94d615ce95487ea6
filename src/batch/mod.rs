//! Reconciliation of a batch of trees and one alignment.
//!
//! A batch runs as a single linear pipeline:
//! 1. [classify] the inputs into the alignment and the tree files
//! 2. [extract_taxa] of every tree
//! 3. [resolve](CommonTaxa::resolve) the taxa common to all trees
//! 4. [prune_trees] and prune the alignment to these taxa
//! 5. write the outputs with an [OutputWriter]
//!
//! Inconsistent inputs are rejected before any file is parsed, and every tree
//! is parsed before any file is written. Errors abort the batch; outputs that
//! were already written are left in place.

mod classify;
mod output;
mod prune;
mod taxa;

pub use self::classify::{classify, discover};
pub use self::output::{OutputPaths, OutputWriter};
pub use self::prune::{PrunedTree, prune_trees};
pub use self::taxa::{CommonTaxa, TaxonLabelSet, extract_taxa};

use crate::alignment::{AlignmentPruner, AlignmentSummary};
use crate::config::{BatchConfig, Config, EmptyCommonTaxa};
use crate::error::{Error, Result, ValidationError};
use crate::model::Tree;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

// =#========================================================================#=
// BATCH SPEC
// =#========================================================================#=
/// The inputs of one batch: a name, the alignment and the tree files in
/// processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec {
    pub name: String,
    pub alignment: PathBuf,
    pub trees: Vec<PathBuf>,
}

impl BatchSpec {
    pub fn new(name: impl Into<String>, alignment: impl Into<PathBuf>, trees: Vec<PathBuf>) -> Self {
        Self {
            name: name.into(),
            alignment: alignment.into(),
            trees,
        }
    }

    /// Creates a batch from an unordered list of files, see [classify].
    pub fn from_files(name: impl Into<String>, files: &[PathBuf], config: &Config) -> Result<Self> {
        let (alignment, trees) = classify(files, &config.inputs)?;
        Ok(Self::new(name, alignment, trees))
    }

    /// Creates a batch from a `[[batch]]` entry of the configuration.
    pub fn from_config(batch: &BatchConfig, config: &Config) -> Result<Self> {
        Self::from_files(batch.name.clone(), &batch.files, config)
    }

    /// Creates a batch from the input files found in `dir`, see [discover].
    pub fn discover(name: impl Into<String>, dir: &Path, config: &Config) -> Result<Self> {
        let files = discover(dir, &config.inputs, &config.naming.marker)?;
        Self::from_files(name, &files, config)
    }

    /// Checks the inputs for consistency and returns the output paths.
    ///
    /// # Errors
    /// * [ValidationError::NoTreeFiles] if there is no tree file
    /// * [ValidationError::DuplicateInput] if a file is listed twice
    /// * [ValidationError::OutputCollision] if two outputs share a path or an
    ///   output would overwrite an input
    pub fn validate(&self, config: &Config) -> Result<OutputPaths> {
        if self.trees.is_empty() {
            return Err(ValidationError::NoTreeFiles.into());
        }

        let mut inputs = HashSet::new();
        for input in self.trees.iter().chain([&self.alignment]) {
            if !inputs.insert(file_identity(input)) {
                return Err(ValidationError::DuplicateInput(input.clone()).into());
            }
        }

        let paths = OutputPaths::new(self, &config.output_dir, &config.naming);
        let mut by_output: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
        for (output, input) in paths.with_inputs(self) {
            let identity = file_identity(output);
            let overwrites_input = inputs.contains(&identity);
            let sources = by_output.entry(identity).or_default();
            sources.push(input.unwrap_or(output).to_path_buf());
            if sources.len() > 1 || overwrites_input {
                return Err(ValidationError::OutputCollision {
                    output: output.to_path_buf(),
                    inputs: sources.clone(),
                }
                .into());
            }
        }

        Ok(paths)
    }
}

/// Path under which two spellings of the same file compare equal.
///
/// An existing file is canonicalized; for a file yet to be created its parent
/// directory is. Otherwise `.` is dropped and `..` resolved lexically.
fn file_identity(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
        if let Ok(parent) = fs::canonicalize(parent) {
            return parent.join(name);
        }
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(normalized.components().next_back(), Some(Component::Normal(_))) => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

// =#========================================================================#=
// REPORT
// =#========================================================================#=
/// Degenerate but non-fatal findings of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWarning {
    /// The trees share no taxon; all outputs are empty
    EmptyCommonTaxa,
    /// Common taxa without a record in the alignment
    MissingFromAlignment(Vec<String>),
    /// Labels of more than one alignment record
    DuplicateAlignmentRecord(Vec<String>),
}

impl fmt::Display for BatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BatchWarning::EmptyCommonTaxa => write!(f, "trees have no taxon in common, outputs are empty"),
            BatchWarning::MissingFromAlignment(labels) => {
                write!(f, "{} common taxa missing from the alignment: {}", labels.len(), labels.join(", "))
            }
            BatchWarning::DuplicateAlignmentRecord(labels) => {
                write!(f, "alignment has duplicate records for: {}", labels.join(", "))
            }
        }
    }
}

/// Result of a successful batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub name: String,
    pub common_taxa: CommonTaxa,
    /// Every file written, per-tree files first
    pub written: Vec<PathBuf>,
    pub alignment: AlignmentSummary,
    pub warnings: Vec<BatchWarning>,
}

// =#========================================================================#=
// PIPELINE
// =#========================================================================#=
/// Reconciles the trees and the alignment of `spec`.
///
/// # Errors
/// * [Error::Validation] before anything is read
/// * [Error::Parse] or [Error::Io] if a tree cannot be read, before anything is written
/// * [Error::EmptyCommonTaxa] under [EmptyCommonTaxa::Fail], before anything is written
/// * [Error::Format] or [Error::Io] while pruning the alignment or writing
pub fn run_batch(spec: &BatchSpec, config: &Config) -> Result<BatchReport> {
    info!(batch = %spec.name, trees = spec.trees.len(), alignment = %spec.alignment.display(), "reconciling batch");
    let paths = spec.validate(config)?;

    // Extract
    let mut trees: Vec<Tree> = Vec::with_capacity(spec.trees.len());
    let mut label_sets = Vec::with_capacity(spec.trees.len());
    for path in &spec.trees {
        let (tree, labels) = extract_taxa(path)?;
        trees.push(tree);
        label_sets.push(labels);
    }

    // Resolve
    let common = CommonTaxa::resolve(&label_sets)?;
    info!(batch = %spec.name, common = common.len(), "resolved common taxa");
    let mut warnings = Vec::new();
    if common.is_empty() {
        match config.policy.empty_common_taxa {
            EmptyCommonTaxa::Fail => return Err(Error::EmptyCommonTaxa { batch: spec.name.clone() }),
            EmptyCommonTaxa::Warn => warnings.push(BatchWarning::EmptyCommonTaxa),
        }
    }
    let alignment = File::open(&spec.alignment).map_err(|err| Error::io(&spec.alignment, err))?;

    // Prune & write
    let pruned = prune_trees(spec.trees.iter().map(PathBuf::as_path).zip(&trees), &common);
    fs::create_dir_all(&config.output_dir).map_err(|err| Error::io(&config.output_dir, err))?;

    let writer = OutputWriter::new(&paths);
    writer.write_trees(&pruned)?;
    writer.write_tree_list(&pruned)?;
    let pruner = AlignmentPruner::new(&common).with_leading_content(config.policy.leading_content);
    let summary = writer.write_alignment(&spec.alignment, BufReader::new(alignment), &pruner)?;
    writer.write_manifest(spec)?;

    if !summary.missing_labels.is_empty() {
        warnings.push(BatchWarning::MissingFromAlignment(summary.missing_labels.clone()));
    }
    if !summary.duplicate_labels.is_empty() {
        warnings.push(BatchWarning::DuplicateAlignmentRecord(summary.duplicate_labels.clone()));
    }
    for warning in &warnings {
        warn!(batch = %spec.name, "{warning}");
    }

    let mut written = paths.trees;
    written.extend([paths.tree_list, paths.alignment, paths.manifest]);
    info!(batch = %spec.name, files = written.len(), records = summary.records_kept, "batch complete");

    Ok(BatchReport {
        name: spec.name.clone(),
        common_taxa: common,
        written,
        alignment: summary,
        warnings,
    })
}

/// Runs every `[[batch]]` of the configuration, one after the other.
///
/// Batches share no state; the first failing batch aborts the run.
pub fn run_all(config: &Config) -> Result<Vec<BatchReport>> {
    if config.batches.is_empty() {
        return Err(Error::Config("no [[batch]] entries configured".to_string()));
    }

    config
        .batches
        .iter()
        .map(|batch| BatchSpec::from_config(batch, config).and_then(|spec| run_batch(&spec, config)))
        .collect()
}
