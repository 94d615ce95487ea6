//! Partitioning of input files into the alignment and the trees.

use crate::config::InputConfig;
use crate::error::{Error, Result, ValidationError};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Returns whether the file name of `path` ends in `suffix`.
pub(crate) fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Splits `files` into the single alignment and the tree files.
///
/// A file whose name ends in the alignment suffix is the alignment, every
/// other file is a tree file. The trees keep the order of `files`.
///
/// # Errors
/// [ValidationError::AlignmentCount] listing every file ending in the
/// alignment suffix, unless there is exactly one.
///
/// # Example
/// ```
/// use std::path::PathBuf;
/// use nexprune::batch::classify;
/// use nexprune::config::InputConfig;
///
/// let files: Vec<PathBuf> = ["gene.contree", "AA_dataset.fas", "concat.contree"].iter().map(PathBuf::from).collect();
/// let (alignment, trees) = classify(&files, &InputConfig::default()).unwrap();
///
/// assert_eq!(alignment, PathBuf::from("AA_dataset.fas"));
/// assert_eq!(trees, vec![PathBuf::from("gene.contree"), PathBuf::from("concat.contree")]);
/// ```
pub fn classify(files: &[PathBuf], inputs: &InputConfig) -> Result<(PathBuf, Vec<PathBuf>)> {
    let (alignments, trees): (Vec<PathBuf>, Vec<PathBuf>) = files
        .iter()
        .cloned()
        .partition(|path| has_suffix(path, &inputs.alignment_suffix));

    match <[PathBuf; 1]>::try_from(alignments) {
        Ok([alignment]) => Ok((alignment, trees)),
        Err(found) => Err(ValidationError::AlignmentCount {
            suffix: inputs.alignment_suffix.clone(),
            found,
        }
        .into()),
    }
}

/// Lists the input files of a directory, sorted by file name.
///
/// Only regular files (or links to them) directly in `dir` are considered; a
/// file is an input if its name ends in the tree or the alignment suffix and
/// does not start with `marker`, so outputs of earlier runs are not picked up
/// again.
pub fn discover(dir: &Path, inputs: &InputConfig, marker: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            Error::io(path, err.into())
        })?;
        // Follows symlinks to files; broken links are skipped
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.starts_with(marker) {
            debug!(file = %name, "skipping earlier output");
            continue;
        }
        if name.ends_with(&inputs.tree_suffix) || name.ends_with(&inputs.alignment_suffix) {
            files.push(entry.into_path());
        }
    }

    debug!(dir = %dir.display(), found = files.len(), "discovered input files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_has_suffix_uses_file_name() {
        assert!(has_suffix(Path::new("data/AA_dataset.fas"), ".fas"));
        assert!(!has_suffix(Path::new("data.fas/tree.contree"), ".fas"));
    }

    #[test]
    fn test_classify_no_alignment() {
        let err = classify(&paths(&["a.contree"]), &InputConfig::default()).unwrap_err();
        match err {
            Error::Validation(ValidationError::AlignmentCount { found, .. }) => assert!(found.is_empty()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_classify_lists_all_alignments() {
        let files = paths(&["x.fas", "a.contree", "y.fas"]);
        let err = classify(&files, &InputConfig::default()).unwrap_err();
        match err {
            Error::Validation(ValidationError::AlignmentCount { found, suffix }) => {
                assert_eq!(suffix, ".fas");
                assert_eq!(found, paths(&["x.fas", "y.fas"]));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
