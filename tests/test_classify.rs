use nexprune::batch::{BatchSpec, classify, discover};
use nexprune::config::{Config, InputConfig};
use nexprune::error::{Error, ValidationError};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}

fn touch(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), "").unwrap();
    }
}

#[test]
fn test_classify_alignment_anywhere_in_list() {
    let files = paths(&["AA_gene_tree.txt.contree", "AA_concat.txt.contree", "AA_dataset.fas", "AA_constrained.txt.contree"]);
    let (alignment, trees) = classify(&files, &InputConfig::default()).unwrap();

    assert_eq!(alignment, PathBuf::from("AA_dataset.fas"));
    assert_eq!(trees, paths(&["AA_gene_tree.txt.contree", "AA_concat.txt.contree", "AA_constrained.txt.contree"]));
}

#[test]
fn test_classify_two_alignments() {
    let files = paths(&["a.fas", "t.contree", "b.fas"]);
    let err = classify(&files, &InputConfig::default()).unwrap_err();

    assert!(matches!(
        &err,
        Error::Validation(ValidationError::AlignmentCount { found, .. }) if found == &paths(&["a.fas", "b.fas"])
    ));
    let message = err.to_string();
    assert!(message.contains("a.fas"));
    assert!(message.contains("b.fas"));
}

#[test]
fn test_classify_custom_suffix() {
    let inputs = InputConfig {
        tree_suffix: ".tre".to_string(),
        alignment_suffix: ".fasta".to_string(),
    };
    let (alignment, trees) = classify(&paths(&["x.tre", "y.fasta"]), &inputs).unwrap();
    assert_eq!(alignment, PathBuf::from("y.fasta"));
    assert_eq!(trees, paths(&["x.tre"]));
}

#[test]
fn test_discover_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        dir.path(),
        &[
            "b_gene.contree",
            "a_concat.contree",
            "AA_dataset.fas",
            "pruned_a_concat.contree",
            "pruned_AA_dataset.fas",
            "notes.txt",
        ],
    );
    fs::create_dir(dir.path().join("nested.contree")).unwrap();

    let found = discover(dir.path(), &InputConfig::default(), "pruned_").unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(names, vec!["AA_dataset.fas", "a_concat.contree", "b_gene.contree"]);
}

#[cfg(unix)]
#[test]
fn test_discover_follows_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    touch(data.path(), &["gene.contree"]);
    touch(dir.path(), &["AA_dataset.fas"]);
    std::os::unix::fs::symlink(data.path().join("gene.contree"), dir.path().join("gene.contree")).unwrap();
    std::os::unix::fs::symlink(data.path().join("gone.contree"), dir.path().join("broken.contree")).unwrap();

    let found = discover(dir.path(), &InputConfig::default(), "pruned_").unwrap();

    assert_eq!(found, vec![dir.path().join("AA_dataset.fas"), dir.path().join("gene.contree")]);
}

#[test]
fn test_discover_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");
    let err = discover(&missing, &InputConfig::default(), "pruned_").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_batch_spec_discover() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), &["t2.contree", "t1.contree", "data.fas"]);

    let spec = BatchSpec::discover("run", dir.path(), &Config::default()).unwrap();

    assert_eq!(spec.name, "run");
    assert_eq!(spec.alignment, dir.path().join("data.fas"));
    assert_eq!(spec.trees, vec![dir.path().join("t1.contree"), dir.path().join("t2.contree")]);
}
