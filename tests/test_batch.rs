use nexprune::batch::{BatchSpec, BatchWarning, run_all, run_batch};
use nexprune::config::{BatchConfig, Config, EmptyCommonTaxa, LeadingContent};
use nexprune::error::{Error, FormatError, ValidationError};
use nexprune::newick::parse_str;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TREE_ONE: &str = "((A:0.1,B:0.2)90:0.3,C:0.4);\n";
const TREE_TWO: &str = "(B:1,(C:2,D:3)75:0.5);\n";
const ALIGNMENT: &str = ">A\nAAAA\n>B\nBBBB\nBB\n>C\nCCCC\n>D\nDDDD\n";

/// Writes the inputs and returns (dir, config writing to `<dir>/out`).
fn setup(files: &[(&str, &str)]) -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    let config = Config {
        output_dir: dir.path().join("out"),
        ..Config::default()
    };
    (dir, config)
}

fn default_inputs() -> Vec<(&'static str, &'static str)> {
    vec![("t1.contree", TREE_ONE), ("t2.contree", TREE_TWO), ("data.fas", ALIGNMENT)]
}

fn spec(dir: &Path, names: &[&str]) -> BatchSpec {
    let files: Vec<PathBuf> = names.iter().map(|name| dir.join(name)).collect();
    BatchSpec::from_files("test", &files, &Config::default()).unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join("out").join(name)).unwrap()
}

#[test]
fn test_end_to_end() {
    let (dir, config) = setup(&default_inputs());
    let spec = spec(dir.path(), &["t1.contree", "data.fas", "t2.contree"]);

    let report = run_batch(&spec, &config).unwrap();

    // Common taxa
    assert_eq!(report.common_taxa.iter().collect::<Vec<_>>(), ["B", "C"]);

    // Per-tree files
    let pruned_one = read(dir.path(), "pruned_t1.contree");
    let pruned_two = read(dir.path(), "pruned_t2.contree");
    assert_eq!(pruned_one, "(B:0.5,C:0.4);\n");
    assert_eq!(pruned_two, "(B:1,C:2.5);\n");
    for pruned in [&pruned_one, &pruned_two] {
        let labels = parse_str(pruned).unwrap().label_set();
        assert_eq!(labels.into_iter().collect::<Vec<_>>(), ["B", "C"]);
    }

    // Tree list in processing order
    assert_eq!(read(dir.path(), "test_pruned.treels"), format!("{pruned_one}{pruned_two}"));

    // Alignment
    assert_eq!(read(dir.path(), "pruned_data.fas"), ">B\nBBBB\nBB\n>C\nCCCC\n");
    assert_eq!(report.alignment.kept_labels, vec!["B", "C"]);

    // Manifest
    let manifest = read(dir.path(), "test_manifest.log");
    let expected = format!(
        "[trees]\n{}\n{}\n\n[alignment]\n{}\n",
        dir.path().join("t1.contree").display(),
        dir.path().join("t2.contree").display(),
        dir.path().join("data.fas").display()
    );
    assert_eq!(manifest, expected);

    assert_eq!(report.written.len(), 5);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_inputs_are_not_modified() {
    let (dir, config) = setup(&default_inputs());
    run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("t1.contree")).unwrap(), TREE_ONE);
    assert_eq!(fs::read_to_string(dir.path().join("data.fas")).unwrap(), ALIGNMENT);
}

#[test]
fn test_two_alignments_write_nothing() {
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("a.fas", ALIGNMENT), ("b.fas", ALIGNMENT)]);
    let files: Vec<PathBuf> = ["t1.contree", "a.fas", "b.fas"].iter().map(|name| dir.path().join(name)).collect();

    let err = BatchSpec::from_files("test", &files, &config).unwrap_err();

    assert!(matches!(err, Error::Validation(ValidationError::AlignmentCount { ref found, .. }) if found.len() == 2));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_output_would_overwrite_input() {
    let (dir, mut config) = setup(&[
        ("t1.contree", TREE_ONE),
        ("pruned_t1.contree", TREE_TWO),
        ("data.fas", ALIGNMENT),
    ]);
    fs::create_dir(dir.path().join("out")).unwrap();
    config.output_dir = dir.path().join("out").join("..");
    let spec = spec(dir.path(), &["t1.contree", "pruned_t1.contree", "data.fas"]);

    let err = run_batch(&spec, &config).unwrap_err();

    match err {
        Error::Validation(ValidationError::OutputCollision { output, inputs }) => {
            assert_eq!(output, dir.path().join("out/../pruned_t1.contree"));
            assert_eq!(inputs, vec![dir.path().join("t1.contree")]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(fs::read_to_string(dir.path().join("pruned_t1.contree")).unwrap(), TREE_TWO);
}

#[test]
fn test_parse_error_aborts_before_writing() {
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("t2.contree", "((B,C),D"), ("data.fas", ALIGNMENT)]);
    let err = run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap_err();

    match err {
        Error::Parse { path, .. } => assert_eq!(path, dir.path().join("t2.contree")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_tree_file() {
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("data.fas", ALIGNMENT)]);
    let err = run_batch(&spec(dir.path(), &["t1.contree", "gone.contree", "data.fas"]), &config).unwrap_err();
    assert!(matches!(err, Error::Io { ref path, .. } if path.ends_with("gone.contree")));
}

#[test]
fn test_empty_common_taxa_warns() {
    let (dir, config) = setup(&[("t1.contree", "(A,B);"), ("t2.contree", "(C,D);"), ("data.fas", ALIGNMENT)]);
    let report = run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap();

    assert!(report.common_taxa.is_empty());
    assert_eq!(report.warnings, vec![BatchWarning::EmptyCommonTaxa]);
    assert_eq!(read(dir.path(), "pruned_t1.contree"), ";\n");
    assert_eq!(read(dir.path(), "test_pruned.treels"), ";\n;\n");
    assert_eq!(read(dir.path(), "pruned_data.fas"), "");
}

#[test]
fn test_empty_common_taxa_fails_by_policy() {
    let (dir, mut config) = setup(&[("t1.contree", "(A,B);"), ("t2.contree", "(C,D);"), ("data.fas", ALIGNMENT)]);
    config.policy.empty_common_taxa = EmptyCommonTaxa::Fail;

    let err = run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap_err();

    assert!(matches!(err, Error::EmptyCommonTaxa { ref batch } if batch == "test"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_taxon_missing_from_alignment() {
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("t2.contree", TREE_TWO), ("data.fas", ">B\nBB\n")]);
    let report = run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap();

    // Trees are pruned as usual
    assert_eq!(read(dir.path(), "pruned_t2.contree"), "(B:1,C:2.5);\n");
    assert_eq!(read(dir.path(), "pruned_data.fas"), ">B\nBB\n");
    assert_eq!(report.warnings, vec![BatchWarning::MissingFromAlignment(vec!["C".to_string()])]);
}

#[test]
fn test_alignment_only_record_is_dropped() {
    let alignment = ">B\nBB\n>Z\nZZ\n>C\nCC\n";
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("t2.contree", TREE_TWO), ("data.fas", alignment)]);
    run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap();
    assert_eq!(read(dir.path(), "pruned_data.fas"), ">B\nBB\n>C\nCC\n");
}

#[test]
fn test_leading_alignment_content() {
    let alignment = "garbage\n>B\nBB\n>C\nCC\n";
    let (dir, mut config) = setup(&[("t1.contree", TREE_ONE), ("t2.contree", TREE_TWO), ("data.fas", alignment)]);
    let spec = spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]);

    let err = run_batch(&spec, &config).unwrap_err();
    match err {
        Error::Format(FormatError::ContentBeforeHeader { path, line }) => {
            assert_eq!(path, dir.path().join("data.fas"));
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
    // Partial alignment removed, trees already written stay
    assert!(!dir.path().join("out/pruned_data.fas").exists());
    assert!(dir.path().join("out/pruned_t1.contree").exists());

    config.policy.leading_content = LeadingContent::Discard;
    run_batch(&spec, &config).unwrap();
    assert_eq!(read(dir.path(), "pruned_data.fas"), ">B\nBB\n>C\nCC\n");
}

#[test]
fn test_duplicate_alignment_records_reported() {
    let alignment = ">B\nB1\n>C\nCC\n>B\nB2\n";
    let (dir, config) = setup(&[("t1.contree", TREE_ONE), ("t2.contree", TREE_TWO), ("data.fas", alignment)]);
    let report = run_batch(&spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]), &config).unwrap();

    assert_eq!(read(dir.path(), "pruned_data.fas"), alignment);
    assert_eq!(report.warnings, vec![BatchWarning::DuplicateAlignmentRecord(vec!["B".to_string()])]);
}

#[test]
fn test_processing_order_follows_input_order() {
    let (dir, config) = setup(&default_inputs());
    run_batch(&spec(dir.path(), &["t2.contree", "data.fas", "t1.contree"]), &config).unwrap();

    assert_eq!(read(dir.path(), "test_pruned.treels"), "(B:1,C:2.5);\n(B:0.5,C:0.4);\n");
    let manifest = read(dir.path(), "test_manifest.log");
    let t2 = manifest.find("t2.contree").unwrap();
    let t1 = manifest.find("t1.contree").unwrap();
    assert!(t2 < t1);
}

#[test]
fn test_runs_are_deterministic() {
    let (dir, config) = setup(&default_inputs());
    let spec = spec(dir.path(), &["t1.contree", "t2.contree", "data.fas"]);

    let first = run_batch(&spec, &config).unwrap();
    let contents: Vec<Vec<u8>> = first.written.iter().map(|path| fs::read(path).unwrap()).collect();
    let second = run_batch(&spec, &config).unwrap();

    assert_eq!(first, second);
    for (path, content) in second.written.iter().zip(contents) {
        assert_eq!(fs::read(path).unwrap(), content);
    }
}

#[test]
fn test_run_all_batches() {
    let (dir, mut config) = setup(&[
        ("t1.contree", TREE_ONE),
        ("t2.contree", TREE_TWO),
        ("data.fas", ALIGNMENT),
        ("t3.contree", "(A,B,C,D);"),
    ]);
    let files = |names: &[&str]| names.iter().map(|name| dir.path().join(name)).collect::<Vec<_>>();
    config.batches = vec![
        BatchConfig {
            name: "first".to_string(),
            files: files(&["data.fas", "t1.contree", "t2.contree"]),
        },
        BatchConfig {
            name: "second".to_string(),
            files: files(&["data.fas", "t1.contree", "t3.contree"]),
        },
    ];

    let reports = run_all(&config).unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].common_taxa.len(), 3);
    assert_eq!(read(dir.path(), "second_pruned.treels"), "((A:0.1,B:0.2)90:0.3,C:0.4);\n(A,B,C);\n");
    assert_eq!(read(dir.path(), "first_manifest.log").lines().count(), 6);
}
