use nexprune::alignment::{AlignmentError, AlignmentPruner};
use nexprune::config::LeadingContent;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

const ALIGNMENT: &str = "\
>Apteryx_haastii
ACGTACGT--ACGT
ACGTAC
>Struthio_camelus
ACGTACGTTTACGT
ACGTAA
>Apteryx_owenii
ACGTACGT--ACGA
ACGTAC
>Dromaius_novaehollandiae
ACGAACGTTTACGT
ACGTAA
";

fn keep(labels: &[&str]) -> BTreeSet<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

fn prune(input: &[u8], labels: &[&str]) -> (Vec<u8>, nexprune::alignment::AlignmentSummary) {
    let keep = keep(labels);
    let mut out = Vec::new();
    let summary = AlignmentPruner::new(&keep).prune(input, &mut out).unwrap();
    (out, summary)
}

#[test]
fn test_keeps_exactly_common_records() {
    let (out, summary) = prune(ALIGNMENT.as_bytes(), &["Apteryx_owenii", "Apteryx_haastii", "Casuarius_casuarius"]);

    assert_eq!(
        String::from_utf8(out).unwrap(),
        ">Apteryx_haastii\nACGTACGT--ACGT\nACGTAC\n>Apteryx_owenii\nACGTACGT--ACGA\nACGTAC\n"
    );
    assert_eq!(summary.records_seen, 4);
    assert_eq!(summary.records_kept, 2);
    assert_eq!(summary.kept_labels, vec!["Apteryx_haastii", "Apteryx_owenii"]);
    assert_eq!(summary.missing_labels, vec!["Casuarius_casuarius"]);
}

#[test]
fn test_keeping_all_labels_is_identity() {
    let all = ["Apteryx_haastii", "Struthio_camelus", "Apteryx_owenii", "Dromaius_novaehollandiae"];
    let (out, _) = prune(ALIGNMENT.as_bytes(), &all);
    assert_eq!(out, ALIGNMENT.as_bytes());
}

#[test]
fn test_sequence_lines_resembling_labels_are_not_headers() {
    // Only lines starting with '>' start records
    let input = ">A\nB\n>B\nA\n";
    let (out, _) = prune(input.as_bytes(), &["A"]);
    assert_eq!(out, b">A\nB\n");
}

#[test]
fn test_empty_records_and_blank_lines_inside_records() {
    let input = ">A\n>B\nAC\n\nGT\n>C\n";
    let (out, summary) = prune(input.as_bytes(), &["A", "B"]);
    assert_eq!(out, b">A\n>B\nAC\n\nGT\n");
    assert_eq!(summary.records_kept, 2);
}

#[test]
fn test_non_utf8_sequence_bytes_are_copied() {
    let input = b">A\nAC\xffGT\n>B\nTT\n";
    let (out, _) = prune(input, &["A"]);
    assert_eq!(out, b">A\nAC\xffGT\n");
}

#[test]
fn test_empty_input() {
    let (out, summary) = prune(b"", &["A"]);
    assert!(out.is_empty());
    assert_eq!(summary.records_seen, 0);
    assert_eq!(summary.missing_labels, vec!["A"]);
}

#[test]
fn test_leading_content_policy() {
    let input = "ACGT\n>A\nAC\n";
    let keep = keep(&["A"]);

    let err = AlignmentPruner::new(&keep).prune(input.as_bytes(), Vec::new()).unwrap_err();
    assert!(matches!(err, AlignmentError::ContentBeforeHeader { line: 1 }));

    let mut out = Vec::new();
    let summary = AlignmentPruner::new(&keep)
        .with_leading_content(LeadingContent::Discard)
        .prune(input.as_bytes(), &mut out)
        .unwrap();
    assert_eq!(out, b">A\nAC\n");
    assert_eq!(summary.discarded_lines, 1);
}

#[test]
fn test_prune_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("AA_dataset.fas");
    let target = dir.path().join("pruned_AA_dataset.fas");
    fs::write(&source, ALIGNMENT).unwrap();

    let keep = keep(&["Struthio_camelus"]);
    let reader = BufReader::new(File::open(&source).unwrap());
    let writer = BufWriter::new(File::create(&target).unwrap());
    AlignmentPruner::new(&keep).prune(reader, writer).unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), ">Struthio_camelus\nACGTACGTTTACGT\nACGTAA\n");
}
