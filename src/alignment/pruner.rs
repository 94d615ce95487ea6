//! Streaming alignment pruner.

use crate::alignment::defs::{CARRIAGE_RETURN, HEADER_MARKER, NEWLINE};
use crate::config::LeadingContent;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, trace};

// =#========================================================================#=
// READER STATE
// =#========================================================================#=
/// Where the pruner is in the alignment.
#[derive(Debug, Clone, PartialEq)]
enum ReaderState {
    /// No header line has been read yet
    NoActiveRecord,
    /// Inside the record with the given label
    InRecord {
        label: String,
        /// Whether the lines of this record go to the output
        keep: bool,
    },
}

// =#========================================================================#=
// ERRORS & SUMMARY
// =#========================================================================#=
/// Failure while pruning an alignment.
///
/// Paths are not known at this level; the caller attaches them.
#[derive(Error, Debug)]
pub enum AlignmentError {
    /// Non-blank line before the first header, rejected by [LeadingContent::Reject]
    #[error("sequence content before the first '>' header in line {line}")]
    ContentBeforeHeader { line: usize },
    /// Reading the source failed
    #[error("failed to read alignment: {0}")]
    Read(#[source] io::Error),
    /// Writing the pruned alignment failed
    #[error("failed to write pruned alignment: {0}")]
    Write(#[source] io::Error),
}

/// What a call to [AlignmentPruner::prune] saw and kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentSummary {
    /// Number of header lines in the source
    pub records_seen: usize,
    /// Number of records copied to the output
    pub records_kept: usize,
    /// Labels of the kept records, in source order
    pub kept_labels: Vec<String>,
    /// Labels to keep for which the source has no record (sorted)
    pub missing_labels: Vec<String>,
    /// Labels occurring in more than one header (sorted)
    pub duplicate_labels: Vec<String>,
    /// Non-blank lines dropped before the first header under [LeadingContent::Discard]
    pub discarded_lines: usize,
}

// =#========================================================================#=
// ALIGNMENT PRUNER
// =#========================================================================#=
/// Copies the records of an alignment whose label is in a given set.
///
/// # Configuration
/// * [`with_leading_content(policy)`](Self::with_leading_content)
///     - How to treat non-blank lines before the first header
///       (default [LeadingContent::Reject]); blank lines there are always skipped
pub struct AlignmentPruner<'a> {
    keep: &'a BTreeSet<String>,
    leading_content: LeadingContent,
}

impl<'a> AlignmentPruner<'a> {
    /// Creates a pruner retaining the records labelled with a member of `keep`.
    pub fn new(keep: &'a BTreeSet<String>) -> Self {
        Self {
            keep,
            leading_content: LeadingContent::default(),
        }
    }

    /// Sets the policy for content before the first header.
    pub fn with_leading_content(mut self, leading_content: LeadingContent) -> Self {
        self.leading_content = leading_content;
        self
    }

    /// Streams `reader` line by line and writes the retained records to `writer`.
    ///
    /// Header and sequence lines of a retained record are written as read,
    /// including their line terminators. The writer is flushed at the end.
    ///
    /// # Errors
    /// * [AlignmentError::ContentBeforeHeader] if the policy rejects leading content
    /// * [AlignmentError::Read] / [AlignmentError::Write] on I/O failure
    pub fn prune<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<AlignmentSummary, AlignmentError> {
        let mut state = ReaderState::NoActiveRecord;
        let mut summary = AlignmentSummary::default();
        let mut occurrences: HashMap<String, usize> = HashMap::new();

        let mut line = Vec::new();
        let mut line_number = 0;
        loop {
            line.clear();
            if reader.read_until(NEWLINE, &mut line).map_err(AlignmentError::Read)? == 0 {
                break;
            }
            line_number += 1;

            if line.first() == Some(&HEADER_MARKER) {
                state = self.start_record(&line, &mut summary);
                if let ReaderState::InRecord { label, .. } = &state {
                    *occurrences.entry(label.clone()).or_default() += 1;
                }
            } else if state == ReaderState::NoActiveRecord {
                self.handle_leading_line(&line, line_number, &mut summary)?;
                continue;
            }

            if let ReaderState::InRecord { keep: true, .. } = state {
                writer.write_all(&line).map_err(AlignmentError::Write)?;
            }
        }
        writer.flush().map_err(AlignmentError::Write)?;

        let seen: BTreeSet<&str> = occurrences.keys().map(String::as_str).collect();
        summary.missing_labels = self
            .keep
            .iter()
            .filter(|label| !seen.contains(label.as_str()))
            .cloned()
            .collect();
        summary.duplicate_labels = occurrences
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(label, _)| label)
            .collect();
        summary.duplicate_labels.sort();

        debug!(
            records_seen = summary.records_seen,
            records_kept = summary.records_kept,
            "pruned alignment"
        );
        Ok(summary)
    }
}

// ============================================================================
// State Transitions (private)
// ============================================================================
impl AlignmentPruner<'_> {
    /// Reads the label of a header line and decides whether to keep the record.
    fn start_record(&self, line: &[u8], summary: &mut AlignmentSummary) -> ReaderState {
        let raw_label = strip_terminator(&line[1..]);
        // Tree labels are UTF-8, so a label that is not can never be kept
        let (label, keep) = match std::str::from_utf8(raw_label) {
            Ok(label) => (label.to_string(), self.keep.contains(label)),
            Err(_) => (String::from_utf8_lossy(raw_label).into_owned(), false),
        };

        summary.records_seen += 1;
        if keep {
            summary.records_kept += 1;
            summary.kept_labels.push(label.clone());
        }
        trace!(label = %label, keep, "alignment record");

        ReaderState::InRecord { label, keep }
    }

    /// Applies the leading content policy to a line read before any header.
    fn handle_leading_line(
        &self,
        line: &[u8],
        line_number: usize,
        summary: &mut AlignmentSummary,
    ) -> Result<(), AlignmentError> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        match self.leading_content {
            LeadingContent::Reject => Err(AlignmentError::ContentBeforeHeader { line: line_number }),
            LeadingContent::Discard => {
                summary.discarded_lines += 1;
                Ok(())
            }
        }
    }
}

/// Strips a trailing `\n` or `\r\n`.
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(&[NEWLINE]).unwrap_or(line);
    line.strip_suffix(&[CARRIAGE_RETURN]).unwrap_or(line)
}
