//! Pruning of FASTA-like alignments to a set of taxa.
//!
//! # Format
//! * A header line starts with `>`; the rest of the line, without the line
//!   terminator (`\n` or `\r\n`), is the label of the record
//! * All following lines up to the next header belong to that record
//! * Labels are matched byte-exactly, no whitespace is trimmed
//!
//! Records are streamed line by line and copied verbatim, so the retained part
//! of the output is byte-identical to the source.
//!
//! # Example
//! ```
//! use std::collections::BTreeSet;
//! use nexprune::alignment::AlignmentPruner;
//!
//! let alignment = ">Apteryx_haastii\nACGT\nAC\n>Struthio_camelus\nTTGA\n";
//! let keep: BTreeSet<String> = ["Apteryx_haastii".to_string()].into();
//!
//! let mut out = Vec::new();
//! let summary = AlignmentPruner::new(&keep).prune(alignment.as_bytes(), &mut out).unwrap();
//!
//! assert_eq!(out, b">Apteryx_haastii\nACGT\nAC\n");
//! assert_eq!(summary.records_kept, 1);
//! ```

mod defs;
mod pruner;

pub use self::pruner::{AlignmentError, AlignmentPruner, AlignmentSummary};
