//! Naming and writing of the outputs of a batch.

use crate::alignment::{AlignmentError, AlignmentPruner, AlignmentSummary};
use crate::batch::{BatchSpec, PrunedTree};
use crate::config::NamingConfig;
use crate::error::{Error, FormatError, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Section header of the tree list in the manifest
const MANIFEST_TREES: &str = "[trees]";

/// Section header of the alignment in the manifest
const MANIFEST_ALIGNMENT: &str = "[alignment]";

// =#========================================================================#=
// OUTPUT PATHS
// =#========================================================================#=
/// Where the outputs of one batch go.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// One pruned file per tree, in processing order
    pub trees: Vec<PathBuf>,
    /// All pruned trees, one per line
    pub tree_list: PathBuf,
    /// The pruned alignment
    pub alignment: PathBuf,
    /// The manifest log
    pub manifest: PathBuf,
}

impl OutputPaths {
    /// Derives the output paths of `spec` within `output_dir`.
    ///
    /// Pruned inputs are named `<marker><input file name><suffix>`, the tree list
    /// and the manifest `<batch name><suffix>`.
    ///
    /// # Example
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use nexprune::batch::{BatchSpec, OutputPaths};
    /// use nexprune::config::NamingConfig;
    ///
    /// let spec = BatchSpec::new("AidanTrees", "data/AA_dataset.fas", vec![PathBuf::from("data/AA_concat.txt.contree")]);
    /// let paths = OutputPaths::new(&spec, Path::new("out"), &NamingConfig::default());
    ///
    /// assert_eq!(paths.trees, vec![PathBuf::from("out/pruned_AA_concat.txt.contree")]);
    /// assert_eq!(paths.alignment, PathBuf::from("out/pruned_AA_dataset.fas"));
    /// assert_eq!(paths.tree_list, PathBuf::from("out/AidanTrees_pruned.treels"));
    /// assert_eq!(paths.manifest, PathBuf::from("out/AidanTrees_manifest.log"));
    /// ```
    pub fn new(spec: &BatchSpec, output_dir: &Path, naming: &NamingConfig) -> Self {
        let pruned_path = |input: &Path, suffix: &str| {
            let mut name = OsString::from(&naming.marker);
            name.push(input.file_name().unwrap_or(input.as_os_str()));
            name.push(suffix);
            output_dir.join(name)
        };

        Self {
            trees: spec
                .trees
                .iter()
                .map(|tree| pruned_path(tree.as_path(), &naming.tree_suffix))
                .collect(),
            tree_list: output_dir.join(format!("{}{}", spec.name, naming.tree_list_suffix)),
            alignment: pruned_path(spec.alignment.as_path(), &naming.alignment_suffix),
            manifest: output_dir.join(format!("{}{}", spec.name, naming.manifest_suffix)),
        }
    }

    /// Every output path, paired with the input it is derived from
    /// (`None` for the tree list and the manifest).
    pub(crate) fn with_inputs<'a>(&'a self, spec: &'a BatchSpec) -> Vec<(&'a Path, Option<&'a Path>)> {
        let mut all: Vec<(&Path, Option<&Path>)> = self
            .trees
            .iter()
            .zip(&spec.trees)
            .map(|(output, input)| (output.as_path(), Some(input.as_path())))
            .collect();
        all.push((self.alignment.as_path(), Some(spec.alignment.as_path())));
        all.push((self.tree_list.as_path(), None));
        all.push((self.manifest.as_path(), None));
        all
    }
}

// =#========================================================================#=
// OUTPUT WRITER
// =#========================================================================#=
/// Writes the outputs of one batch to the paths of an [OutputPaths].
///
/// Each write is independent; a failed write leaves earlier outputs in place.
pub struct OutputWriter<'a> {
    paths: &'a OutputPaths,
}

impl<'a> OutputWriter<'a> {
    pub fn new(paths: &'a OutputPaths) -> Self {
        Self { paths }
    }

    /// Writes each pruned tree to its own file.
    pub fn write_trees(&self, pruned: &[PrunedTree]) -> Result<()> {
        for (tree, path) in pruned.iter().zip(&self.paths.trees) {
            write_lines(path, [tree.newick()])?;
            debug!(file = %path.display(), "wrote pruned tree");
        }
        Ok(())
    }

    /// Writes all pruned trees, one per line, in processing order.
    pub fn write_tree_list(&self, pruned: &[PrunedTree]) -> Result<()> {
        let path = &self.paths.tree_list;
        write_lines(path, pruned.iter().map(PrunedTree::newick))?;
        debug!(file = %path.display(), trees = pruned.len(), "wrote tree list");
        Ok(())
    }

    /// Streams the alignment read from `reader` through `pruner` into the
    /// pruned alignment file.
    ///
    /// `source` is the path of the alignment, used in error messages. If
    /// pruning fails, the partially written output is removed.
    pub fn write_alignment<R: BufRead>(
        &self,
        source: &Path,
        reader: R,
        pruner: &AlignmentPruner,
    ) -> Result<AlignmentSummary> {
        let path = &self.paths.alignment;
        let writer = create(path)?;

        match pruner.prune(reader, writer) {
            Ok(summary) => {
                debug!(file = %path.display(), records = summary.records_kept, "wrote pruned alignment");
                Ok(summary)
            }
            Err(err) => {
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!(file = %path.display(), error = %remove_err, "could not remove partial alignment");
                }
                Err(match err {
                    AlignmentError::ContentBeforeHeader { line } => FormatError::ContentBeforeHeader {
                        path: source.to_path_buf(),
                        line,
                    }
                    .into(),
                    AlignmentError::Read(err) => Error::io(source, err),
                    AlignmentError::Write(err) => Error::io(path, err),
                })
            }
        }
    }

    /// Writes the manifest: the tree files in processing order, then the alignment.
    ///
    /// ```text
    /// [trees]
    /// AA_gene_tree.txt.contree
    /// AA_concat.txt.contree
    ///
    /// [alignment]
    /// AA_dataset.fas
    /// ```
    pub fn write_manifest(&self, spec: &BatchSpec) -> Result<()> {
        let path = &self.paths.manifest;
        let mut writer = create(path)?;

        let mut write = || -> std::io::Result<()> {
            writeln!(writer, "{MANIFEST_TREES}")?;
            for tree in &spec.trees {
                writeln!(writer, "{}", tree.display())?;
            }
            writeln!(writer)?;
            writeln!(writer, "{MANIFEST_ALIGNMENT}")?;
            writeln!(writer, "{}", spec.alignment.display())?;
            writer.flush()
        };
        write().map_err(|err| Error::io(path, err))?;

        debug!(file = %path.display(), "wrote manifest");
        Ok(())
    }
}

/// Writes each of `lines` followed by a newline to the file at `path`.
fn write_lines<'a, I: IntoIterator<Item = &'a str>>(path: &Path, lines: I) -> Result<()> {
    let mut writer = create(path)?;
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|err| Error::io(path, err))?;
    }
    writer.flush().map_err(|err| Error::io(path, err))
}

/// Creates (or truncates) the file at `path` for buffered writing.
fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| Error::io(path, err))
}
