use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use getset::Getters;

use crate::helper::fasta_ids::IdentifierMapping;
use crate::helper::gblocks::FilterMode;
use crate::helper::io::open_fasta;
use crate::helper::raxml::RaxmlArtifact;
use crate::pipelines::PipelineError;

#[derive(Debug, Clone, Default, Getters)]
pub struct RestoreSummary {
    #[getset(get = "pub")]
    restored: Vec<PathBuf>,
    #[getset(get = "pub")]
    missing: Vec<RaxmlArtifact>,
}

impl RestoreSummary {
    pub fn is_missing(&self, artifact: RaxmlArtifact) -> bool {
        self.missing.contains(&artifact)
    }
}

/// `bestTree.<run>_mode_<mode>.renamed` and friends.
pub fn renamed_tree_name(artifact: RaxmlArtifact, run_name: &str, mode: FilterMode) -> PathBuf {
    PathBuf::from(format!("{}.{}_mode_{}.renamed", artifact.kind(), run_name, mode))
}

pub fn restore_tree_artifact(
    work_dir: &Path,
    artifact: RaxmlArtifact,
    run_name: &str,
    mode: FilterMode,
    mapping: &IdentifierMapping,
) -> Result<PathBuf, PipelineError> {
    let source = work_dir.join(artifact.file_name(run_name));
    if !source.is_file() {
        return Err(PipelineError::UpstreamArtifactMissing(source));
    }

    let tree = fs::read_to_string(&source)?;
    let output = work_dir.join(renamed_tree_name(artifact, run_name, mode));
    fs::write(&output, mapping.restore_tree(&tree))?;
    Ok(output)
}

/// Restores every labelled RAxML tree. Missing trees are reported and
/// skipped, any other failure aborts.
pub fn restore_tree_artifacts(
    work_dir: &Path,
    run_name: &str,
    mode: FilterMode,
    mapping: &IdentifierMapping,
) -> Result<RestoreSummary, PipelineError> {
    let mut summary = RestoreSummary::default();

    for artifact in RaxmlArtifact::TREES {
        match restore_tree_artifact(work_dir, artifact, run_name, mode, mapping) {
            Ok(output) => {
                println!("Renamed {} tree to {}", artifact.kind(), output.display());
                summary.restored.push(output);
            }
            Err(PipelineError::UpstreamArtifactMissing(path)) => {
                eprintln!("Error.. RAxML did not make file {}", path.display());
                summary.missing.push(artifact);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(summary)
}

/// Re-derives the mapping from the original FASTA and renames `target`,
/// either alignment headers or tree labels, into `output`.
pub fn restore_file(
    original: &Path,
    target: &Path,
    output: &Path,
    tree: bool,
) -> Result<(), PipelineError> {
    let mapping = IdentifierMapping::from_fasta(open_fasta(original)?)?;

    if !target.is_file() {
        return Err(PipelineError::UpstreamArtifactMissing(target.to_path_buf()));
    }

    if tree {
        let restored = mapping.restore_tree(&fs::read_to_string(target)?);
        fs::write(output, restored)?;
    } else {
        let writer = BufWriter::new(File::create(output)?);
        let renamed = mapping.restore_alignment(File::open(target)?, writer)?;
        println!("{} of {} headers renamed", renamed, mapping.len());
    }

    println!(
        "Renamed sequences in {} and saved to {}",
        target.display(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_mapping() -> IdentifierMapping {
        let file = File::open("tests/data/proteins.fasta").unwrap();
        IdentifierMapping::from_fasta(file).unwrap()
    }

    #[test]
    fn test_renamed_tree_name() {
        assert_eq!(
            renamed_tree_name(RaxmlArtifact::BestTree, "proteins.fasta", FilterMode::Med),
            PathBuf::from("bestTree.proteins.fasta_mode_med.renamed")
        );
    }

    #[test]
    fn test_missing_bootstrap_trees_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::copy(
            "tests/data/bestTree.newick",
            dir.path().join("RAxML_bestTree.proteins.fasta"),
        )
        .unwrap();

        let summary =
            restore_tree_artifacts(dir.path(), "proteins.fasta", FilterMode::High, &sample_mapping())
                .unwrap();

        assert_eq!(summary.restored().len(), 1);
        assert!(!summary.is_missing(RaxmlArtifact::BestTree));
        assert!(summary.is_missing(RaxmlArtifact::BipartitionsBranchLabels));
        assert!(summary.is_missing(RaxmlArtifact::Bipartitions));

        let tree =
            fs::read_to_string(dir.path().join("bestTree.proteins.fasta_mode_high.renamed"))
                .unwrap();
        assert_eq!(
            tree.trim_end(),
            "((sp|P69905|HBA_HUMAN:0.0312,tr|Q9_alpha_2__frag:0.0815):0.2451,\
             (seq_3:0.0154,seq_3:0.0228):0.1933,myoglobin:0.4410);"
        );
    }

    #[test]
    fn test_restore_tree_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = restore_tree_artifact(
            dir.path(),
            RaxmlArtifact::Bipartitions,
            "x.fasta",
            FilterMode::None,
            &sample_mapping(),
        );
        assert!(matches!(
            result,
            Err(PipelineError::UpstreamArtifactMissing(_))
        ));
    }

    #[test]
    fn test_restore_file_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let aligned = dir.path().join("aligned.fasta");
        let output = dir.path().join("restored.fasta");
        fs::write(&aligned, ">g_4\nMGL-SD\n>g_2\nMVHLTP\n").unwrap();

        restore_file(
            Path::new("tests/data/proteins.fasta"),
            &aligned,
            &output,
            false,
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            ">myoglobin\nMGL-SD\n>seq;3 beta chain\nMVHLTP\n"
        );
    }

    #[test]
    fn test_restore_file_tree_and_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tree.renamed");

        restore_file(
            Path::new("tests/data/proteins.fasta"),
            Path::new("tests/data/bestTree.newick"),
            &output,
            true,
        )
        .unwrap();
        assert!(fs::read_to_string(&output).unwrap().contains("myoglobin:0.4410"));

        let result = restore_file(
            Path::new("tests/data/proteins.fasta"),
            &dir.path().join("absent.newick"),
            &output,
            true,
        );
        assert!(matches!(
            result,
            Err(PipelineError::UpstreamArtifactMissing(_))
        ));
    }
}
