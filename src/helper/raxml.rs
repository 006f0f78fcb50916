use std::path::{Path, PathBuf};
use std::process::Command;

use crate::helper::prottest::SupportedModel;
use crate::helper::runner::{ToolError, run_tool};

/// Substitution model handed to RAxML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeModel {
    Selected(SupportedModel),
    /// Passed through verbatim, e.g. `PROTGAMMAWAG`.
    Override(String),
}

impl TreeModel {
    pub fn raxml_arg(&self) -> String {
        match self {
            TreeModel::Selected(model) => model.raxml_model(),
            TreeModel::Override(model) => model.clone(),
        }
    }
}

/// Output files RAxML writes for run name `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaxmlArtifact {
    BestTree,
    BipartitionsBranchLabels,
    Bipartitions,
    Bootstrap,
    Info,
}

impl RaxmlArtifact {
    pub const ALL: [RaxmlArtifact; 5] = [
        RaxmlArtifact::BestTree,
        RaxmlArtifact::BipartitionsBranchLabels,
        RaxmlArtifact::Bipartitions,
        RaxmlArtifact::Bootstrap,
        RaxmlArtifact::Info,
    ];

    /// Trees that carry leaf labels and get renamed after a run.
    pub const TREES: [RaxmlArtifact; 3] = [
        RaxmlArtifact::BestTree,
        RaxmlArtifact::BipartitionsBranchLabels,
        RaxmlArtifact::Bipartitions,
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            RaxmlArtifact::BestTree => "bestTree",
            RaxmlArtifact::BipartitionsBranchLabels => "bipartitionsBranchLabels",
            RaxmlArtifact::Bipartitions => "bipartitions",
            RaxmlArtifact::Bootstrap => "bootstrap",
            RaxmlArtifact::Info => "info",
        }
    }

    pub fn file_name(&self, run_name: &str) -> PathBuf {
        PathBuf::from(format!("RAxML_{}.{}", self.kind(), run_name))
    }
}

#[derive(Debug, Clone)]
pub struct RaxmlRun<'a> {
    pub program: &'a str,
    pub model: &'a TreeModel,
    pub run_name: &'a str,
    pub alignment: &'a Path,
    pub bootstraps: u32,
    pub threads: u32,
    pub parsimony_seed: u32,
    pub bootstrap_seed: u32,
}

impl RaxmlRun<'_> {
    /// Rapid bootstrap analysis plus best-scoring ML tree search (`-f a`).
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(self.program);
        cmd.arg("-f")
            .arg("a")
            .arg("-m")
            .arg(self.model.raxml_arg())
            .arg("-n")
            .arg(self.run_name)
            .arg("-N")
            .arg(self.bootstraps.to_string())
            .arg("-p")
            .arg(self.parsimony_seed.to_string())
            .arg("-s")
            .arg(self.alignment)
            .arg("-x")
            .arg(self.bootstrap_seed.to_string())
            .arg("-T")
            .arg(self.threads.to_string());
        cmd
    }

    /// RAxML output is left attached to the terminal.
    pub fn run(&self, work_dir: &Path) -> Result<(), ToolError> {
        run_tool("RAxML", self.build_command().current_dir(work_dir))
    }
}
