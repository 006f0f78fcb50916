use std::path::PathBuf;

use thiserror::Error;

use crate::helper::fasta_ids::IdentifierError;
use crate::helper::json::JsonFileError;
use crate::helper::runner::ToolError;

pub mod protpipe;
pub mod restore;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{} already exists, remove it before running again", .0.display())]
    ConflictingOutputExists(PathBuf),

    #[error("{stage} failed: {source}")]
    ExternalToolFailure {
        stage: &'static str,
        source: ToolError,
    },

    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    #[error("Expected artifact was not produced: {}", .0.display())]
    UpstreamArtifactMissing(PathBuf),

    #[error("Cannot derive Gblocks block parameters from {0} sequences")]
    InvalidSequenceCount(usize),

    #[error("Tool configuration error: {0}")]
    Config(#[from] JsonFileError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn tool(stage: &'static str) -> impl FnOnce(ToolError) -> PipelineError {
        move |source| PipelineError::ExternalToolFailure { stage, source }
    }
}
