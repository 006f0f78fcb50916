use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::helper::runner::{ToolError, run_tool};

/// Pipes a FASTA alignment through the external converter, writing the
/// PHYLIP result to `output`.
pub fn convert(
    program: &str,
    work_dir: &Path,
    input: &Path,
    output: &Path,
) -> Result<(), ToolError> {
    let io_error = |source| ToolError::Spawn {
        tool: "fasta2phy".to_string(),
        source,
    };
    let stdin = File::open(work_dir.join(input)).map_err(io_error)?;
    let stdout = File::create(work_dir.join(output)).map_err(io_error)?;

    let mut cmd = Command::new(program);
    cmd.current_dir(work_dir)
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout));
    run_tool("fasta2phy", &mut cmd)
}
