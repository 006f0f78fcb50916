use std::process::{Command, ExitStatus};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0} is not installed or not found in PATH")]
    NotInstalled(String),
    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },
    #[error("{tool} command failed with status: {status}")]
    Failed { tool: String, status: ExitStatus },
}

/// Runs a prepared command to completion and checks its exit status.
pub fn run_tool(tool: &str, cmd: &mut Command) -> Result<(), ToolError> {
    let status = cmd.status().map_err(|source| ToolError::Spawn {
        tool: tool.to_string(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            tool: tool.to_string(),
            status,
        })
    }
}

/// Renders a command the way it would be typed in a shell, for the run log.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_tool_reports_missing_program() {
        let mut cmd = Command::new("protpipe_nonexistent_tool");
        let result = run_tool("nonexistent", &mut cmd);
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_tool_checks_exit_status() {
        assert!(run_tool("true", &mut Command::new("true")).is_ok());
        assert!(matches!(
            run_tool("false", &mut Command::new("false")),
            Err(ToolError::Failed { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let mut cmd = Command::new("muscle");
        cmd.arg("-in").arg("a.fasta");
        assert_eq!(describe(&cmd), "muscle -in a.fasta");
    }
}
