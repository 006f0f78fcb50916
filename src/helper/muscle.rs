use std::path::Path;
use std::process::{Command, Stdio};

use crate::helper::runner::{ToolError, run_tool};

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum MuscleVersion {
    Muscle3_8_31,
    Muscle5,
    Other(String),
    NotInstalled,
}

impl MuscleVersion {
    /// build a MUSCLE command appropriate for the version
    pub fn build_command(&self, program: &str, input: &Path, output: &Path) -> Option<Command> {
        let mut cmd = Command::new(program);
        match self {
            MuscleVersion::Muscle3_8_31 => {
                cmd.arg("-in").arg(input).arg("-out").arg(output);
            }
            MuscleVersion::Muscle5 => {
                cmd.arg("-align").arg(input).arg("-output").arg(output);
            }
            MuscleVersion::Other(version) => {
                // unknown builds are driven with the classic 3.x flags
                eprintln!("Warning: Unknown MUSCLE version: {}", version);
                cmd.arg("-in").arg(input).arg("-out").arg(output);
            }
            MuscleVersion::NotInstalled => return None,
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
        Some(cmd)
    }

    pub fn run(
        &self,
        program: &str,
        work_dir: &Path,
        input: &Path,
        output: &Path,
    ) -> Result<(), ToolError> {
        match self.build_command(program, input, output) {
            Some(mut cmd) => run_tool("MUSCLE", cmd.current_dir(work_dir)),
            None => Err(ToolError::NotInstalled(format!("MUSCLE ({})", program))),
        }
    }
}

// Muscle 3.8.31 and Muscle 5 have different command line arguments
pub fn get_muscle_version(program: &str) -> MuscleVersion {
    let output = match Command::new(program).arg("-version").output() {
        Ok(out) => out,
        Err(_) => return MuscleVersion::NotInstalled,
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    let text = if !stdout.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };

    classify_version_text(text)
}

fn classify_version_text(text: &str) -> MuscleVersion {
    if text.contains("3.8.31") {
        MuscleVersion::Muscle3_8_31
    } else if text.contains("muscle 5") || text.contains("Muscle 5") || text.contains("MUSCLE 5")
    {
        MuscleVersion::Muscle5
    } else {
        MuscleVersion::Other(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_classify_version_text() {
        assert_eq!(
            classify_version_text("MUSCLE v3.8.31 by Robert C. Edgar"),
            MuscleVersion::Muscle3_8_31
        );
        assert_eq!(
            classify_version_text("muscle 5.1.linux64 [12f0e2]"),
            MuscleVersion::Muscle5
        );
        assert!(matches!(
            classify_version_text("muscle 4.0"),
            MuscleVersion::Other(_)
        ));
    }

    #[test]
    fn test_missing_muscle_is_not_installed() {
        let version = get_muscle_version("protpipe_nonexistent_muscle");
        assert_eq!(version, MuscleVersion::NotInstalled);

        let result = version.run(
            "protpipe_nonexistent_muscle",
            Path::new("."),
            Path::new("in.fasta"),
            Path::new("out.fasta"),
        );
        assert!(matches!(result, Err(ToolError::NotInstalled(_))));
    }

    #[test]
    fn test_muscle_command_building() {
        let input = Path::new("proteins.fasta.rename");
        let output = Path::new("proteins.fasta.al");

        let cmd_3 = MuscleVersion::Muscle3_8_31
            .build_command("muscle", input, output)
            .unwrap();
        assert_eq!(
            args_of(&cmd_3),
            vec!["-in", "proteins.fasta.rename", "-out", "proteins.fasta.al"]
        );

        let cmd_5 = MuscleVersion::Muscle5
            .build_command("/opt/bin/muscle", input, output)
            .unwrap();
        assert_eq!(cmd_5.get_program(), "/opt/bin/muscle");
        assert_eq!(
            args_of(&cmd_5),
            vec!["-align", "proteins.fasta.rename", "-output", "proteins.fasta.al"]
        );
    }
}
