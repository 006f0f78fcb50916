use std::fmt::Display;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::helper::runner::{ToolError, run_tool};

/// Suffix Gblocks appends to the filtered alignment (`-e=`).
pub const FILTERED_SUFFIX: &str = ".fst";

/// Filter stringency, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    High,
    Med,
    Low,
    None,
}

impl FilterMode {
    /// Gblocks `-b5` allowed-gap-positions value, `None` skips Gblocks.
    pub fn allowed_gaps(&self) -> Option<&'static str> {
        match self {
            FilterMode::High => Some("n"),
            FilterMode::Med => Some("h"),
            FilterMode::Low => Some("a"),
            FilterMode::None => None,
        }
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(FilterMode::High),
            "med" => Ok(FilterMode::Med),
            "low" => Ok(FilterMode::Low),
            "none" => Ok(FilterMode::None),
            other => Err(format!(
                "mode needs to be high or med or low or none, got '{}'",
                other
            )),
        }
    }
}

impl Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FilterMode::High => "high",
            FilterMode::Med => "med",
            FilterMode::Low => "low",
            FilterMode::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Block parameters derived from the number of aligned sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockParams {
    /// minimum number of sequences for a conserved position
    pub b1: usize,
    /// minimum number of sequences for a flank position
    pub b2: usize,
    /// maximum number of contiguous non-conserved positions
    pub b3: usize,
    /// minimum block length
    pub b4: usize,
    pub b5: &'static str,
}

impl BlockParams {
    /// Returns `None` when there is nothing to filter or the mode skips Gblocks.
    pub fn for_sequences(sequence_count: usize, mode: FilterMode) -> Option<Self> {
        if sequence_count == 0 {
            return None;
        }
        let half = sequence_count / 2;
        Some(BlockParams {
            b1: half + 1,
            b2: half + 1,
            b3: half,
            b4: 2,
            b5: mode.allowed_gaps()?,
        })
    }
}

pub fn build_command(program: &str, alignment: &Path, params: &BlockParams) -> Command {
    let mut cmd = Command::new(program);
    cmd.arg(alignment)
        .arg("-t=p")
        .arg("-p=n")
        .arg(format!("-e={}", FILTERED_SUFFIX))
        .arg(format!("-b1={}", params.b1))
        .arg(format!("-b2={}", params.b2))
        .arg(format!("-b3={}", params.b3))
        .arg(format!("-b4={}", params.b4))
        .arg(format!("-b5={}", params.b5))
        .stdout(Stdio::null());
    cmd
}

pub fn run(
    program: &str,
    work_dir: &Path,
    alignment: &Path,
    params: &BlockParams,
) -> Result<(), ToolError> {
    run_tool("Gblocks", build_command(program, alignment, params).current_dir(work_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mode_parsing() {
        assert_eq!("high".parse::<FilterMode>(), Ok(FilterMode::High));
        assert_eq!("none".parse::<FilterMode>(), Ok(FilterMode::None));
        assert!("medium".parse::<FilterMode>().is_err());
        assert!("HIGH".parse::<FilterMode>().is_err());
        assert_eq!(FilterMode::Med.to_string(), "med");
    }

    #[test]
    fn test_block_params_from_sequence_count() {
        let params = BlockParams::for_sequences(7, FilterMode::Med).unwrap();
        assert_eq!(
            params,
            BlockParams {
                b1: 4,
                b2: 4,
                b3: 3,
                b4: 2,
                b5: "h"
            }
        );

        assert!(BlockParams::for_sequences(0, FilterMode::High).is_none());
        assert!(BlockParams::for_sequences(10, FilterMode::None).is_none());
    }

    #[test]
    fn test_gblocks_command_building() {
        let params = BlockParams::for_sequences(10, FilterMode::High).unwrap();
        let cmd = build_command("Gblocks", Path::new("proteins.fasta.tmp"), &params);
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "proteins.fasta.tmp",
                "-t=p",
                "-p=n",
                "-e=.fst",
                "-b1=6",
                "-b2=6",
                "-b3=5",
                "-b4=2",
                "-b5=n"
            ]
        );
    }
}
