use std::fmt::Display;
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;

use thiserror::Error;

use crate::helper::runner::{ToolError, run_tool};

const BEST_MODEL_MARKER: &str = "Best model according to";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("no best model line in the model selection report")]
    NoBestModelLine,
    #[error("best model line has no model field: {0}")]
    EmptyModelField(String),
}

/// Substitution matrices both RAxML and pplacer accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedModel {
    Lg,
    Wag,
    Jtt,
    Dayhoff,
    Blosum62,
    MtRev,
}

impl SupportedModel {
    pub const FALLBACK: SupportedModel = SupportedModel::Lg;

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportedModel::Lg => "LG",
            SupportedModel::Wag => "WAG",
            SupportedModel::Jtt => "JTT",
            SupportedModel::Dayhoff => "DAYHOFF",
            SupportedModel::Blosum62 => "BLOSUM62",
            SupportedModel::MtRev => "MTREV",
        }
    }

    /// RAxML `-m` value using the CAT approximation.
    pub fn raxml_model(&self) -> String {
        format!("PROTCAT{}", self.as_str())
    }
}

impl FromStr for SupportedModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LG" => Ok(SupportedModel::Lg),
            "WAG" => Ok(SupportedModel::Wag),
            "JTT" => Ok(SupportedModel::Jtt),
            "DAYHOFF" => Ok(SupportedModel::Dayhoff),
            "BLOSUM62" => Ok(SupportedModel::Blosum62),
            "MTREV" => Ok(SupportedModel::MtRev),
            other => Err(other.to_string()),
        }
    }
}

impl Display for SupportedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of mapping a parsed model name onto [`SupportedModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelChoice {
    Selected(SupportedModel),
    /// The parsed name is not supported, the fallback is used instead.
    Fallback { rejected: String },
}

impl ModelChoice {
    pub fn model(&self) -> SupportedModel {
        match self {
            ModelChoice::Selected(model) => *model,
            ModelChoice::Fallback { .. } => SupportedModel::FALLBACK,
        }
    }
}

/// Extracts the best-fit matrix from a ProtTest report.
///
/// The first "Best model according to <criterion>: <model>" line wins; the
/// matrix is the part of `<model>` before any `+I`/`+G`/`+F` suffix,
/// uppercased.
pub fn parse_best_model(report: &str) -> Result<String, ModelParseError> {
    let line = report
        .lines()
        .find(|line| line.contains(BEST_MODEL_MARKER))
        .ok_or(ModelParseError::NoBestModelLine)?;

    let field = line
        .split_whitespace()
        .nth(5)
        .and_then(|f| f.split('+').next())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ModelParseError::EmptyModelField(line.trim().to_string()))?;

    Ok(field.to_uppercase())
}

pub fn select_model(parsed: &str) -> ModelChoice {
    match parsed.parse::<SupportedModel>() {
        Ok(model) => ModelChoice::Selected(model),
        Err(rejected) => ModelChoice::Fallback { rejected },
    }
}

pub fn build_command(
    java: &str,
    jar: &str,
    alignment: &Path,
    report: &Path,
    threads: u32,
) -> Command {
    let mut cmd = Command::new(java);
    cmd.arg("-jar")
        .arg(jar)
        .arg("-i")
        .arg(alignment)
        .arg("-o")
        .arg(report)
        .arg("-all-matrices")
        .arg("-all-distributions")
        .arg("-log")
        .arg("disabled")
        .arg("-threads")
        .arg(threads.to_string())
        .stdout(Stdio::null());
    cmd
}

pub fn run(
    java: &str,
    jar: &str,
    work_dir: &Path,
    alignment: &Path,
    report: &Path,
    threads: u32,
) -> Result<(), ToolError> {
    let mut cmd = build_command(java, jar, alignment, report, threads);
    run_tool("ProtTest", cmd.current_dir(work_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_best_model_from_report() {
        let report = std::fs::read_to_string("tests/data/prottest_report.txt").unwrap();
        assert_eq!(parse_best_model(&report), Ok("BLOSUM62".to_string()));
    }

    #[test]
    fn test_parse_best_model_errors() {
        assert_eq!(
            parse_best_model("ProtTest 3.4\nno result\n"),
            Err(ModelParseError::NoBestModelLine)
        );
        assert!(matches!(
            parse_best_model("Best model according to AIC:"),
            Err(ModelParseError::EmptyModelField(_))
        ));
        assert_eq!(
            parse_best_model("  Best model according to   BIC:  MtREV+I+G"),
            Ok("MTREV".to_string())
        );
    }

    #[test]
    fn test_select_model_falls_back_to_lg() {
        assert_eq!(
            select_model("WAG"),
            ModelChoice::Selected(SupportedModel::Wag)
        );
        let choice = select_model("CPREV");
        assert_eq!(
            choice,
            ModelChoice::Fallback {
                rejected: "CPREV".to_string()
            }
        );
        assert_eq!(choice.model(), SupportedModel::Lg);
        assert_eq!(SupportedModel::Dayhoff.raxml_model(), "PROTCATDAYHOFF");
    }

    #[test]
    fn test_prottest_command_building() {
        let cmd = build_command(
            "java",
            "/opt/prottest/prottest-3.4.jar",
            Path::new("x.phy"),
            Path::new("x.model"),
            8,
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            vec![
                "-jar",
                "/opt/prottest/prottest-3.4.jar",
                "-i",
                "x.phy",
                "-o",
                "x.model",
                "-all-matrices",
                "-all-distributions",
                "-log",
                "disabled",
                "-threads",
                "8"
            ]
        );
    }
}
