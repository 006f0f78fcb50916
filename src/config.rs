use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::helper::json::{FromJsonString, JsonFileError};

pub const DEFAULT_SEED: u32 = 1234;

/// Locations of the external programs and the fixed RAxML seeds.
///
/// Resolved once at startup, either from defaults or from a JSON file in
/// which every key is optional:
///
/// ```json
/// {
///   "muscle": "/opt/bin/muscle",
///   "prottest_jar": "/opt/prottest-3.4-20140123/prottest-3.4.jar"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub muscle: String,
    pub gblocks: String,
    pub fasta2phy: String,
    pub java: String,
    pub prottest_jar: String,
    pub raxml: String,
    pub parsimony_seed: u32,
    pub bootstrap_seed: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            muscle: "muscle".to_string(),
            gblocks: "Gblocks".to_string(),
            fasta2phy: "/opt/scripts/bin/fasta_fastq/fasta2phy".to_string(),
            java: "java".to_string(),
            prottest_jar: "/opt/prottest-3.4-20140123/prottest-3.4.jar".to_string(),
            raxml: "raxmlHPC-PTHREADS".to_string(),
            parsimony_seed: DEFAULT_SEED,
            bootstrap_seed: DEFAULT_SEED,
        }
    }
}

impl ToolConfig {
    pub fn resolve(path: Option<&Path>) -> Result<Self, JsonFileError> {
        match path {
            Some(path) => ToolConfig::from_json_file(path),
            None => Ok(ToolConfig::default()),
        }
    }
}

impl Display for ToolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "muscle={}, gblocks={}, fasta2phy={}, ", self.muscle, self.gblocks, self.fasta2phy)?;
        write!(f, "java={}, prottest={}, raxml={}, ", self.java, self.prottest_jar, self.raxml)?;
        write!(f, "seeds=(p {}, x {})", self.parsimony_seed, self.bootstrap_seed)
    }
}
