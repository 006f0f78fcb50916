use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonFileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

pub trait FromJsonString: Sized {
    fn from_json_string(json_str: &str) -> Result<Self, serde_json::Error>;

    fn from_json_file(path: &Path) -> Result<Self, JsonFileError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| JsonFileError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json_string(&content).map_err(|source| JsonFileError::Parse {
            path: display,
            source,
        })
    }
}

impl<T> FromJsonString for T
where
    T: serde::de::DeserializeOwned,
{
    fn from_json_string(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}
