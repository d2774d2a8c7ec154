use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EagerError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected layout in '{path}': {message}")]
    Layout { path: PathBuf, message: String },
    #[error("eager result directory '{0}' does not exist")]
    MissingDirectory(PathBuf),
}

impl EagerError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
