use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("profile directory error: {path}: {detail}")]
    ProfileDir { path: PathBuf, detail: String },

    #[error("read failed: {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to run {command}: {source}")]
    CommandSpawn {
        command: String,
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    CommandFailed { command: String, status: String },

    #[error("authorization declined while running {command}")]
    AuthorizationDeclined { command: String },

    #[error("no profile named '{0}'")]
    ProfileNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
