//! Task resolution
//!
//! Matches an ordered pick list against the current cycle's detections and
//! produces scene-indexed pick-and-place [`Command`]s.

pub mod actuation;
pub mod command;
pub mod config;
pub mod output;
pub mod resolver;
pub mod scene;

pub use actuation::*;
pub use command::*;
pub use config::*;
pub use output::*;
pub use resolver::*;
pub use scene::*;

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, TaskError>;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Scene cannot be determined for a pick list with {0} objects")]
    UnknownScene(usize),

    #[error("Dropbox group '{0}' is defined more than once")]
    DuplicateGroup(String),

    #[error("Pick list item '{item}' uses group '{group}' with no dropbox")]
    MissingDropbox { item: String, group: String },

    #[error("Invalid configuration in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    Output { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskError {
    /// Errors that come from the supplied pick list or dropbox table.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TaskError::UnknownScene(_)
                | TaskError::DuplicateGroup(_)
                | TaskError::MissingDropbox { .. }
                | TaskError::Yaml { .. }
        )
    }
}
