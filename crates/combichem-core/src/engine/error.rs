use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No input pool named '{name}' for leaf node")]
    MissingPool { name: String },

    #[error("Invalid composition tree: {source}")]
    Tree {
        #[from]
        source: TreeError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to build worker pool: {0}")]
    Executor(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TreeError {
    #[error("Node id does not belong to this tree")]
    UnknownNode,

    #[error("Node '{node}' has no children")]
    EmptyChildren { node: String },

    #[error("Node '{node}' is used as a child more than once")]
    ChildReused { node: String },

    #[error("Two nodes share the name '{name}'")]
    DuplicateName { name: String },

    #[error("Leaf '{node}' declares attachment point {index} more than once")]
    DuplicateAttachment { node: String, index: u32 },

    #[error("Attachment point {index} appears more than twice below node '{node}'")]
    AttachmentConflict { node: String, index: u32 },
}
