//! Notebook output clearing.
//!
//! Notebooks are JSON documents holding an ordered list of cells. Before
//! upload every code cell has its cached `outputs` and `execution_count`
//! cleared so that only sources are stored remotely.

mod clear_outputs;
mod notebook;

pub use clear_outputs::{NOTEBOOK_SUFFIX, clear_notebook_outputs, clear_outputs_in_directory};
pub use notebook::{Cell, CodeCell, Notebook, OtherCell};

/// Errors that can occur while reading or rewriting a notebook.
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("invalid notebook JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected notebook structure: {0}")]
    Structure(String),

    #[error("cell {index} has no cell_type")]
    MissingCellType { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    FileTree(#[from] crate::file_tree::Error),
}

/// Result type for notebook operations.
pub type Result<T> = std::result::Result<T, NotebookError>;
