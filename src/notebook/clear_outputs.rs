use std::path::Path;

use futures::TryStreamExt;
use tokio::fs;

use super::{Notebook, Result};
use crate::file_tree::{FsFileTree, walk};

/// File name suffix identifying notebooks.
pub const NOTEBOOK_SUFFIX: &str = ".ipynb";

/// Clear the outputs of every code cell in the notebook at `path`, rewriting
/// it in place. Returns the number of code cells cleared.
pub async fn clear_notebook_outputs(path: &Path) -> Result<usize> {
    let json = fs::read_to_string(path).await?;
    let mut notebook = Notebook::parse(&json)?;
    let cleared = notebook.clear_outputs();
    fs::write(path, notebook.to_json_pretty()?).await?;
    Ok(cleared)
}

/// Clear outputs from every notebook under `root`, in walk order.
///
/// Stops at the first notebook that cannot be read or parsed. Returns the
/// number of notebooks rewritten.
pub async fn clear_outputs_in_directory(root: &Path) -> Result<usize> {
    let tree = FsFileTree::new();
    let mut entries = walk(&tree, root);
    let mut processed = 0;

    while let Some(entry) = entries.try_next().await? {
        if !entry.name_lossy().ends_with(NOTEBOOK_SUFFIX) {
            continue;
        }
        tracing::info!("Clearing outputs from: {}", entry.path.display());
        clear_notebook_outputs(&entry.path).await?;
        processed += 1;
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::NotebookError;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn write_json(path: &Path, value: &Value) {
        std::fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn notebook_with_output() -> Value {
        json!({
            "cells": [
                {"cell_type": "code", "execution_count": 1, "outputs": [{"data": "x"}], "source": "1"},
                {"cell_type": "markdown", "source": "ünïcode"}
            ],
            "metadata": {}
        })
    }

    #[tokio::test]
    async fn test_rewrites_file_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.ipynb");
        write_json(&path, &notebook_with_output());

        assert_eq!(clear_notebook_outputs(&path).await.unwrap(), 1);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ünïcode"));
        assert!(text.contains("\n  \"cells\": ["));

        let value = read_json(&path);
        assert_eq!(value["cells"][0]["outputs"], json!([]));
        assert!(value["cells"][0]["execution_count"].is_null());
        assert_eq!(value["cells"][1], notebook_with_output()["cells"][1]);
    }

    #[tokio::test]
    async fn test_second_pass_is_byte_identical() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.ipynb");
        write_json(&path, &notebook_with_output());

        clear_notebook_outputs(&path).await.unwrap();
        let first = std::fs::read(&path).unwrap();
        clear_notebook_outputs(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[tokio::test]
    async fn test_directory_pass_only_touches_notebooks() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("nested/deeper")).unwrap();
        write_json(&temp.path().join("top.ipynb"), &notebook_with_output());
        write_json(
            &temp.path().join("nested/deeper/inner.ipynb"),
            &notebook_with_output(),
        );
        std::fs::write(temp.path().join("nested/data.json"), "{\"outputs\": [1]}").unwrap();

        let processed = clear_outputs_in_directory(temp.path()).await.unwrap();
        assert_eq!(processed, 2);

        let inner = read_json(&temp.path().join("nested/deeper/inner.ipynb"));
        assert_eq!(inner["cells"][0]["outputs"], json!([]));
        assert_eq!(
            std::fs::read_to_string(temp.path().join("nested/data.json")).unwrap(),
            "{\"outputs\": [1]}"
        );
    }

    #[tokio::test]
    async fn test_invalid_notebook_aborts() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("broken.ipynb"), "{ nope").unwrap();

        let result = clear_outputs_in_directory(temp.path()).await;
        assert!(matches!(result, Err(NotebookError::Parse(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_utf8_notebook_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join(OsStr::from_bytes(b"r\xe9sum\xe9.ipynb"));
        write_json(&path, &notebook_with_output());

        assert_eq!(clear_outputs_in_directory(temp.path()).await.unwrap(), 1);
        assert_eq!(read_json(&path)["cells"][0]["outputs"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = clear_outputs_in_directory(&temp.path().join("missing")).await;
        assert!(matches!(result, Err(NotebookError::FileTree(_))));
    }
}
