//! Typed view of a notebook document.
//!
//! Only the parts of the format that output clearing touches are modelled:
//! the top-level `cells` list and each cell's `cell_type`. Every other field
//! is carried through untouched and in its original order.

use serde_json::{Map, Value};

use super::{NotebookError, Result};

const CELLS: &str = "cells";
const CELL_TYPE: &str = "cell_type";
const OUTPUTS: &str = "outputs";
const EXECUTION_COUNT: &str = "execution_count";

// =============================================================================
// Cells
// =============================================================================

/// A notebook cell, tagged by its `cell_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// An executable cell carrying cached outputs.
    Code(CodeCell),
    /// Markdown, raw, or any other non-executable cell.
    Other(OtherCell),
}

/// A cell whose `cell_type` is `"code"`.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeCell {
    fields: Map<String, Value>,
}

/// A cell of any type other than `"code"`.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherCell {
    cell_type: String,
    fields: Map<String, Value>,
}

impl Cell {
    fn from_value(index: usize, value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(NotebookError::Structure(format!(
                "cell {} is not an object",
                index
            )));
        };

        let cell_type = match fields.get(CELL_TYPE) {
            None => return Err(NotebookError::MissingCellType { index }),
            Some(Value::String(cell_type)) => cell_type.clone(),
            Some(_) => {
                return Err(NotebookError::Structure(format!(
                    "cell {} has a non-string cell_type",
                    index
                )));
            }
        };

        if cell_type == "code" {
            Ok(Cell::Code(CodeCell { fields }))
        } else {
            Ok(Cell::Other(OtherCell { cell_type, fields }))
        }
    }

    /// The cell's `cell_type` tag.
    pub fn cell_type(&self) -> &str {
        match self {
            Cell::Code(_) => "code",
            Cell::Other(cell) => &cell.cell_type,
        }
    }

    /// All fields of the cell, in document order.
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Cell::Code(cell) => &cell.fields,
            Cell::Other(cell) => &cell.fields,
        }
    }

    fn to_value(&self) -> Value {
        Value::Object(self.fields().clone())
    }
}

impl CodeCell {
    pub fn outputs(&self) -> Option<&Value> {
        self.fields.get(OUTPUTS)
    }

    pub fn execution_count(&self) -> Option<&Value> {
        self.fields.get(EXECUTION_COUNT)
    }

    /// Reset `outputs` to an empty list and `execution_count` to null.
    ///
    /// Fields already present keep their position; missing ones are appended.
    pub fn clear_outputs(&mut self) {
        self.fields
            .insert(OUTPUTS.to_string(), Value::Array(Vec::new()));
        self.fields.insert(EXECUTION_COUNT.to_string(), Value::Null);
    }
}

// =============================================================================
// Notebook
// =============================================================================

/// A parsed notebook document.
#[derive(Debug, Clone, PartialEq)]
pub struct Notebook {
    /// Top-level fields in document order. When `cells` is present its slot
    /// here holds a placeholder that is replaced on output.
    fields: Map<String, Value>,
    cells: Option<Vec<Cell>>,
}

impl Notebook {
    /// Parse a notebook from JSON text.
    ///
    /// A document without `cells` is accepted and has nothing to clear.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(NotebookError::Structure(
                "top-level value is not an object".to_string(),
            ));
        };

        let cells = match fields.get_mut(CELLS) {
            None => None,
            Some(slot) => match slot.take() {
                Value::Array(items) => Some(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(index, item)| Cell::from_value(index, item))
                        .collect::<Result<Vec<_>>>()?,
                ),
                _ => {
                    return Err(NotebookError::Structure(
                        "cells is not an array".to_string(),
                    ));
                }
            },
        };

        Ok(Self { fields, cells })
    }

    /// The notebook's cells, if it has a `cells` list.
    pub fn cells(&self) -> Option<&[Cell]> {
        self.cells.as_deref()
    }

    /// Clear the outputs of every code cell, returning how many were cleared.
    pub fn clear_outputs(&mut self) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut().flatten() {
            if let Cell::Code(code) = cell {
                code.clear_outputs();
                cleared += 1;
            }
        }
        cleared
    }

    pub fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        if let Some(cells) = &self.cells {
            fields.insert(
                CELLS.to_string(),
                Value::Array(cells.iter().map(Cell::to_value).collect()),
            );
        }
        Value::Object(fields)
    }

    /// Render as UTF-8 JSON indented by two spaces. Non-ASCII text is
    /// written as-is rather than escaped.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }
}

// =============================================================================
// Tests
// =============================================================================
