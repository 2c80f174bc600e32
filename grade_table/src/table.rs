use serde::{Deserialize, Serialize};

use crate::value::{parse_float, GradeValue};
use crate::GradeError;

fn default_footer_label() -> String {
    "Final grade".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Header {
    pub label: String,
    #[serde(default)]
    pub sortable: bool,
}

impl Header {
    pub fn new(label: impl Into<String>, sortable: bool) -> Self {
        Self {
            label: label.into(),
            sortable,
        }
    }
}

/// One `<td>`. A cell with a weight is a grade cell.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    /// Raw `data-value` attribute.
    pub value: String,
    /// Text shown in the cell.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Contents of the number input while hypothesized. `None` when no input is shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,
}

impl Cell {
    pub fn text(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            weight: None,
            hypothesis: None,
        }
    }

    /// A grade cell. Its display text is derived from the value.
    pub fn grade(value: GradeValue, weight: f64) -> Self {
        let text = match value.sentinel_label() {
            Some(label) => label.to_string(),
            None => match value {
                GradeValue::Percent(p) => format!("{}%", crate::value::to_fixed(p, 1)),
                _ => String::new(),
            },
        };
        Self {
            value: value.attribute(),
            text,
            weight: Some(weight),
            hypothesis: None,
        }
    }

    pub fn is_grade(&self) -> bool {
        self.weight.is_some()
    }

    pub fn grade_value(&self) -> GradeValue {
        GradeValue::parse(&self.value)
    }

    /// Numeric key used by the column sorter.
    pub fn sort_key(&self) -> f64 {
        parse_float(&self.value)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Row {
    /// Position in document order, used to restore the unsorted view.
    pub index: usize,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GradeTable {
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
    #[serde(default = "default_footer_label")]
    pub footer_label: String,
}

impl GradeTable {
    pub fn new(headers: Vec<Header>, rows: Vec<Row>) -> Self {
        Self {
            headers,
            rows,
            footer_label: default_footer_label(),
        }
    }

    pub fn from_json(input: &str) -> Result<Self, GradeError> {
        let table: GradeTable = serde_json::from_str(input)?;
        table.validate()?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String, GradeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every row must have one cell per header and row indices must be unique.
    pub fn validate(&self) -> Result<(), GradeError> {
        let columns = self.headers.len();
        let mut seen = std::collections::HashSet::new();
        for row in &self.rows {
            if row.cells.len() != columns {
                return Err(GradeError::InvalidTable(format!(
                    "row {} has {} cells, expected {}",
                    row.index,
                    row.cells.len(),
                    columns
                )));
            }
            if !seen.insert(row.index) {
                return Err(GradeError::InvalidTable(format!(
                    "duplicate row index {}",
                    row.index
                )));
            }
        }
        Ok(())
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn grade_cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.is_grade())
    }

    pub fn grade_cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .filter(|cell| cell.is_grade())
    }

    /// Look a row up by its original index, independent of current order.
    pub fn row_mut(&mut self, row_index: usize) -> Option<&mut Row> {
        self.rows.iter_mut().find(|row| row.index == row_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip_keeps_grade_cells() {
        let input = r#"{
            "headers": [{"label": "Assignment"}, {"label": "Grade", "sortable": true}],
            "rows": [
                {"index": 0, "cells": [
                    {"value": "HW1", "text": "HW1"},
                    {"value": "90", "text": "90.0%", "weight": 10}
                ]}
            ]
        }"#;
        let table = GradeTable::from_json(input).unwrap();
        assert_eq!(table.footer_label, "Final grade");
        assert!(table.headers[1].sortable);
        assert_eq!(table.grade_cells().count(), 1);
        let again = GradeTable::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(again, table);
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let table = GradeTable::new(
            vec![Header::new("A", false), Header::new("B", true)],
            vec![Row {
                index: 0,
                cells: vec![Cell::text("x", "x")],
            }],
        );
        assert!(matches!(table.validate(), Err(GradeError::InvalidTable(_))));
    }

    #[test]
    fn test_grade_cell_text() {
        assert_eq!(Cell::grade(GradeValue::Percent(80.0), 10.0).text, "80.0%");
        assert_eq!(Cell::grade(GradeValue::NotDue, 10.0).value, "Not");
        assert_eq!(Cell::grade(GradeValue::NotDue, 10.0).text, "Not due");
    }
}
