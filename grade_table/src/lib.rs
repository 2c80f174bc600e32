//! Grade table model: three-way column sorting, hypothesis ("what-if") mode
//! and the weighted aggregate grade, independent of any particular page.
//!
//! The browser front end and the command line both drive a
//! [`GradeTableController`] and treat its rendered markup as output.

use thiserror::Error;

pub mod config;
pub mod controller;
pub mod grade;
pub mod mode;
pub mod records;
pub mod render;
pub mod sort;
pub mod table;
pub mod upload;
pub mod value;

pub use config::ControllerConfig;
pub use controller::{BodyLayout, GradeTableController};
pub use grade::{compute_grade, Aggregate};
pub use mode::TableMode;
pub use records::{
    build_profile_table, build_staff_table, grade_status, grading_progress, submission_message,
    Assignment, Gradebook, Staff, Submission,
};
pub use sort::{sort_rows, SortDirection, SortState};
pub use table::{Cell, GradeTable, Header, Row};
pub use upload::{submit_url, SubmittedFile, UploadRequest, UploadState, Uploader};
pub use value::GradeValue;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("no csrfmiddlewaretoken field on the page")]
    MissingCsrfToken,
    #[error("an upload is already in progress")]
    UploadInFlight,
    #[error("inputs are disabled")]
    InputsDisabled,
    #[error("column {0} is out of range")]
    ColumnOutOfRange(usize),
    #[error("no row with index {0}")]
    RowNotFound(usize),
    #[error("cell at row {row}, column {column} does not take a hypothetical grade")]
    NotAGradeCell { row: usize, column: usize },
    #[error("invalid table: {0}")]
    InvalidTable(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
