//! One controller per table. It owns the table model, its sort state and the
//! hypothesis mode; nothing is shared between tables.

use tracing::debug;

use crate::config::ControllerConfig;
use crate::grade::{compute_grade, Aggregate};
use crate::mode::TableMode;
use crate::render::{render_button, render_table};
use crate::sort::{sort_rows, SortState};
use crate::table::GradeTable;
use crate::GradeError;

/// Row order and mode: everything the table body's structure depends on.
/// Hypothesis edits leave it unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyLayout {
    pub mode: TableMode,
    pub order: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct GradeTableController {
    table: GradeTable,
    sort: SortState,
    mode: TableMode,
    config: ControllerConfig,
}

impl GradeTableController {
    pub fn new(table: GradeTable, config: ControllerConfig) -> Result<Self, GradeError> {
        table.validate()?;
        Ok(Self {
            table,
            sort: SortState::default(),
            mode: TableMode::Normal,
            config,
        })
    }

    pub fn table(&self) -> &GradeTable {
        &self.table
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Click on a header. Clicks on non-sortable headers are ignored.
    pub fn click_header(&mut self, column: usize) -> Result<(), GradeError> {
        let header = self
            .table
            .headers
            .get(column)
            .ok_or(GradeError::ColumnOutOfRange(column))?;
        if !header.sortable {
            return Ok(());
        }
        self.sort.click(column);
        sort_rows(&mut self.table.rows, &self.sort);
        Ok(())
    }

    /// Flip between actual and hypothetical grades. Entering gives every
    /// ungraded or not-due cell an empty input; leaving drops the inputs.
    pub fn toggle_mode(&mut self) -> Aggregate {
        self.mode = self.mode.toggled();
        let hypothesized = self.mode.is_hypothesized();
        for cell in self.table.grade_cells_mut() {
            if cell.grade_value().is_hypothesizable() {
                cell.hypothesis = hypothesized.then(String::new);
            }
        }
        debug!(mode = ?self.mode, "table mode changed");
        self.aggregate()
    }

    /// Store what the user typed into a hypothesis input and recompute.
    pub fn set_hypothesis(
        &mut self,
        row_index: usize,
        column: usize,
        text: &str,
    ) -> Result<Aggregate, GradeError> {
        let not_grade = GradeError::NotAGradeCell {
            row: row_index,
            column,
        };
        let row = self
            .table
            .row_mut(row_index)
            .ok_or(GradeError::RowNotFound(row_index))?;
        let cell = row
            .cells
            .get_mut(column)
            .ok_or(GradeError::ColumnOutOfRange(column))?;
        if !cell.is_grade() || cell.hypothesis.is_none() {
            return Err(not_grade);
        }
        cell.hypothesis = Some(text.to_string());
        Ok(self.aggregate())
    }

    pub fn body_layout(&self) -> BodyLayout {
        BodyLayout {
            mode: self.mode,
            order: self.table.rows.iter().map(|r| r.index).collect(),
        }
    }

    pub fn aggregate(&self) -> Aggregate {
        compute_grade(self.table.grade_cells(), self.mode)
    }

    pub fn aggregate_display(&self) -> String {
        self.aggregate().display(&self.config)
    }

    /// Toggle button followed by the table, as the page shows them.
    pub fn render_html(&self) -> String {
        let mut out = render_button(self.mode);
        out.push('\n');
        out.push_str(&render_table(
            &self.table,
            &self.sort,
            self.mode,
            &self.aggregate_display(),
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Header, Row};
    use crate::value::GradeValue;

    fn controller() -> GradeTableController {
        let rows = vec![
            (GradeValue::Percent(80.0), 10.0),
            (GradeValue::Ungraded, 15.0),
            (GradeValue::NotDue, 20.0),
            (GradeValue::Missing, 5.0),
            (GradeValue::Percent(40.0), 10.0),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (value, weight))| Row {
            index,
            cells: vec![
                Cell::text(format!("HW{index}"), format!("HW{index}")),
                Cell::grade(value, weight),
            ],
        })
        .collect();
        let table = GradeTable::new(
            vec![Header::new("Assignment", false), Header::new("Grade", true)],
            rows,
        );
        GradeTableController::new(table, ControllerConfig::default()).unwrap()
    }

    #[test]
    fn test_toggle_twice_restores_markup() {
        let mut c = controller();
        let before = c.render_html();
        c.toggle_mode();
        let during = c.render_html();
        assert!(during.contains("<input type='number'>"));
        assert!(!during.contains(">Not due<"));
        c.toggle_mode();
        assert_eq!(c.render_html(), before);
        assert!(before.contains(">Ungraded</td>"));
        assert!(before.contains(">Not due</td>"));
    }

    #[test]
    fn test_hypothesis_recomputes() {
        let mut c = controller();
        // 80% of 10, missing 5, 40% of 10
        assert_eq!(c.aggregate_display(), "48.0%");
        c.toggle_mode();
        assert_eq!(c.aggregate_display(), "48.0%");
        let agg = c.set_hypothesis(1, 1, "100").unwrap();
        assert_eq!(agg.possible, 40.0);
        assert_eq!(c.aggregate_display(), "67.5%");
        c.set_hypothesis(1, 1, "").unwrap();
        assert_eq!(c.aggregate_display(), "48.0%");
    }

    #[test]
    fn test_body_layout_ignores_hypothesis_edits() {
        let mut c = controller();
        c.toggle_mode();
        let layout = c.body_layout();
        assert_eq!(layout.order, vec![0, 1, 2, 3, 4]);
        c.set_hypothesis(1, 1, "95").unwrap();
        c.set_hypothesis(2, 1, "70").unwrap();
        assert_eq!(c.body_layout(), layout);

        c.click_header(1).unwrap();
        assert_ne!(c.body_layout(), layout);
        c.click_header(1).unwrap();
        c.click_header(1).unwrap();
        assert_eq!(c.body_layout(), layout);
        c.toggle_mode();
        assert_eq!(c.body_layout().mode, TableMode::Normal);
    }

    #[test]
    fn test_hypothesis_needs_hypothesized_sentinel_cell() {
        let mut c = controller();
        assert!(matches!(
            c.set_hypothesis(1, 1, "90"),
            Err(GradeError::NotAGradeCell { row: 1, column: 1 })
        ));
        c.toggle_mode();
        assert!(matches!(
            c.set_hypothesis(0, 1, "90"),
            Err(GradeError::NotAGradeCell { .. })
        ));
        assert!(matches!(
            c.set_hypothesis(0, 0, "90"),
            Err(GradeError::NotAGradeCell { .. })
        ));
    }

    #[test]
    fn test_leaving_hypothesis_drops_typed_scores() {
        let mut c = controller();
        c.toggle_mode();
        c.set_hypothesis(2, 1, "50").unwrap();
        c.toggle_mode();
        assert!(c.table().grade_cells().all(|cell| cell.hypothesis.is_none()));
        assert_eq!(c.aggregate_display(), "48.0%");
    }

    #[test]
    fn test_sorting_keeps_hypotheses_attached_to_rows() {
        let mut c = controller();
        c.toggle_mode();
        c.set_hypothesis(1, 1, "70").unwrap();
        c.click_header(1).unwrap();
        let order: Vec<usize> = c.table().rows.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![4, 0, 1, 2, 3]);
        c.click_header(1).unwrap();
        c.click_header(1).unwrap();
        let order: Vec<usize> = c.table().rows.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(c.table().rows[1].cells[1].hypothesis.as_deref(), Some("70"));
    }

    #[test]
    fn test_non_sortable_header_is_ignored() {
        let mut c = controller();
        c.click_header(0).unwrap();
        assert_eq!(c.sort_state().active(), None);
        assert!(matches!(c.click_header(9), Err(GradeError::ColumnOutOfRange(9))));
        c.toggle_mode();
        assert!(matches!(c.set_hypothesis(42, 1, "1"), Err(GradeError::RowNotFound(42))));
    }

    #[test]
    fn test_separate_controllers_do_not_interfere() {
        let mut a = controller();
        let b = controller();
        a.toggle_mode();
        a.click_header(1).unwrap();
        assert_eq!(b.mode(), TableMode::Normal);
        assert_eq!(b.sort_state().active(), None);
        assert!(!b.render_html().contains("hypothesized"));
    }
}
