//! Weighted aggregate over the grade cells of one table.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ControllerConfig, MAX_DECIMALS};
use crate::mode::TableMode;
use crate::table::Cell;
use crate::value::{parse_number, to_fixed, GradeValue};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Aggregate {
    pub earned: f64,
    pub possible: f64,
}

impl Aggregate {
    fn add(&mut self, weight: f64, percent: f64) {
        self.possible += weight;
        self.earned += weight * percent;
    }

    /// `None` when nothing contributed any possible points.
    pub fn percent(&self) -> Option<f64> {
        if self.possible == 0.0 {
            None
        } else {
            Some(self.earned / self.possible * 100.0)
        }
    }

    /// Footer text, e.g. `83.3%`, or the configured placeholder.
    pub fn display(&self, config: &ControllerConfig) -> String {
        match self.percent() {
            Some(p) => format!("{}%", to_fixed(p, config.decimals.min(MAX_DECIMALS))),
            None => config.na_label.clone(),
        }
    }
}

/// Sum earned and possible points over `cells`. Non-grade cells are ignored.
///
/// `Ungraded` and not-due cells count only in hypothesis mode and only once
/// the user has typed a score; every other grade cell always adds its weight
/// to the possible points, with `Missing` earning nothing.
pub fn compute_grade<'a, I>(cells: I, mode: TableMode) -> Aggregate
where
    I: IntoIterator<Item = &'a Cell>,
{
    let mut agg = Aggregate::default();
    for cell in cells {
        let Some(weight) = cell.weight else {
            continue;
        };
        let value = cell.grade_value();
        if value.is_hypothesizable() {
            if !mode.is_hypothesized() {
                continue;
            }
            match cell.hypothesis.as_deref() {
                Some(text) if !text.is_empty() => {
                    let percent = parse_number(text) / 100.0;
                    debug!(weight, percent, "hypothetical contribution");
                    agg.add(weight, percent);
                }
                _ => {}
            }
            continue;
        }
        let percent = match value {
            GradeValue::Percent(v) => v / 100.0,
            _ => 0.0,
        };
        debug!(weight, percent, "grade contribution");
        agg.add(weight, percent);
    }
    agg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypothesized(value: GradeValue, weight: f64, input: &str) -> Cell {
        let mut cell = Cell::grade(value, weight);
        cell.hypothesis = Some(input.to_string());
        cell
    }

    #[test]
    fn test_weighted_average_normal_mode() {
        let cells = vec![
            Cell::grade(GradeValue::Percent(50.0), 10.0),
            Cell::grade(GradeValue::Percent(100.0), 20.0),
        ];
        let agg = compute_grade(&cells, TableMode::Normal);
        assert_eq!(agg.possible, 30.0);
        assert!((agg.percent().unwrap() - 83.333_333).abs() < 1e-4);
        assert_eq!(agg.display(&ControllerConfig::default()), "83.3%");
    }

    #[test]
    fn test_quarter_point_rounds_half_up() {
        let cells: Vec<Cell> = [100.0, 100.0, 100.0, 25.0]
            .into_iter()
            .map(|v| Cell::grade(GradeValue::Percent(v), 1.0))
            .collect();
        let agg = compute_grade(&cells, TableMode::Normal);
        assert_eq!(agg.percent(), Some(81.25));
        assert_eq!(agg.display(&ControllerConfig::default()), "81.3%");
    }

    #[test]
    fn test_empty_hypothesis_contributes_nothing() {
        let cells = vec![
            hypothesized(GradeValue::Ungraded, 15.0, ""),
            Cell::grade(GradeValue::Percent(80.0), 10.0),
        ];
        let agg = compute_grade(&cells, TableMode::Hypothesized);
        assert_eq!(agg.possible, 10.0);
        assert_eq!(agg.display(&ControllerConfig::default()), "80.0%");
    }

    #[test]
    fn test_filled_hypothesis_counts_in_hypothesized_mode_only() {
        let cells = vec![
            hypothesized(GradeValue::NotDue, 10.0, "100"),
            Cell::grade(GradeValue::Percent(50.0), 10.0),
        ];
        let hypo = compute_grade(&cells, TableMode::Hypothesized);
        assert_eq!(hypo.possible, 20.0);
        assert_eq!(hypo.earned, 15.0);
        let normal = compute_grade(&cells, TableMode::Normal);
        assert_eq!(normal.possible, 10.0);
        assert_eq!(normal.earned, 5.0);
    }

    #[test]
    fn test_missing_counts_as_zero() {
        let cells = vec![
            Cell::grade(GradeValue::Missing, 25.0),
            Cell::grade(GradeValue::Percent(90.0), 75.0),
        ];
        let agg = compute_grade(&cells, TableMode::Normal);
        assert_eq!(agg.possible, 100.0);
        assert_eq!(agg.display(&ControllerConfig::default()), "67.5%");
    }

    #[test]
    fn test_no_contributing_cells_is_not_available() {
        let cells = vec![
            Cell::grade(GradeValue::Ungraded, 10.0),
            Cell::text("HW1", "HW1"),
        ];
        let agg = compute_grade(&cells, TableMode::Normal);
        assert_eq!(agg.percent(), None);
        assert_eq!(agg.display(&ControllerConfig::default()), "N/A");
    }

    #[test]
    fn test_malformed_value_propagates_nan() {
        let mut cell = Cell::grade(GradeValue::Percent(0.0), 10.0);
        cell.value = "pending".to_string();
        let agg = compute_grade(std::iter::once(&cell), TableMode::Normal);
        assert_eq!(agg.possible, 10.0);
        assert_eq!(agg.display(&ControllerConfig::default()), "NaN%");
    }
}
