//! Building a student's grade table from assignment and submission records.
//!
//! The statuses here are the ones the grade cells carry, so a table built by
//! [`build_profile_table`] aggregates to the same total the server reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::{Cell, GradeTable, Header, Row};
use crate::value::GradeValue;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: DateTime<Utc>,
    /// Points this assignment contributes to the course total.
    pub weight: u32,
    /// Maximum raw score.
    pub points: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Submission {
    pub assignment_id: u32,
    pub author: String,
    #[serde(default)]
    pub grader: Option<String>,
    pub file: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Gradebook {
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

impl Gradebook {
    pub fn submission_for(&self, assignment_id: u32, author: &str) -> Option<&Submission> {
        self.submissions
            .iter()
            .find(|s| s.assignment_id == assignment_id && s.author == author)
    }
}

fn percent_of(score: f64, assignment: &Assignment) -> f64 {
    score * 100.0 / assignment.points as f64
}

fn is_due(assignment: &Assignment, now: DateTime<Utc>) -> bool {
    assignment.deadline <= now
}

/// Scored work is a percentage of the assignment's points; submitted but
/// unscored work is ungraded; nothing submitted is not due before the
/// deadline and missing after it.
pub fn grade_status(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> GradeValue {
    match submission {
        Some(Submission {
            score: Some(score), ..
        }) => GradeValue::Percent(percent_of(*score, assignment)),
        Some(_) => GradeValue::Ungraded,
        None if is_due(assignment, now) => GradeValue::Missing,
        None => GradeValue::NotDue,
    }
}

/// Status line shown to a student on an assignment page.
pub fn submission_message(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
) -> String {
    match submission {
        Some(sub) => match sub.score {
            Some(score) => {
                let pct = percent_of(score, assignment);
                format!(
                    "Your submission, {}, received {:.2}/{} points ({:.1}%)",
                    sub.file, score, assignment.points, pct
                )
            }
            None if is_due(assignment, now) => {
                format!("Your submission, {}, is being graded", sub.file)
            }
            None => format!("Your current submission is {}", sub.file),
        },
        None if is_due(assignment, now) => {
            "You did not submit this assignment and received 0 points".to_string()
        }
        None => "No current submission".to_string(),
    }
}

/// Whose grading a progress count covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Staff<'a> {
    /// Every submission.
    Admin,
    /// Submissions assigned to this grader.
    Grader(&'a str),
}

impl Staff<'_> {
    fn covers(&self, submission: &Submission) -> bool {
        match self {
            Staff::Admin => true,
            Staff::Grader(name) => submission.grader.as_deref() == Some(*name),
        }
    }
}

/// `Not due` before the deadline, afterwards `graded/assigned` over the
/// submissions `staff` is responsible for.
pub fn grading_progress(
    book: &Gradebook,
    assignment: &Assignment,
    staff: Staff<'_>,
    now: DateTime<Utc>,
) -> String {
    if !is_due(assignment, now) {
        return "Not due".to_string();
    }
    let (graded, assigned) = book
        .submissions
        .iter()
        .filter(|s| s.assignment_id == assignment.id && staff.covers(s))
        .fold((0usize, 0usize), |(graded, assigned), s| {
            (graded + usize::from(s.score.is_some()), assigned + 1)
        });
    format!("{graded}/{assigned}")
}

fn title_cell(assignment: &Assignment) -> Cell {
    Cell::text(assignment.title.clone(), assignment.title.clone())
}

fn due_cell(assignment: &Assignment) -> Cell {
    Cell::text(
        assignment.deadline.timestamp().to_string(),
        assignment.deadline.format("%b %-d, %Y").to_string(),
    )
}

fn assignment_table(
    book: &Gradebook,
    last: &str,
    cell: impl Fn(&Assignment) -> Cell,
) -> GradeTable {
    let rows = book
        .assignments
        .iter()
        .enumerate()
        .map(|(index, assignment)| Row {
            index,
            cells: vec![title_cell(assignment), due_cell(assignment), cell(assignment)],
        })
        .collect();
    GradeTable::new(
        vec![
            Header::new("Assignment", false),
            Header::new("Due", true),
            Header::new(last, true),
        ],
        rows,
    )
}

/// One row per assignment: title, deadline (sortable by timestamp) and grade.
pub fn build_profile_table(book: &Gradebook, author: &str, now: DateTime<Utc>) -> GradeTable {
    assignment_table(book, "Grade", |assignment| {
        let status = grade_status(assignment, book.submission_for(assignment.id, author), now);
        Cell::grade(status, assignment.weight as f64)
    })
}

/// The staff view of the same assignments: grading progress instead of a
/// grade. It has no grade cells, so its footer shows the N/A label.
pub fn build_staff_table(book: &Gradebook, staff: Staff<'_>, now: DateTime<Utc>) -> GradeTable {
    assignment_table(book, "Graded", |assignment| {
        let progress = grading_progress(book, assignment, staff, now);
        Cell::text(progress.clone(), progress)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControllerConfig;
    use crate::grade::compute_grade;
    use crate::mode::TableMode;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn assignment(id: u32, day: u32, weight: u32, points: u32) -> Assignment {
        Assignment {
            id,
            title: format!("HW{id}"),
            description: None,
            deadline: at(day),
            weight,
            points,
        }
    }

    fn submission(id: u32, score: Option<f64>) -> Submission {
        Submission {
            assignment_id: id,
            author: "pat".to_string(),
            grader: Some("ta1".to_string()),
            file: format!("hw{id}.pdf"),
            score,
        }
    }

    fn book() -> Gradebook {
        Gradebook {
            assignments: vec![
                assignment(1, 1, 20, 50),
                assignment(2, 5, 30, 100),
                assignment(3, 6, 10, 10),
                assignment(4, 20, 40, 100),
            ],
            submissions: vec![submission(1, Some(40.0)), submission(3, None)],
        }
    }

    #[test]
    fn test_statuses() {
        let b = book();
        let now = at(10);
        let s = |id: u32| grade_status(&b.assignments[id as usize - 1], b.submission_for(id, "pat"), now);
        assert_eq!(s(1), GradeValue::Percent(80.0));
        assert_eq!(s(2), GradeValue::Missing);
        assert_eq!(s(3), GradeValue::Ungraded);
        assert_eq!(s(4), GradeValue::NotDue);
        assert_eq!(b.submission_for(1, "sam"), None);
    }

    #[test]
    fn test_profile_total_matches_server_rule() {
        let table = build_profile_table(&book(), "pat", at(10));
        // earned 20 * 0.8, possible 20 + 30 (missing)
        let agg = compute_grade(table.grade_cells(), TableMode::Normal);
        assert_eq!(agg.possible, 50.0);
        assert_eq!(agg.display(&ControllerConfig::default()), "32.0%");
        assert_eq!(table.rows[1].cells[1].text, "Mar 5, 2024");
        assert_eq!(table.rows[3].cells[2].value, "Not");
    }

    fn staff_book() -> Gradebook {
        let mut b = book();
        let mut graded = submission(2, Some(90.0));
        graded.author = "sam".to_string();
        let mut other = submission(2, None);
        other.author = "lee".to_string();
        other.grader = Some("ta2".to_string());
        b.submissions.push(graded);
        b.submissions.push(other);
        b
    }

    #[test]
    fn test_grading_progress() {
        let b = staff_book();
        let now = at(10);
        let hw2 = &b.assignments[1];
        assert_eq!(grading_progress(&b, hw2, Staff::Admin, now), "1/2");
        assert_eq!(grading_progress(&b, hw2, Staff::Grader("ta1"), now), "1/1");
        assert_eq!(grading_progress(&b, hw2, Staff::Grader("ta2"), now), "0/1");
        assert_eq!(grading_progress(&b, hw2, Staff::Grader("ta3"), now), "0/0");
        assert_eq!(grading_progress(&b, &b.assignments[3], Staff::Admin, now), "Not due");
    }

    #[test]
    fn test_staff_table() {
        let table = build_staff_table(&staff_book(), Staff::Grader("ta1"), at(10));
        assert_eq!(table.headers[2].label, "Graded");
        let progress: Vec<&str> = table.rows.iter().map(|r| r.cells[2].text.as_str()).collect();
        assert_eq!(progress, vec!["1/1", "1/1", "0/1", "Not due"]);
        assert_eq!(table.rows[0].cells[1].text, "Mar 1, 2024");
        assert_eq!(table.grade_cells().count(), 0);
        let agg = compute_grade(table.grade_cells(), TableMode::Normal);
        assert_eq!(agg.display(&ControllerConfig::default()), "N/A");
    }

    #[test]
    fn test_messages() {
        let b = book();
        let a1 = &b.assignments[0];
        let a4 = &b.assignments[3];
        assert_eq!(
            submission_message(a1, b.submission_for(1, "pat"), at(10)),
            "Your submission, hw1.pdf, received 40.00/50 points (80.0%)"
        );
        let pending = submission(4, None);
        assert_eq!(
            submission_message(a4, Some(&pending), at(10)),
            "Your current submission is hw4.pdf"
        );
        assert_eq!(
            submission_message(a4, Some(&pending), at(25)),
            "Your submission, hw4.pdf, is being graded"
        );
        assert_eq!(submission_message(a4, None, at(10)), "No current submission");
        assert_eq!(
            submission_message(a4, None, at(25)),
            "You did not submit this assignment and received 0 points"
        );
    }
}
