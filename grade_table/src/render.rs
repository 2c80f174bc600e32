//! Markup for a table in the same shape the host page serves it.

use std::fmt::Write as _;

use crate::mode::TableMode;
use crate::sort::SortState;
use crate::table::{Cell, GradeTable};
use crate::value::format_js_number;

pub const TABLE_CLASS: &str = "grades";
pub const HYPOTHESIS_BUTTON_ID: &str = "hypoButton";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn header_classes(sortable: bool, column: usize, sort: &SortState) -> Vec<&'static str> {
    let mut classes = Vec::new();
    if sortable {
        classes.push("sortable");
        if let Some(dir) = sort.direction_of(column) {
            classes.push(dir.css_class());
        }
    }
    classes
}

/// Inner markup of one cell for the current mode.
pub fn cell_content(cell: &Cell, mode: TableMode) -> String {
    let value = cell.grade_value();
    if cell.is_grade() && value.is_hypothesizable() {
        if mode.is_hypothesized() {
            return match cell.hypothesis.as_deref() {
                Some(text) if !text.is_empty() => {
                    format!("<input type='number' value='{}'>", escape_html(text))
                }
                _ => "<input type='number'>".to_string(),
            };
        }
        if let Some(label) = value.sentinel_label() {
            return label.to_string();
        }
    }
    escape_html(&cell.text)
}

pub fn render_button(mode: TableMode) -> String {
    format!(
        "<button id='{HYPOTHESIS_BUTTON_ID}'>{}</button>",
        mode.button_label()
    )
}

pub fn render_table(
    table: &GradeTable,
    sort: &SortState,
    mode: TableMode,
    aggregate: &str,
) -> String {
    let mut out = String::new();
    let class = match mode.table_class() {
        Some(extra) => format!("{TABLE_CLASS} {extra}"),
        None => TABLE_CLASS.to_string(),
    };
    let _ = writeln!(out, "<table class=\"{class}\">");

    out.push_str("<thead><tr>");
    for (column, header) in table.headers.iter().enumerate() {
        let classes = header_classes(header.sortable, column, sort);
        if classes.is_empty() {
            let _ = write!(out, "<th>{}</th>", escape_html(&header.label));
        } else {
            let _ = write!(
                out,
                "<th class=\"{}\">{}</th>",
                classes.join(" "),
                escape_html(&header.label)
            );
        }
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        let _ = write!(out, "<tr data-index=\"{}\">", row.index);
        for cell in &row.cells {
            let value = escape_html(&cell.value);
            let content = cell_content(cell, mode);
            match cell.weight {
                Some(weight) => {
                    let _ = write!(
                        out,
                        "<td class=\"grade\" data-value=\"{value}\" data-weight=\"{}\">{content}</td>",
                        format_js_number(weight)
                    );
                }
                None => {
                    let _ = write!(out, "<td data-value=\"{value}\">{content}</td>");
                }
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n<tfoot><tr>");
    let span = table.column_count().saturating_sub(1);
    if span > 0 {
        let _ = write!(
            out,
            "<td colspan=\"{span}\">{}</td>",
            escape_html(&table.footer_label)
        );
    }
    let _ = write!(
        out,
        "<td class=\"number_col\"><strong>{}</strong></td>",
        escape_html(aggregate)
    );
    out.push_str("</tr></tfoot>\n</table>\n");
    out
}
