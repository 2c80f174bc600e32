//! Reading the server-rendered page into the table model.

use grade_table::upload::CSRF_FIELD;
use grade_table::value::parse_float;
use grade_table::{Cell, ControllerConfig, GradeTable, Header, Row};
use leptos::logging::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement};

pub fn select_all(root: &Element, selector: &str) -> Vec<Element> {
    let mut out = Vec::new();
    if let Ok(list) = root.query_selector_all(selector) {
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                out.push(el);
            }
        }
    }
    out
}

/// Every element matching `selector` anywhere in the document.
pub fn select_in_document(document: &Document, selector: &str) -> Vec<Element> {
    document
        .document_element()
        .map(|root| select_all(&root, selector))
        .unwrap_or_default()
}

fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default().trim().to_string()
}

fn read_cell(td: &Element) -> Cell {
    let weight = td
        .class_list()
        .contains("grade")
        .then(|| parse_float(&td.get_attribute("data-weight").unwrap_or_default()));
    Cell {
        value: td.get_attribute("data-value").unwrap_or_default(),
        text: text_of(td),
        weight,
        hypothesis: None,
    }
}

/// Headers, rows and footer label of one table. Only elements inside `table`
/// are read.
pub fn read_table(table: &Element) -> GradeTable {
    let headers = select_all(table, "thead th")
        .iter()
        .map(|th| Header::new(text_of(th), th.class_list().contains("sortable")))
        .collect();
    let rows = select_all(table, "tbody tr")
        .iter()
        .enumerate()
        .map(|(pos, tr)| {
            let index = tr
                .get_attribute("data-index")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(pos);
            let cells = select_all(tr, "td").iter().map(read_cell).collect();
            Row { index, cells }
        })
        .collect();

    let mut model = GradeTable::new(headers, rows);
    if let Some(label) = select_all(table, "tfoot td")
        .iter()
        .find(|td| !td.class_list().contains("number_col"))
        .map(text_of)
    {
        model.footer_label = label;
    }
    model
}

/// Settings from the table's `data-config` JSON attribute, if any.
pub fn read_config(table: &Element) -> ControllerConfig {
    match table.get_attribute("data-config") {
        Some(raw) => ControllerConfig::from_json(&raw).unwrap_or_else(|err| {
            warn!("ignoring data-config: {err}");
            ControllerConfig::default()
        }),
        None => ControllerConfig::default(),
    }
}

pub fn csrf_token(document: &Document) -> Option<String> {
    document
        .query_selector(&format!("[name={CSRF_FIELD}]"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
}

/// Disable or enable every `<input>` on the page.
pub fn set_inputs_disabled(document: &Document, disabled: bool) {
    for el in select_in_document(document, "input") {
        if let Ok(input) = el.dyn_into::<HtmlInputElement>() {
            input.set_disabled(disabled);
        }
    }
}
