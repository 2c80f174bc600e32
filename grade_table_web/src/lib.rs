use leptos::logging::{error, log, warn};
use leptos::*;

use grade_table::render::{cell_content, header_classes, HYPOTHESIS_BUTTON_ID};
use grade_table::value::format_js_number;
use grade_table::{Cell, GradeTableController, TableMode};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

pub mod dom;
pub mod upload;

/// Tables the controller takes over.
pub const TABLE_SELECTOR: &str = "table.grades";
/// Forms whose file is submitted in the background.
pub const FORM_SELECTOR: &str = "form.async-upload";

fn cell_view(
    controller: RwSignal<GradeTableController>,
    row: usize,
    column: usize,
    cell: &Cell,
    mode: TableMode,
) -> View {
    let class = cell.is_grade().then(|| "grade".to_string());
    let value = cell.value.clone();
    let weight = cell.weight.map(format_js_number);

    match (&cell.hypothesis, mode) {
        (Some(current), TableMode::Hypothesized) => {
            let current = current.clone();
            let on_change = move |ev: leptos::ev::Event| {
                let text = event_target_value(&ev);
                controller.update(|c| {
                    if let Err(err) = c.set_hypothesis(row, column, &text) {
                        warn!("{err}");
                    }
                });
            };
            view! {
                <td class=class data-value=value data-weight=weight>
                    <input type="number" prop:value=current on:change=on_change/>
                </td>
            }
            .into_view()
        }
        _ => {
            let html = cell_content(cell, mode);
            view! { <td class=class data-value=value data-weight=weight inner_html=html></td> }
                .into_view()
        }
    }
}

#[component]
pub fn GradeTableView(
    controller: RwSignal<GradeTableController>,
    #[prop(into)] base_class: String,
) -> impl IntoView {
    let (headers, footer_label) =
        controller.with_untracked(|c| (c.table().headers.clone(), c.table().footer_label.clone()));
    let span = headers.len().saturating_sub(1);

    let on_toggle = move |_ev: leptos::ev::MouseEvent| {
        controller.update(|c| {
            let agg = c.toggle_mode();
            log!("{:?} mode, aggregate {:?}", c.mode(), agg.percent());
        });
    };

    let table_class = move || match controller.with(|c| c.mode().table_class()) {
        Some(extra) => format!("{base_class} {extra}"),
        None => base_class.clone(),
    };

    let header_view = headers
        .into_iter()
        .enumerate()
        .map(|(column, header)| {
            let sortable = header.sortable;
            let class = move || {
                controller.with(|c| header_classes(sortable, column, c.sort_state()).join(" "))
            };
            let on_click = move |_ev: leptos::ev::MouseEvent| {
                controller.update(|c| {
                    if let Err(err) = c.click_header(column) {
                        warn!("{err}");
                    }
                });
            };
            view! { <th class=class on:click=on_click>{header.label}</th> }
        })
        .collect_view();

    // Rebuilt on sort and toggle only; edits update the footer alone.
    let layout = create_memo(move |_| controller.with(|c| c.body_layout()));
    let body = move || {
        let mode = layout.with(|l| l.mode);
        controller.with_untracked(|c| {
            c.table()
                .rows
                .iter()
                .map(|row| {
                    let index = row.index;
                    let cells = row
                        .cells
                        .iter()
                        .enumerate()
                        .map(|(column, cell)| cell_view(controller, index, column, cell, mode))
                        .collect_view();
                    view! { <tr data-index=index>{cells}</tr> }
                })
                .collect_view()
        })
    };

    view! {
        <button id=HYPOTHESIS_BUTTON_ID on:click=on_toggle>
            {move || controller.with(|c| c.mode().button_label())}
        </button>
        <table class=table_class>
            <thead><tr>{header_view}</tr></thead>
            <tbody>{body}</tbody>
            <tfoot>
                <tr>
                    {(span > 0).then(move || view! { <td colspan=span>{footer_label}</td> })}
                    <td class="number_col">
                        <strong>{move || controller.with(|c| c.aggregate_display())}</strong>
                    </td>
                </tr>
            </tfoot>
        </table>
    }
}

/// Replace one server-rendered table with a mounted controller.
fn mount_table(document: &Document, table: Element) -> Result<(), JsValue> {
    let model = dom::read_table(&table);
    let config = dom::read_config(&table);
    let controller = match GradeTableController::new(model, config) {
        Ok(c) => c,
        Err(err) => {
            error!("grade table left as rendered: {err}");
            return Ok(());
        }
    };

    let host: HtmlElement = document.create_element("div")?.dyn_into()?;
    table.before_with_node_1(&host)?;
    let base_class = table.class_name();
    table.remove();
    mount_to(host, move || {
        let controller = create_rw_signal(controller);
        view! { <GradeTableView controller=controller base_class=base_class/> }
    });
    Ok(())
}

pub fn attach(document: &Document) {
    for table in dom::select_in_document(document, TABLE_SELECTOR) {
        if let Err(err) = mount_table(document, table) {
            error!("failed to mount grade table: {err:?}");
        }
    }
    for form in dom::select_in_document(document, FORM_SELECTOR) {
        let config = dom::read_config(&form);
        if let Err(err) = upload::bind_upload_form(document, form, config) {
            error!("failed to bind upload form: {err:?}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    match web_sys::window().and_then(|w| w.document()) {
        Some(document) => attach(&document),
        None => error!("no document to attach to"),
    }
}
