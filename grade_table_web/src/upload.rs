//! Background submission of a page's upload form.

use std::cell::RefCell;
use std::rc::Rc;

use grade_table::upload::FILE_FIELD;
use grade_table::{ControllerConfig, UploadRequest, Uploader};
use leptos::logging::{error, warn};
use leptos::spawn_local;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, File, FormData, HtmlInputElement, Request, RequestInit, Response};

use crate::dom::{csrf_token, set_inputs_disabled};

fn js_err(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

async fn post(req: UploadRequest<File>) -> Result<(), String> {
    let form_data = FormData::new().map_err(js_err)?;
    form_data
        .append_with_blob_and_filename(FILE_FIELD, &req.file, &req.file.name())
        .map_err(js_err)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form_data);
    let request = Request::new_with_str_and_init(&req.url, &init).map_err(js_err)?;
    let (name, value) = req.csrf_header();
    request.headers().set(name, value).map_err(js_err)?;

    let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
    let resp = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let resp: Response = resp.dyn_into().map_err(js_err)?;
    if resp.ok() {
        Ok(())
    } else {
        Err(format!("{} {}", resp.status(), resp.status_text()))
    }
}

fn selected_file(form: &Element) -> Option<File> {
    form.query_selector(&format!("input[name={FILE_FIELD}]"))
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.files())
        .and_then(|files| files.item(0))
}

fn replace_with_message(document: &Document, form: &Element, message: &str) -> Result<(), JsValue> {
    let p = document.create_element("p")?;
    p.set_text_content(Some(message));
    form.replace_with_with_node_1(&p)
}

fn submit(document: &Document, form: &Element, state: &Rc<RefCell<Uploader>>, config: &ControllerConfig) {
    let href = document
        .location()
        .and_then(|loc| loc.href().ok())
        .unwrap_or_default();
    let token = csrf_token(document);
    let begun = state
        .borrow_mut()
        .begin(&href, token.as_deref(), selected_file(form));
    let request = match begun {
        Ok(req) => req,
        Err(err) => {
            warn!("submission not sent: {err}");
            return;
        }
    };
    set_inputs_disabled(document, true);

    let document = document.clone();
    let form = form.clone();
    let state = Rc::clone(state);
    let config = config.clone();
    spawn_local(async move {
        let outcome = post(request).await;
        let failed = outcome.as_ref().err().cloned();
        state.borrow_mut().finish(outcome, &config);
        match failed {
            None => {
                if let Err(err) = replace_with_message(&document, &form, &config.success_message) {
                    error!("could not replace form: {}", js_err(err));
                }
            }
            Some(reason) => {
                error!("Error submitting: {reason}");
                if !state.borrow().inputs_disabled() {
                    set_inputs_disabled(&document, false);
                }
            }
        }
    });
}

/// Intercept `form`'s submit event and send its file in the background.
pub fn bind_upload_form(document: &Document, form: Element, config: ControllerConfig) -> Result<(), JsValue> {
    let state = Rc::new(RefCell::new(Uploader::default()));
    let document = document.clone();
    let target = form.clone();
    let on_submit = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
        ev.prevent_default();
        submit(&document, &target, &state, &config);
    });
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    // Lives as long as the page.
    on_submit.forget();
    Ok(())
}
