//! Background file submission: request description and the state of the form.
//!
//! Sending is left to the caller (`fetch` in the browser, reqwest on the
//! command line); this module decides whether a submission may start and what
//! the page looks like afterwards.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ControllerConfig;
use crate::GradeError;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "submittedFile";
pub const CSRF_HEADER: &str = "X-CSRFToken";
/// Hidden input holding the token in the host page.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const SUBMIT_SUFFIX: &str = "submit/";

/// Endpoint for a page: the page URL with `submit/` appended verbatim.
pub fn submit_url(page_url: &str) -> String {
    format!("{page_url}{SUBMIT_SUFFIX}")
}

/// A file read into memory, for transports that need the bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmittedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadRequest<F> {
    pub url: String,
    pub csrf_token: String,
    pub file: F,
}

impl<F> UploadRequest<F> {
    pub fn csrf_header(&self) -> (&'static str, &str) {
        (CSRF_HEADER, self.csrf_token.as_str())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Uploader {
    state: UploadState,
    inputs_disabled: bool,
}

impl Uploader {
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Whether every input control on the page should be disabled.
    pub fn inputs_disabled(&self) -> bool {
        self.inputs_disabled
    }

    /// The form is replaced by the success message once an upload succeeds.
    pub fn form_visible(&self) -> bool {
        self.state != UploadState::Succeeded
    }

    /// Start a submission. An absent file is rejected before anything is
    /// disabled, so the form stays usable.
    pub fn begin<F>(
        &mut self,
        page_url: &str,
        csrf_token: Option<&str>,
        file: Option<F>,
    ) -> Result<UploadRequest<F>, GradeError> {
        if self.state == UploadState::InFlight {
            return Err(GradeError::UploadInFlight);
        }
        if self.inputs_disabled {
            return Err(GradeError::InputsDisabled);
        }
        let file = file.ok_or(GradeError::NoFileSelected)?;
        let csrf_token = csrf_token.ok_or(GradeError::MissingCsrfToken)?;

        self.inputs_disabled = true;
        self.state = UploadState::InFlight;
        let url = submit_url(page_url);
        debug!(%url, "upload started");
        Ok(UploadRequest {
            url,
            csrf_token: csrf_token.to_string(),
            file,
        })
    }

    /// Record the transport outcome. On failure the inputs stay disabled
    /// unless `reenable_inputs_on_error` is set.
    pub fn finish(&mut self, outcome: Result<(), String>, config: &ControllerConfig) {
        match outcome {
            Ok(()) => {
                debug!("upload succeeded");
                self.state = UploadState::Succeeded;
            }
            Err(reason) => {
                warn!("Error submitting: {reason}");
                self.state = UploadState::Failed(reason);
                if config.reenable_inputs_on_error {
                    self.inputs_disabled = false;
                }
            }
        }
    }
}
