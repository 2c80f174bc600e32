//! Blocking multipart upload to a grade page's `submit/` endpoint.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use grade_table::upload::{SubmittedFile, UploadRequest, FILE_FIELD};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{COOKIE, REFERER};
use tracing::debug;

pub struct SubmitClient {
    http: reqwest::blocking::Client,
}

impl SubmitClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(format!("grade-table/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to create HTTP client")?;
        Ok(Self { http })
    }

    /// POST the file. Any 2xx is success and the body is ignored.
    pub fn send(
        &self,
        req: &UploadRequest<SubmittedFile>,
        referer: &str,
        cookie: Option<&str>,
    ) -> Result<()> {
        let mut part = Part::bytes(req.file.bytes.clone()).file_name(req.file.name.clone());
        if let Some(ct) = req.file.content_type.as_deref() {
            part = part
                .mime_str(ct)
                .with_context(|| format!("invalid content type {ct}"))?;
        }
        let form = Form::new().part(FILE_FIELD, part);

        let (header, token) = req.csrf_header();
        let mut builder = self
            .http
            .post(&req.url)
            .header(header, token)
            .header(REFERER, referer)
            .multipart(form);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }

        debug!(url = %req.url, file = %req.file.name, "posting submission");
        let resp = builder
            .send()
            .with_context(|| format!("request to {} failed", req.url))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            ))
        }
    }
}
