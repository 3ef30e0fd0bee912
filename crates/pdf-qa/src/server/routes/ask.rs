//! Question form endpoints

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Html,
};
use std::path::{Path, PathBuf};

use super::page::{self, PageView};
use crate::error::{Error, Result};
use crate::server::state::AppState;

const FALLBACK_FILENAME: &str = "upload.pdf";

/// GET / - Empty form
pub async fn show_form() -> Html<String> {
    Html(page::render(&PageView::default()))
}

/// POST / - Answer a question about the uploaded PDF
pub async fn submit(State(state): State<AppState>, multipart: Multipart) -> Html<String> {
    let form = match read_form(multipart, state.max_upload_size()).await {
        Ok(form) => form,
        Err(e) => {
            state.reporter().report(&e, Some("Reading submitted form"));
            return Html(page::render(&PageView::error("", form_error(&e))));
        }
    };

    let Some(upload) = form.upload else {
        let e = Error::validation("please upload a PDF file");
        state.reporter().report(&e, Some("Reading submitted form"));
        return Html(page::render(&PageView::error(&form.question, form_error(&e))));
    };

    // Removed when `dir` drops at the end of the request
    let (dir, path) = match store_upload(&upload).await {
        Ok(stored) => stored,
        Err(e) => {
            state.reporter().report(&e, Some("Storing uploaded file"));
            return Html(page::render(&PageView::error(&form.question, form_error(&e))));
        }
    };

    tracing::info!(
        "Received {} ({} bytes) with question: {}",
        upload.filename,
        upload.data.len(),
        form.question
    );

    let view = match state.pipeline().answer(&path, &form.question).await {
        Ok(answer) => {
            let cited = answer.cited_pages();
            PageView::answer(&form.question, answer.text, cited)
        }
        Err(e) => PageView::error(&form.question, e.user_message()),
    };
    drop(dir);

    Html(page::render(&view))
}

struct Upload {
    filename: String,
    data: Vec<u8>,
}

struct QuestionForm {
    question: String,
    upload: Option<Upload>,
}

async fn read_form(mut multipart: Multipart, max_upload_size: usize) -> Result<QuestionForm> {
    let mut question = String::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_size))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "question" => {
                question = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
            }
            "file" => {
                let filename = field
                    .file_name()
                    .map(safe_filename)
                    .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
                // Browsers send an empty part when no file was chosen
                if !data.is_empty() {
                    upload = Some(Upload {
                        filename,
                        data: data.to_vec(),
                    });
                }
            }
            other => tracing::debug!("Ignoring form field: {}", other),
        }
    }

    Ok(QuestionForm { question, upload })
}

async fn store_upload(upload: &Upload) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::Builder::new().prefix("pdf-qa-").tempdir()?;
    let path = dir.path().join(&upload.filename);
    tokio::fs::write(&path, &upload.data).await?;
    Ok((dir, path))
}

/// Final path component of a client-supplied name
fn safe_filename(name: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

fn multipart_error(e: MultipartError, max_upload_size: usize) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::validation(format!(
            "upload exceeds the {} byte limit: {}",
            max_upload_size,
            e.body_text()
        ))
    } else {
        Error::validation(format!("Failed to read submitted form: {}", e.body_text()))
    }
}

fn form_error(e: &Error) -> String {
    format!("{}: {}", e.kind(), e)
}
