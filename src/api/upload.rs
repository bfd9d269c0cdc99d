use std::path::Path;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;
use serde_json::Value;

/// A file part pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn has_extension(&self, ext: &str) -> bool {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Final path component of the client-supplied name, or `None` if it
    /// has no usable one (empty, `..`, a bare directory).
    pub fn safe_file_name(&self) -> Option<String> {
        let normalized = self.file_name.replace('\\', "/");
        let name = Path::new(&normalized).file_name()?.to_str()?;
        if name.is_empty() || name.starts_with('.') {
            return None;
        }
        Some(name.to_string())
    }
}

/// Every file sent under `field_name`, in form order. Other fields are skipped.
pub async fn read_files(multipart: &mut Multipart, field_name: &str) -> anyhow::Result<Vec<UploadedFile>> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .context("Malformed multipart body")?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .with_context(|| format!("Failed to read upload '{file_name}'"))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Ok(files)
}

/// First file sent under `field_name`.
pub async fn read_file(multipart: &mut Multipart, field_name: &str) -> anyhow::Result<Option<UploadedFile>> {
    Ok(read_files(multipart, field_name).await?.into_iter().next())
}

/// Re-post a file to the model backend as the `file` field and return its
/// status with the decoded JSON body.
pub async fn forward_file(
    client: &reqwest::Client,
    url: &str,
    file: &UploadedFile,
) -> anyhow::Result<(StatusCode, Value)> {
    let mime = file.content_type.as_deref().unwrap_or("text/csv");
    let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
        .file_name(file.file_name.clone())
        .mime_str(mime)
        .context("Invalid upload content type")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("Failed to reach model backend at {url}"))?;

    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .with_context(|| format!("Model backend returned {status} with an unreadable body"))?;
    Ok((status, body))
}
