use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Extract the text of a PDF on the blocking pool.
pub async fn load_pdf_text(path: &Path) -> Result<String> {
    let owned = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&owned)
            .with_context(|| format!("Failed to read {}", owned.display()))?;
        pdf_extract::extract_text_from_mem(&bytes)
            .with_context(|| format!("Failed to extract text from {}", owned.display()))
    })
    .await
    .context("PDF extraction task failed")??;

    Ok(text)
}

/// PDF files directly inside `dir`, sorted by name. A missing directory is empty.
pub fn list_pdfs(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut pdfs: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .map(|e| e.into_path())
        .collect();
    pdfs.sort();
    pdfs
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
