//! Loading source documents: a `sources.json` manifest or a directory walk,
//! with text extraction for PDF and plain-text files.

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::resolve_with_base;
use crate::error::Error;
use crate::types::Document;

/// One manifest entry. `path` is relative to the manifest's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub title: String,
    pub path: String,
}

pub fn read_manifest(manifest: &Path) -> anyhow::Result<Vec<SourceEntry>> {
    let raw = fs::read_to_string(manifest)
        .with_context(|| format!("reading sources manifest {}", manifest.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing sources manifest {}", manifest.display()))
}

/// Documents listed in `manifest`. Missing or unreadable files are skipped.
pub fn load_manifest(manifest: &Path) -> anyhow::Result<Vec<Document>> {
    let entries = read_manifest(manifest)?;
    let base = manifest.parent().unwrap_or(Path::new("."));
    let mut documents = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = resolve_with_base(base, &entry.path);
        if !path.exists() {
            warn!(source = %entry.id, path = %path.display(), "source file not found, skipping");
            continue;
        }
        if let Some(doc) = load_one(entry.id, entry.title, &path) {
            documents.push(doc);
        }
    }
    info!(count = documents.len(), manifest = %manifest.display(), "loaded sources");
    Ok(documents)
}

/// Every `.pdf` and `.txt` under `root`, sorted by path; id and title are the file stem.
pub fn load_directory(root: &Path) -> anyhow::Result<Vec<Document>> {
    if !root.is_dir() {
        return Err(Error::NotFound(format!("documents directory {}", root.display())).into());
    }
    let mut documents = Vec::new();
    for path in list_source_files(root) {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| anyhow!("file without a name: {}", path.display()))?;
        if let Some(doc) = load_one(stem.clone(), stem, &path) {
            documents.push(doc);
        }
    }
    if documents.is_empty() {
        warn!(dir = %root.display(), "no .pdf or .txt files found");
    }
    Ok(documents)
}

fn load_one(id: String, title: String, path: &Path) -> Option<Document> {
    match extract_text(path) {
        Ok(text) if text.trim().is_empty() => {
            warn!(source = %id, path = %path.display(), "no extractable text, skipping");
            None
        }
        Ok(text) => Some(Document { id, title, source_path: path.to_string_lossy().to_string(), text }),
        Err(e) => {
            warn!(source = %id, path = %path.display(), error = %format!("{e:#}"), "extraction failed, skipping");
            None
        }
    }
}

pub fn extract_text(path: &Path) -> anyhow::Result<String> {
    match path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("pdf") => pdf_extract::extract_text(path)
            .map_err(|e| anyhow!("failed to extract text from {}: {}", path.display(), e)),
        Some("txt") => match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
        },
        _ => Err(Error::InvalidInput(format!("unsupported source type: {}", path.display())).into()),
    }
}

fn list_source_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf") || ext.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort();
    files
}
