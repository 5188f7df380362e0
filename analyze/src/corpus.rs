use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Result, TopicsError};

/// A CSV file under the data root, named by its relative path.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Row {
    title: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
}

/// Find every `*.csv` below `root` whose corpus name starts with one of `prefixes`.
pub fn discover(root: &Path, prefixes: &[String]) -> Result<Vec<CorpusEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
            TopicsError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }

        let Some(name) = corpus_name(root, entry.path()) else {
            continue;
        };
        if !prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            debug!(corpus = %name, ?prefixes, "Skipping corpus outside the configured prefixes");
            continue;
        }

        entries.push(CorpusEntry { name, path: entry.into_path() });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Relative path of `path` under `root` without its extension, `/`-separated.
pub fn corpus_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Flatten a corpus name into a single file stem.
pub fn file_stem_for(corpus_name: &str) -> String {
    corpus_name.replace('/', "_")
}

/// Read the document texts of one corpus. Abstracts fall back to titles.
pub fn load(path: &Path) -> Result<Vec<String>> {
    let csv_err = |source| TopicsError::Csv { path: path.to_path_buf(), source };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    for column in ["title", "abstract"] {
        if !headers.iter().any(|h| h == column) {
            return Err(TopicsError::MissingColumn { path: path.to_path_buf(), column });
        }
    }

    let mut texts = Vec::new();
    for (line, row) in reader.deserialize::<Row>().enumerate() {
        let row = row.map_err(csv_err)?;
        match document_text(row) {
            Some(text) => texts.push(text),
            None => warn!(path = %path.display(), row = line + 1, "Row has neither abstract nor title"),
        }
    }

    Ok(texts)
}

fn document_text(row: Row) -> Option<String> {
    let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
    non_blank(row.abstract_text).or_else(|| non_blank(row.title))
}
