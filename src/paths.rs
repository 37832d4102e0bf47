use anyhow::{bail, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Encoding of an input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Plain, // *.json / *.jsonl / *.ndjson
    Zst,   // *.zst
}

#[derive(Clone, Debug)]
pub struct InputJob {
    pub kind: InputKind,
    pub path: PathBuf,
}

impl InputJob {
    pub fn for_path(path: &Path) -> Self {
        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zst") => InputKind::Zst,
            _ => InputKind::Plain,
        };
        Self { kind, path: path.to_path_buf() }
    }
}

/// Find NDJSON inputs directly under `dir`, sorted by file name.
pub fn discover_inputs(dir: &Path) -> Vec<PathBuf> {
    let re = Regex::new(r"(?i)\.(json|jsonl|ndjson|zst)$").expect("static regex");
    let mut found = Vec::new();
    if !dir.exists() {
        return found;
    }
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !ent.file_type().is_file() { continue; }
        if let Some(name) = ent.file_name().to_str() {
            if re.is_match(name) {
                found.push(ent.path().to_path_buf());
            }
        }
    }
    found.sort();
    found
}

/// Turn the configured inputs into jobs. A missing file aborts the run before any reading starts.
pub fn plan_inputs(inputs: &[PathBuf]) -> Result<Vec<InputJob>> {
    if inputs.is_empty() {
        bail!("no input files configured");
    }
    let mut jobs = Vec::with_capacity(inputs.len());
    for p in inputs {
        if !p.is_file() {
            bail!("input file not found: {}", p.display());
        }
        jobs.push(InputJob::for_path(p));
    }
    Ok(jobs)
}
