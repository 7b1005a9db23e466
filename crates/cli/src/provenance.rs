//! Provenance records for batch outputs and `foldref report`.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced an output: the query parameters and the engine config.
pub struct Payload {
    pub params: Value,
    pub config: Value,
}

impl Payload {
    pub fn new(params: Value, config: Value) -> Self {
        Self { params, config }
    }
}

/// Write `<stem>.provenance.json` beside `artifact` and return its path.
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let sidecar = provenance_path(artifact);
    match sidecar.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?,
        _ => {}
    }
    let doc = document(payload, &[artifact.display().to_string()]);
    let bytes = serde_json::to_vec_pretty(&doc)?;
    fs::write(&sidecar, bytes).with_context(|| format!("writing {}", sidecar.display()))?;
    Ok(sidecar)
}

/// Provenance block shared by sidecars and `foldref report`.
pub fn document(payload: Payload, outputs: &[String]) -> Value {
    json!({
        "tool": "foldref",
        "version": foldref::VERSION,
        "code_rev": current_git_rev(),
        "config": payload.config,
        "params": payload.params,
        "outputs": outputs,
    })
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "refs".to_string());
    artifact.with_file_name(format!("{stem}.provenance.json"))
}

/// `GIT_COMMIT` at build time, then at run time, then `git rev-parse HEAD`.
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .into_iter()
        .chain(std::env::var("GIT_COMMIT").ok())
        .find(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
