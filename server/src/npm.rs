//! `run_npm_script` — run a script registered in `package.json`.
//!
//! The script name is checked against the `scripts` table of the target
//! directory's `package.json` and passed to the package manager as its own argv
//! element. No shell is involved.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::ToolError;

#[derive(Debug, Serialize)]
pub struct ScriptRun {
    pub script: String,
    /// `None` when the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Script names declared in `<dir>/package.json`.
pub async fn registered_scripts(dir: &Path) -> Result<BTreeSet<String>, ToolError> {
    let manifest = dir.join("package.json");
    let raw = tokio::fs::read_to_string(&manifest).await.map_err(|e| ToolError::Validation {
        message: format!("No readable package.json in {}", dir.display()),
        details: Some(serde_json::Value::from(e.to_string())),
    })?;
    let parsed: serde_json::Value = serde_json::from_str(&raw).map_err(|e| ToolError::Validation {
        message: "package.json is not valid JSON".to_string(),
        details: Some(serde_json::Value::from(e.to_string())),
    })?;
    Ok(parsed
        .get("scripts")
        .and_then(|s| s.as_object())
        .map(|scripts| scripts.keys().cloned().collect())
        .unwrap_or_default())
}

/// Validate `script` against the registry in `dir`, then run it to completion.
///
/// A non-zero exit or a failed spawn is reported in the returned [`ScriptRun`],
/// not as an error.
pub async fn run_script(npm_command: &str, dir: PathBuf, script: &str) -> Result<ScriptRun, ToolError> {
    let available = registered_scripts(&dir).await?;
    if !available.contains(script) {
        return Err(ToolError::Validation {
            message: format!("Unknown script '{script}'"),
            details: Some(serde_json::json!({ "available": available })),
        });
    }

    info!(script = script, cwd = %dir.display(), "Running npm script");

    let mut cmd = Command::new(npm_command);
    cmd.arg("run")
        .arg(script)
        .current_dir(&dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Detached so the child is still awaited if the HTTP caller goes away.
    let output = tokio::spawn(async move { cmd.output().await }).await.map_err(|e| {
        ToolError::Internal { details: format!("script task failed: {e}"), echo: Default::default() }
    })?;

    let run = match output {
        Ok(out) => ScriptRun {
            script: script.to_string(),
            exit_code: out.status.code(),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            success: out.status.success(),
        },
        Err(e) => {
            warn!(command = npm_command, error = %e, "Could not spawn package manager");
            ScriptRun {
                script: script.to_string(),
                exit_code: None,
                stdout: String::new(),
                stderr: format!("failed to spawn '{npm_command}': {e}"),
                success: false,
            }
        }
    };

    debug!(script = script, exit_code = ?run.exit_code, success = run.success, "npm script finished");
    Ok(run)
}
