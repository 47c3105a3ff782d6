//! Tool catalogue, argument parsing and dispatch.
//!
//! [`dispatch`] maps a tool name plus a JSON argument object to one handler.
//! Handlers return a serializable payload or a [`ToolError`]; the HTTP layer
//! wraps either in an [`Envelope`](devhelper_core::Envelope).

use devhelper_core::{language_for, paths::display_join, resolve, DocumentSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{echo, ToolError};
use crate::npm::run_script;
use crate::types::{AppContext, DEFAULT_SEARCH_LIMIT};

// ---------------------------------------------------------------------------
// Tool catalogue
// ---------------------------------------------------------------------------

/// Names of every tool, in catalogue order.
pub const TOOL_NAMES: &[&str] =
    &["list_files", "read_file", "write_file", "run_npm_script", "search", "fetch"];

pub fn tool_definitions() -> Value {
    serde_json::json!([
        {
            "name": "list_files",
            "description": "List the entries of one directory (non-recursive). Each entry reports whether it is a file or a directory.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory relative to the project root. Default: '.' (alias: dir; path wins when both are sent)" }
                }
            }
        },
        {
            "name": "read_file",
            "description": "Read a whole text file. Returns the content, its line count and a language tag inferred from the extension.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "File relative to the project root (alias: filePath; file_path wins when both are sent)" }
                },
                "required": ["file_path"]
            }
        },
        {
            "name": "write_file",
            "description": "Write a text file, creating missing parent directories. Existing content is fully replaced.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "file_path": { "type": "string", "description": "File relative to the project root (alias: filePath; file_path wins when both are sent)" },
                    "content": { "type": "string", "description": "Text to write. Default: empty" },
                    "mode": { "type": "string", "enum": ["create", "overwrite"], "description": "Default: create" }
                },
                "required": ["file_path"]
            }
        },
        {
            "name": "run_npm_script",
            "description": "Run a script declared in package.json and capture its output. A failing script is reported with success=false, not as an error.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "script_name": { "type": "string", "description": "Key of the package.json scripts table (alias: script; script_name wins when both are sent)" },
                    "cwd": { "type": "string", "description": "Directory holding package.json, relative to the project root. Default: '.'" }
                },
                "required": ["script_name"]
            }
        },
        {
            "name": "search",
            "description": "Case-insensitive substring search over the document titles and text. Returns id, title and url of each hit.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Text to look for. Empty matches every document; numbers and booleans are searched as text" },
                    "limit": { "type": "integer", "minimum": 0, "description": "Max results. Default: 5, also used when the value is negative or not an integer" }
                }
            }
        },
        {
            "name": "fetch",
            "description": "Fetch one full document by id, or by url when no id is given.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Document id, e.g. doc-1" },
                    "url": { "type": "string", "description": "Exact document url" }
                }
            }
        }
    ])
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the named tool with the given arguments and return its JSON payload.
pub async fn dispatch(ctx: &AppContext, name: &str, args: Value) -> Result<Value, ToolError> {
    debug!(tool = name, "Tool call");
    let result = handle_tool_call(ctx, name, args).await;
    if let Err(ref e) = result {
        warn!(tool = name, status = e.status().as_u16(), error = %e, "Tool call failed");
    }
    result
}

async fn handle_tool_call(ctx: &AppContext, name: &str, args: Value) -> Result<Value, ToolError> {
    match name {
        "list_files" => to_payload(list_files(ctx, parse_args(args)?).await?),
        "read_file" => to_payload(read_file(ctx, parse_args(args)?).await?),
        "write_file" => to_payload(write_file(ctx, parse_args(args)?).await?),
        "run_npm_script" => to_payload(run_npm_script(ctx, parse_args(args)?).await?),
        "search" => to_payload(search(ctx, parse_args(args)?)?),
        "fetch" => to_payload(fetch(ctx, parse_args(args)?)?),
        _ => Err(ToolError::NotFound {
            message: "Unknown tool".to_string(),
            echo: echo([("tool", Value::from(name)), ("available", serde_json::json!(TOOL_NAMES))]),
        }),
    }
}

/// Decode a request object into a tool's argument struct. `null` counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        obj @ Value::Object(_) => obj,
        _ => return Err(ToolError::validation("Request body must be a JSON object")),
    };
    serde_json::from_value(args).map_err(|e| ToolError::Validation {
        message: "Invalid tool arguments".to_string(),
        details: Some(Value::from(e.to_string())),
    })
}

fn to_payload<T: Serialize>(payload: T) -> Result<Value, ToolError> {
    serde_json::to_value(payload)
        .map_err(|e| ToolError::Internal { details: e.to_string(), echo: Default::default() })
}

/// Prefer the canonical spelling of a field, falling back to its alternate name.
fn either(primary: Option<String>, alternate: Option<String>) -> Option<String> {
    primary.filter(|s| !s.is_empty()).or(alternate)
}

/// Treat a missing or empty string field as absent.
fn required(field: Option<String>, name: &str) -> Result<String, ToolError> {
    field.filter(|s| !s.is_empty()).ok_or_else(|| ToolError::validation(format!("{name} is required")))
}

// ---------------------------------------------------------------------------
// list_files
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListFilesArgs {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileListEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<FileListEntry>,
    pub total_files: usize,
    pub directory: String,
}

pub async fn list_files(ctx: &AppContext, args: ListFilesArgs) -> Result<FileList, ToolError> {
    let directory =
        either(args.path, args.dir).filter(|p| !p.is_empty()).unwrap_or_else(|| ".".to_string());
    let full_path = resolve(&ctx.config.project_root, &directory);

    let read_err = |e| ToolError::io(format!("Failed to read directory '{directory}'"), e);
    let mut dir = tokio::fs::read_dir(&full_path).await.map_err(read_err)?;

    let mut files = Vec::new();
    while let Some(entry) = dir.next_entry().await.map_err(read_err)? {
        let is_directory = entry.file_type().await.map_err(read_err)?.is_dir();
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push(FileListEntry {
            path: display_join(&directory, &name),
            kind: if is_directory { "directory" } else { "file" },
            is_directory,
            name,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(FileList { total_files: files.len(), files, directory })
}

// ---------------------------------------------------------------------------
// read_file
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ReadFileArgs {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, rename = "filePath")]
    pub file_path_camel: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FileContent {
    pub file_path: String,
    pub content: String,
    pub total_lines: usize,
    pub language: &'static str,
}

pub async fn read_file(ctx: &AppContext, args: ReadFileArgs) -> Result<FileContent, ToolError> {
    let file_path = required(either(args.file_path, args.file_path_camel), "file_path")?;
    let full_path = resolve(&ctx.config.project_root, &file_path);

    let content = tokio::fs::read_to_string(&full_path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                message: "File not found".to_string(),
                echo: echo([("file_path", Value::from(file_path.as_str()))]),
            }
        } else {
            ToolError::io(format!("Failed to read '{file_path}'"), e)
        }
    })?;

    Ok(FileContent {
        total_lines: content.split('\n').count(),
        language: language_for(&file_path),
        content,
        file_path,
    })
}

// ---------------------------------------------------------------------------
// write_file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Create,
    Overwrite,
}

impl WriteMode {
    fn parse(mode: Option<&str>) -> Result<Self, ToolError> {
        match mode {
            None | Some("create") => Ok(WriteMode::Create),
            Some("overwrite") => Ok(WriteMode::Overwrite),
            Some(other) => Err(ToolError::Validation {
                message: "Invalid mode".to_string(),
                details: Some(Value::from(format!(
                    "'{other}' is not one of: create, overwrite"
                ))),
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct WriteFileArgs {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, rename = "filePath")]
    pub file_path_camel: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteOutcome {
    pub success: bool,
    pub file_path: String,
    pub action: WriteMode,
    pub bytes_written: usize,
    pub message: &'static str,
}

pub async fn write_file(ctx: &AppContext, args: WriteFileArgs) -> Result<WriteOutcome, ToolError> {
    let file_path = required(either(args.file_path, args.file_path_camel), "file_path")?;
    let action = WriteMode::parse(args.mode.as_deref())?;
    let content = args.content.unwrap_or_default();
    let full_path = resolve(&ctx.config.project_root, &file_path);

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            ToolError::io(format!("Failed to create parent directories for '{file_path}'"), e)
        })?;
    }
    tokio::fs::write(&full_path, content.as_bytes())
        .await
        .map_err(|e| ToolError::io(format!("Failed to write '{file_path}'"), e))?;

    debug!(path = file_path.as_str(), bytes = content.len(), "File written");
    Ok(WriteOutcome {
        success: true,
        file_path,
        action,
        bytes_written: content.len(),
        message: "File saved successfully",
    })
}

// ---------------------------------------------------------------------------
// run_npm_script
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RunScriptArgs {
    #[serde(default)]
    pub script_name: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

pub async fn run_npm_script(
    ctx: &AppContext,
    args: RunScriptArgs,
) -> Result<crate::npm::ScriptRun, ToolError> {
    let script = required(either(args.script_name, args.script), "script_name")?;
    let dir = resolve(&ctx.config.project_root, args.cwd.as_deref().unwrap_or("."));
    run_script(&ctx.config.npm_command, dir, &script).await
}

// ---------------------------------------------------------------------------
// search / fetch
// ---------------------------------------------------------------------------

/// Search never rejects its arguments, so both fields are taken as raw JSON.
#[derive(Debug, Default, Deserialize)]
pub struct SearchArgs {
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub limit: Value,
}

impl SearchArgs {
    fn query(&self) -> String {
        match &self.query {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn limit(&self) -> usize {
        self.limit.as_u64().map_or(DEFAULT_SEARCH_LIMIT, |n| usize::try_from(n).unwrap_or(usize::MAX))
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<DocumentSummary>,
    pub total: usize,
}

pub fn search(ctx: &AppContext, args: SearchArgs) -> Result<SearchResults, ToolError> {
    let (query, limit) = (args.query(), args.limit());
    let results = ctx.documents.filter(&query, limit).map_err(|e| ToolError::Internal {
        details: e.to_string(),
        echo: echo([("results", serde_json::json!([]))]),
    })?;
    Ok(SearchResults { total: results.len(), results })
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchArgs {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

pub fn fetch(ctx: &AppContext, args: FetchArgs) -> Result<devhelper_core::Document, ToolError> {
    let source_err = |e: devhelper_core::DocumentError| ToolError::Internal {
        details: e.to_string(),
        echo: Default::default(),
    };
    let found = match (args.id.as_deref(), args.url.as_deref()) {
        (Some(id), _) => ctx.documents.by_id(id).map_err(source_err)?,
        (None, Some(url)) => ctx.documents.by_url(url).map_err(source_err)?,
        (None, None) => None,
    };
    found.ok_or_else(|| ToolError::NotFound {
        message: "Document not found".to_string(),
        echo: echo([("id", serde_json::json!(args.id)), ("url", serde_json::json!(args.url))]),
    })
}
