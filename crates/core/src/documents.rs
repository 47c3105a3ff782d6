//! Document lookup for the `search` and `fetch` tools.
//!
//! Handlers only see the [`DocumentSource`] trait; [`StaticDocuments`] is the
//! built-in fixed list, defined at process start and never mutated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub metadata: serde_json::Value,
}

/// Search hit: a document with its text withheld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self { id: doc.id.clone(), title: doc.title.clone(), url: doc.url.clone() }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document source unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

pub trait DocumentSource: Send + Sync {
    fn by_id(&self, id: &str) -> Result<Option<Document>, DocumentError>;

    fn by_url(&self, url: &str) -> Result<Option<Document>, DocumentError>;

    /// Case-insensitive substring filter over title and text, in source order.
    /// An empty query matches every document.
    fn filter(&self, query: &str, limit: usize) -> Result<Vec<DocumentSummary>, DocumentError>;
}

// ---------------------------------------------------------------------------
// Static in-memory source
// ---------------------------------------------------------------------------

pub struct StaticDocuments {
    docs: Vec<Document>,
    // Lowercased "title text" per document, same order as `docs`
    haystacks: Vec<String>,
}

impl StaticDocuments {
    pub fn new(docs: Vec<Document>) -> Self {
        let haystacks =
            docs.iter().map(|d| format!("{} {}", d.title, d.text).to_lowercase()).collect();
        Self { docs, haystacks }
    }

    /// The document list shipped with the server.
    pub fn builtin() -> Self {
        Self::new(builtin_documents())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Default for StaticDocuments {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DocumentSource for StaticDocuments {
    fn by_id(&self, id: &str) -> Result<Option<Document>, DocumentError> {
        Ok(self.docs.iter().find(|d| d.id == id).cloned())
    }

    fn by_url(&self, url: &str) -> Result<Option<Document>, DocumentError> {
        Ok(self.docs.iter().find(|d| d.url == url).cloned())
    }

    fn filter(&self, query: &str, limit: usize) -> Result<Vec<DocumentSummary>, DocumentError> {
        let needle = query.to_lowercase();
        Ok(self
            .docs
            .iter()
            .zip(&self.haystacks)
            .filter(|(_, hay)| needle.is_empty() || hay.contains(&needle))
            .take(limit)
            .map(|(doc, _)| DocumentSummary::from(doc))
            .collect())
    }
}

fn builtin_documents() -> Vec<Document> {
    let doc = |id: &str, title: &str, url: &str, text: &str, metadata: serde_json::Value| {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            text: text.to_string(),
            metadata,
        }
    };

    vec![
        doc(
            "doc-1",
            "Deploying the dev helper on Render",
            "https://docs.dev-helper.local/deploy/render",
            "Create a web service, set the start command to the dev-helper binary and expose \
             PORT 10000. PROJECT_ROOT should point at the checked-out application directory.",
            serde_json::json!({ "category": "deployment", "updated": "2025-01-12" }),
        ),
        doc(
            "doc-2",
            "Tool endpoints overview",
            "https://docs.dev-helper.local/tools",
            "Every tool is a POST to /tools/<name> with a JSON body. Responses are wrapped in \
             a content envelope with a single text part holding the serialized result.",
            serde_json::json!({ "category": "reference", "updated": "2025-01-08" }),
        ),
        doc(
            "doc-3",
            "Frontend build scripts",
            "https://docs.dev-helper.local/scripts",
            "Use run_npm_script with build, test or lint. The dev script starts the bundler \
             and server-side rendering in watch mode.",
            serde_json::json!({ "category": "workflow", "updated": "2024-12-20" }),
        ),
        doc(
            "doc-4",
            "Server-sent events channel",
            "https://docs.dev-helper.local/sse",
            "GET /sse announces the server and its tools, then sends a ping every 25 seconds \
             until the client disconnects.",
            serde_json::json!({ "category": "reference", "updated": "2025-01-03" }),
        ),
    ]
}
