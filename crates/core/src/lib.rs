//! dev-helper core — transport-independent pieces of the tool server.
//!
//! # Modules
//!
//! - [`envelope`] — Content-part envelope every tool response is wrapped in
//! - [`paths`] — Project-root path resolution and extension-based language tags
//! - [`documents`] — Document lookup abstraction and the built-in static document list

pub mod documents;
pub mod envelope;
pub mod paths;

pub use documents::{Document, DocumentError, DocumentSource, DocumentSummary, StaticDocuments};
pub use envelope::{ContentPart, Envelope};
pub use paths::{language_for, resolve};
