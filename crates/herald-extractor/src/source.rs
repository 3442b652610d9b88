//! Document sources: the filesystem and an in-memory map

use crate::error::SourceError;
use herald_domain::traits::DocumentSource;
use herald_domain::{Document, DocumentId};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Reads documents from files below a root directory
///
/// Identifiers are relative paths; absolute paths and `..` components are
/// refused.
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory documents are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, id: &DocumentId) -> Result<PathBuf, SourceError> {
        let relative = Path::new(id.as_str());
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if id.as_str().is_empty() || !contained {
            return Err(SourceError::InvalidId(id.clone()));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentSource for FsDocumentSource {
    type Error = SourceError;

    async fn fetch(&self, id: &DocumentId) -> Result<Document, Self::Error> {
        let path = self.resolve(id)?;
        debug!(document = %id, path = %path.display(), "Reading document");

        match tokio::fs::read_to_string(&path).await {
            Ok(source) => Ok(Document::new(id.clone(), source)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SourceError::NotFound(id.clone()))
            }
            Err(e) => Err(SourceError::Read {
                id: id.clone(),
                source: e,
            }),
        }
    }
}

/// Serves documents from memory
///
/// Clones share the fetch log, so tests can count reads.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    documents: HashMap<DocumentId, String>,
    fetches: Arc<Mutex<Vec<DocumentId>>>,
}

impl InMemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document
    pub fn with_document(mut self, id: impl Into<String>, source: impl Into<String>) -> Self {
        self.documents.insert(DocumentId::new(id), source.into());
        self
    }

    /// Identifiers fetched so far, in call order
    pub fn fetched(&self) -> Vec<DocumentId> {
        self.fetches.lock().unwrap().clone()
    }
}

impl DocumentSource for InMemorySource {
    type Error = SourceError;

    async fn fetch(&self, id: &DocumentId) -> Result<Document, Self::Error> {
        self.fetches.lock().unwrap().push(id.clone());
        self.documents
            .get(id)
            .map(|source| Document::new(id.clone(), source.clone()))
            .ok_or_else(|| SourceError::NotFound(id.clone()))
    }
}
