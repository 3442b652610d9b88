//! Document module - raw MDX sources identified by name

use std::fmt;

/// Identifier of a document in the document source (e.g. `Resume.mdx`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new document identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the section heading for this document
    ///
    /// Directory components and the file extension are dropped, and markup
    /// characters that would change the meaning of a heading line are removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_domain::DocumentId;
    ///
    /// assert_eq!(DocumentId::new("docs/Resume.mdx").heading(), "Resume");
    /// assert_eq!(DocumentId::new("*Notes*.md").heading(), "Notes");
    /// ```
    pub fn heading(&self) -> String {
        let file_name = self.0.rsplit(['/', '\\']).next().unwrap_or(&self.0);
        let stem = match file_name.rfind('.') {
            Some(dot) if dot > 0 => &file_name[..dot],
            _ => file_name,
        };

        stem.chars()
            .filter(|c| !matches!(c, '#' | '*' | '_' | '`' | '<' | '>' | '[' | ']' | '{' | '}'))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A raw document as returned by the document source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier the document was fetched by
    pub id: DocumentId,

    /// Raw structured-markup (MDX) source text
    pub source: String,
}

impl Document {
    /// Create a new document
    pub fn new(id: DocumentId, source: impl Into<String>) -> Self {
        Self {
            id,
            source: source.into(),
        }
    }
}
