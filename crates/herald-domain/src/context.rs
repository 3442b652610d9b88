//! Grounding context - the corpus text the model answers from

/// Separator line placed between two context sections
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// Plain-text contribution of one successfully extracted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSection {
    /// Heading derived from the document identifier
    pub heading: String,

    /// Plain prose extracted from the document
    pub text: String,
}

impl ContextSection {
    /// Create a new section
    pub fn new(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text: text.into(),
        }
    }

    /// Render the section as a heading line followed by its text
    pub fn render(&self) -> String {
        format!("\n# {}\n\n{}\n", self.heading, self.text)
    }
}

/// Ordered concatenation of context sections
///
/// A grounding context is never empty: constructing one from zero sections
/// fails, so an ungrounded prompt cannot be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingContext {
    sections: Vec<ContextSection>,
    rendered: String,
}

impl GroundingContext {
    /// Build a context from sections in document order
    ///
    /// Returns `None` when there are no sections or every section is blank.
    pub fn from_sections(sections: Vec<ContextSection>) -> Option<Self> {
        if sections.iter().all(|s| s.text.trim().is_empty()) {
            return None;
        }

        let rendered = sections
            .iter()
            .map(ContextSection::render)
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);

        Some(Self { sections, rendered })
    }

    /// Sections in document order
    pub fn sections(&self) -> &[ContextSection] {
        &self.sections
    }

    /// The full context string
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Number of contributing documents
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether there are no sections (never true once constructed)
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
