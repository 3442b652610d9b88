//! Core Extractor implementation

use crate::config::{ExtractionPolicy, ExtractorConfig};
use crate::error::ExtractorError;
use crate::markup::{extract_text, MarkupError};
use crate::types::{DocumentFailure, ExtractionOutcome, FailureStage};
use herald_domain::traits::DocumentSource;
use herald_domain::{ContextSection, DocumentId, GroundingContext};
use tracing::{debug, error, info, warn};

/// The Extractor turns the configured corpus into a grounding context
pub struct Extractor<D>
where
    D: DocumentSource,
{
    source: D,
    documents: Vec<DocumentId>,
    config: ExtractorConfig,
}

impl<D> Extractor<D>
where
    D: DocumentSource,
{
    /// Create a new Extractor
    pub fn new(source: D, config: ExtractorConfig) -> Self {
        let documents = config.documents.iter().map(DocumentId::new).collect();
        Self {
            source,
            documents,
            config,
        }
    }

    /// The active failure policy
    pub fn policy(&self) -> ExtractionPolicy {
        self.config.policy
    }

    /// The underlying document source
    pub fn source(&self) -> &D {
        &self.source
    }

    /// Read and flatten every configured document
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::Config`] when the configuration is unusable; no
    ///   document is fetched
    /// - Strict policy: the first failing document
    /// - Best-effort policy: [`ExtractorError::AllFailed`] when nothing succeeded
    pub async fn extract(&self) -> Result<ExtractionOutcome, ExtractorError> {
        self.config.validate().map_err(ExtractorError::Config)?;

        let mut sections = Vec::with_capacity(self.documents.len());
        let mut failures = Vec::new();

        for id in &self.documents {
            match self.extract_one(id).await {
                Ok(section) => {
                    debug!(document = %id, chars = section.text.len(), "Extracted document");
                    sections.push(section);
                }
                Err(failure) => match self.config.policy {
                    ExtractionPolicy::Strict => {
                        error!(
                            document = %failure.id,
                            stage = failure.stage.as_str(),
                            cause = %failure.reason,
                            "Document extraction failed"
                        );
                        return Err(ExtractorError::Document(failure));
                    }
                    ExtractionPolicy::BestEffort => {
                        warn!(
                            document = %failure.id,
                            stage = failure.stage.as_str(),
                            cause = %failure.reason,
                            "Skipping document"
                        );
                        failures.push(failure);
                    }
                },
            }
        }

        let Some(context) = GroundingContext::from_sections(sections) else {
            error!("No documents could be extracted");
            return Err(ExtractorError::AllFailed(failures));
        };

        if failures.is_empty() {
            info!(
                "Loaded {} documents ({} chars of context)",
                context.len(),
                context.as_str().len()
            );
        } else {
            warn!(
                "Some documents failed to load. Successfully loaded {}/{} documents",
                context.len(),
                self.documents.len()
            );
        }

        Ok(ExtractionOutcome {
            context,
            failures,
            attempted: self.documents.len(),
        })
    }

    async fn extract_one(&self, id: &DocumentId) -> Result<ContextSection, DocumentFailure> {
        let document = self
            .source
            .fetch(id)
            .await
            .map_err(|e| DocumentFailure::new(id.clone(), FailureStage::Fetch, e.to_string()))?;

        let text = extract_text(&document.source, &self.config.non_prose).map_err(|e| {
            let stage = match e {
                MarkupError::Parse(_) => FailureStage::Parse,
                MarkupError::Empty => FailureStage::Content,
            };
            DocumentFailure::new(id.clone(), stage, e.to_string())
        })?;

        Ok(ContextSection::new(id.heading(), text))
    }
}
