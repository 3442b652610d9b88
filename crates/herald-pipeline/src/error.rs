//! Pipeline errors and their translation into caller responses

use herald_domain::QueryError;
use herald_extractor::ExtractorError;
use herald_gatekeeper::GatekeeperError;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{error, info};

/// Message returned for every application fault
pub const GENERIC_ERROR_MESSAGE: &str = "There was an error processing your request";

/// Who is responsible for a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The request itself is unacceptable; the message is shown as is
    UserFault,
    /// Something inside the system failed; details stay in the log
    ApplicationFault,
}

impl FaultKind {
    /// HTTP status for this kind of fault
    pub fn status_code(&self) -> u16 {
        match self {
            FaultKind::UserFault => 400,
            FaultKind::ApplicationFault => 500,
        }
    }
}

/// Failures that happen before the first frame is sent
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Body is not a JSON object with a string `prompt`
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Query missing or blank
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Moderation flagged the query
    #[error("Flagged content")]
    Flagged {
        /// Category map of the verdict
        categories: BTreeMap<String, bool>,
    },

    /// Moderation could not produce a verdict
    #[error(transparent)]
    Moderation(#[from] GatekeeperError),

    /// No grounding context could be built
    #[error(transparent)]
    Extraction(#[from] ExtractorError),

    /// The completion provider refused the request
    #[error("Completion request failed: {0}")]
    Completion(String),
}

/// Structured error body sent to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,

    /// Optional structured detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PipelineError {
    /// Classify the failure
    pub fn kind(&self) -> FaultKind {
        match self {
            PipelineError::InvalidBody(_)
            | PipelineError::Query(_)
            | PipelineError::Flagged { .. } => FaultKind::UserFault,
            PipelineError::Moderation(_)
            | PipelineError::Extraction(_)
            | PipelineError::Completion(_) => FaultKind::ApplicationFault,
        }
    }

    /// HTTP status for this failure
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// The body shown to the caller
    ///
    /// User faults carry their own message; application faults never leak
    /// internal details.
    pub fn error_body(&self) -> ErrorBody {
        match self {
            PipelineError::InvalidBody(_) => ErrorBody {
                error: "Invalid request body".to_string(),
                data: None,
            },
            PipelineError::Query(e) => ErrorBody {
                error: e.to_string(),
                data: None,
            },
            PipelineError::Flagged { categories } => ErrorBody {
                error: "Flagged content".to_string(),
                data: Some(json!({ "flagged": true, "categories": categories })),
            },
            PipelineError::Moderation(_)
            | PipelineError::Extraction(_)
            | PipelineError::Completion(_) => ErrorBody {
                error: GENERIC_ERROR_MESSAGE.to_string(),
                data: None,
            },
        }
    }

    /// Log the failure with its full diagnostics
    pub fn log(&self) {
        match self.kind() {
            FaultKind::UserFault => info!(error = %self, "Request refused"),
            FaultKind::ApplicationFault => error!(error = %self, "Request failed"),
        }
    }

    /// Log the failure and translate it into a status code and body
    pub fn to_response(&self) -> (u16, ErrorBody) {
        self.log();
        (self.status_code(), self.error_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_domain::DocumentId;
    use herald_extractor::{DocumentFailure, FailureStage};

    #[test]
    fn test_missing_query_is_user_fault() {
        let error = PipelineError::from(QueryError::Missing);
        let (status, body) = error.to_response();

        assert_eq!(status, 400);
        assert_eq!(body.error, "Missing query in request data");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "error": "Missing query in request data" })
        );
    }

    #[test]
    fn test_invalid_body_is_user_fault() {
        let error = PipelineError::InvalidBody("expected value at line 1".to_string());
        assert_eq!(error.kind(), FaultKind::UserFault);
        assert_eq!(error.error_body().error, "Invalid request body");
    }

    #[test]
    fn test_flagged_carries_categories() {
        let categories = BTreeMap::from([
            ("harassment".to_string(), true),
            ("violence".to_string(), false),
        ]);
        let error = PipelineError::Flagged { categories };
        let (status, body) = error.to_response();

        assert_eq!(status, 400);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "error": "Flagged content",
                "data": {
                    "flagged": true,
                    "categories": { "harassment": true, "violence": false }
                }
            })
        );
    }

    #[test]
    fn test_application_faults_are_generic() {
        let errors = [
            PipelineError::Moderation(GatekeeperError::MalformedResponse(
                "moderation returned no results".to_string(),
            )),
            PipelineError::Extraction(ExtractorError::AllFailed(vec![DocumentFailure::new(
                DocumentId::new("secret/path.mdx"),
                FailureStage::Fetch,
                "permission denied",
            )])),
            PipelineError::Completion("401 invalid api key sk-123".to_string()),
        ];

        for error in errors {
            let (status, body) = error.to_response();
            assert_eq!(status, 500);
            assert_eq!(body.error, GENERIC_ERROR_MESSAGE);
            assert!(body.data.is_none());
        }
    }

    #[test]
    fn test_diagnostics_kept_in_display() {
        let error = PipelineError::Completion("401 invalid api key".to_string());
        assert!(error.to_string().contains("401 invalid api key"));
    }
}
