//! Query screening logic

use crate::GatekeeperError;
use herald_domain::traits::ModerationService;
use herald_domain::{ModerationVerdict, Query};
use tracing::{debug, warn};

/// Whether the query may proceed to generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Query passed moderation
    Cleared,

    /// Query was flagged
    Rejected,
}

/// Result of screening one query
#[derive(Debug, Clone)]
pub struct GateOutcome {
    /// Cleared or rejected
    pub status: GateStatus,

    /// The verdict the decision was based on
    pub verdict: ModerationVerdict,
}

impl GateOutcome {
    /// Whether generation may proceed
    pub fn is_cleared(&self) -> bool {
        self.status == GateStatus::Cleared
    }
}

/// The safety gate in front of the completion model
pub struct SafetyGate<M> {
    moderation: M,
}

impl<M> SafetyGate<M>
where
    M: ModerationService,
{
    /// Create a new gate backed by the given moderation service
    pub fn new(moderation: M) -> Self {
        Self { moderation }
    }

    /// The underlying moderation service
    pub fn moderation(&self) -> &M {
        &self.moderation
    }

    /// Screen a query
    ///
    /// # Returns
    ///
    /// The cleared or rejected outcome. Only the first verdict is consulted
    /// because one input produces one verdict.
    ///
    /// # Errors
    ///
    /// - [`GatekeeperError::Service`] when the call fails
    /// - [`GatekeeperError::MalformedResponse`] when no verdict comes back
    pub async fn check(&self, query: &Query) -> Result<GateOutcome, GatekeeperError> {
        let verdicts = self
            .moderation
            .moderate(query.as_str())
            .await
            .map_err(|e| GatekeeperError::Service(e.to_string()))?;

        let Some(verdict) = verdicts.into_iter().next() else {
            return Err(GatekeeperError::MalformedResponse(
                "moderation returned no results".to_string(),
            ));
        };

        let status = if verdict.flagged {
            warn!(
                categories = ?verdict.flagged_categories(),
                "Query flagged by moderation"
            );
            GateStatus::Rejected
        } else {
            debug!("Query cleared moderation");
            GateStatus::Cleared
        };

        Ok(GateOutcome { status, verdict })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_llm::MockModeration;

    fn query() -> Query {
        Query::parse("  What did David do at Ledn?  ").unwrap()
    }

    #[tokio::test]
    async fn test_clean_query_is_cleared() {
        let gate = SafetyGate::new(MockModeration::clean());
        let outcome = gate.check(&query()).await.unwrap();

        assert!(outcome.is_cleared());
        assert_eq!(gate.moderation().call_count(), 1);
    }

    #[tokio::test]
    async fn test_trimmed_query_is_submitted() {
        let gate = SafetyGate::new(MockModeration::clean());
        gate.check(&query()).await.unwrap();

        assert_eq!(
            gate.moderation().inputs(),
            vec!["What did David do at Ledn?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_flagged_query_is_rejected() {
        let gate = SafetyGate::new(MockModeration::flagged(["harassment"]));
        let outcome = gate.check(&query()).await.unwrap();

        assert_eq!(outcome.status, GateStatus::Rejected);
        assert_eq!(outcome.verdict.flagged_categories(), vec!["harassment"]);
    }

    #[tokio::test]
    async fn test_empty_verdicts_are_malformed() {
        let gate = SafetyGate::new(MockModeration::empty());
        let result = gate.check(&query()).await;

        assert!(matches!(result, Err(GatekeeperError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_service_failure_not_retried() {
        let gate = SafetyGate::new(MockModeration::failing());
        let result = gate.check(&query()).await;

        assert!(matches!(result, Err(GatekeeperError::Service(_))));
        assert_eq!(gate.moderation().call_count(), 1);
    }

    #[tokio::test]
    async fn test_only_first_verdict_counts() {
        let moderation = MockModeration::new(vec![
            ModerationVerdict::clean(),
            ModerationVerdict::flagged_for(["violence"]),
        ]);
        let gate = SafetyGate::new(moderation);

        assert!(gate.check(&query()).await.unwrap().is_cleared());
    }
}
