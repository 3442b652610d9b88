//! Gatekeeper error types

use thiserror::Error;

/// Faults of the moderation step itself
///
/// A flagged query is not an error; see [`crate::GateStatus::Rejected`].
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// The moderation service could not be reached or refused the call
    #[error("Moderation service error: {0}")]
    Service(String),

    /// The moderation service answered without a usable verdict
    #[error("Invalid moderation response: {0}")]
    MalformedResponse(String),
}
