//! Herald Gatekeeper
//!
//! Screens every query with the moderation service before any
//! cost-incurring generation call is made.
//!
//! The Gatekeeper provides:
//! - Exactly one moderation call per query, never retried
//! - Verdict-list validation (an empty list is a service fault)
//! - A cleared / rejected outcome carrying the category breakdown
//!
//! # Examples
//!
//! ```no_run
//! use herald_gatekeeper::SafetyGate;
//! use herald_domain::Query;
//! use herald_llm::MockModeration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gate = SafetyGate::new(MockModeration::clean());
//! let query = Query::parse("What did David do at Ledn?")?;
//!
//! let outcome = gate.check(&query).await?;
//! assert!(outcome.is_cleared());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod gate;

pub use error::GatekeeperError;
pub use gate::{GateOutcome, GateStatus, SafetyGate};
