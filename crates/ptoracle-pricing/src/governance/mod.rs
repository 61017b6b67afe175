//! Governance module
//!
//! Parameter changes pass through two layers:
//! - [`GovernanceGateway`] checks the caller's capability
//! - [`ParameterStore`] rate-limits, bounds, and safety-checks the change
//!   before committing it

pub mod gateway;
pub mod store;

pub use gateway::GovernanceGateway;
pub use store::ParameterStore;
