//! Capability-based access control
//!
//! The pricing core only ever asks "does principal P hold capability C?".
//! How roles are stored and rotated is up to the [`AccessGateway`]
//! implementation; [`RoleRegistry`] is the in-process one.

use std::collections::HashSet;
use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Caller identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Abstract permission checked before a governance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// May propose discount parameter updates
    Manager,
    /// May replace the update limits
    ParameterAdmin,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Manager => write!(f, "manager"),
            Capability::ParameterAdmin => write!(f, "parameter-admin"),
        }
    }
}

/// Answers capability queries; synchronous and side-effect free
pub trait AccessGateway: Send + Sync {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool;
}

/// Role bookkeeping errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("Invalid principal: identifier must not be empty")]
    InvalidPrincipal,

    #[error("Principal {principal} does not hold {capability}")]
    NotHeld {
        principal: String,
        capability: Capability,
    },
}

/// In-memory capability registry
#[derive(Debug, Default)]
pub struct RoleRegistry {
    grants: DashMap<Principal, HashSet<Capability>>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a capability
    pub fn grant(&self, principal: &Principal, capability: Capability) -> Result<(), RoleError> {
        if principal.as_str().trim().is_empty() {
            return Err(RoleError::InvalidPrincipal);
        }
        self.grants
            .entry(principal.clone())
            .or_default()
            .insert(capability);
        info!(%principal, %capability, "Capability granted");
        Ok(())
    }

    /// Revoke a capability; returns whether it was held
    pub fn revoke(&self, principal: &Principal, capability: Capability) -> bool {
        let removed = self
            .grants
            .get_mut(principal)
            .map(|mut caps| caps.remove(&capability))
            .unwrap_or(false);
        if removed {
            info!(%principal, %capability, "Capability revoked");
        }
        removed
    }

    /// Move a capability from one principal to another
    pub fn transfer(
        &self,
        capability: Capability,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), RoleError> {
        if to.as_str().trim().is_empty() {
            return Err(RoleError::InvalidPrincipal);
        }
        if !self.has_capability(from, capability) {
            return Err(RoleError::NotHeld {
                principal: from.to_string(),
                capability,
            });
        }
        self.revoke(from, capability);
        self.grant(to, capability)
    }

    /// Principals currently holding a capability
    pub fn holders(&self, capability: Capability) -> Vec<Principal> {
        self.grants
            .iter()
            .filter(|entry| entry.value().contains(&capability))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl AccessGateway for RoleRegistry {
    fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        self.grants
            .get(principal)
            .map(|caps| caps.contains(&capability))
            .unwrap_or(false)
    }
}
