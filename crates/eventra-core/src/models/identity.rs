//! Identity and role domain model.
//!
//! Sessions are issued by an external identity provider; this system
//! only consumes the `{ user_id, role }` pair a session carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventraError;

/// Closed set of identity classes governing authorization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Moderator,
    ContentCreator,
    Client,
}

impl Role {
    /// All roles, for exhaustive policy checks.
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Moderator,
        Role::ContentCreator,
        Role::Client,
    ];

    /// Parse a role string as stored by the session provider.
    ///
    /// Returns `None` for values outside the closed enum; callers must
    /// treat that as a fail-closed condition.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "MODERATOR" => Some(Role::Moderator),
            "CONTENT_CREATOR" => Some(Role::ContentCreator),
            "CLIENT" => Some(Role::Client),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
            Role::ContentCreator => "CONTENT_CREATOR",
            Role::Client => "CLIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated caller, as resolved from the current request.
///
/// Immutable for the lifetime of a request; a role change takes effect
/// on the next session issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Raw session claims from the identity provider, before role parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub role: String,
}

impl SessionClaims {
    /// Resolve the typed identity. Fails closed on unknown role values.
    pub fn identity(&self) -> Result<Identity, EventraError> {
        match Role::parse(&self.role) {
            Some(role) => Ok(Identity {
                user_id: self.user_id,
                role,
            }),
            None => Err(EventraError::UnknownRole {
                value: self.role.clone(),
            }),
        }
    }
}
