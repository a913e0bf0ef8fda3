//! RPC procedure guards.
//!
//! Re-apply role checks at the data-access layer: the gate covers
//! URL-path granularity, these cover per-procedure granularity. A guard
//! is evaluated on every call against the identity resolved from the
//! current request context; role values are never reused across calls.

use std::fmt;

use eventra_core::error::EventraError;
use eventra_core::models::identity::{Identity, Role};
use thiserror::Error;

/// Minimum-role tiers for guarded procedures. Stricter tiers imply the
/// weaker ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardTier {
    /// Any signed-in identity.
    Authenticated,
    /// Admin, moderator, or content creator.
    ContentAccess,
    /// Admin or moderator.
    ModeratorOrAdmin,
    /// Admin only.
    Admin,
}

/// Guard failure signals.
///
/// `Unauthorized` (no session) and `Forbidden` (insufficient role) stay
/// distinct: clients prompt a login for the former and render an
/// access-denied state for the latter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("UNAUTHORIZED: no active session")]
    Unauthorized,

    #[error("FORBIDDEN: role {role} does not satisfy {required}")]
    Forbidden { role: Role, required: GuardTier },
}

impl GuardTier {
    pub fn name(self) -> &'static str {
        match self {
            GuardTier::Authenticated => "authenticated",
            GuardTier::ContentAccess => "contentAccess",
            GuardTier::ModeratorOrAdmin => "moderatorOrAdmin",
            GuardTier::Admin => "admin",
        }
    }

    /// Whether `role` satisfies this tier.
    pub fn allows(self, role: Role) -> bool {
        match self {
            GuardTier::Authenticated => true,
            GuardTier::ContentAccess => {
                matches!(role, Role::Admin | Role::Moderator | Role::ContentCreator)
            }
            GuardTier::ModeratorOrAdmin => matches!(role, Role::Admin | Role::Moderator),
            GuardTier::Admin => matches!(role, Role::Admin),
        }
    }

    /// Run the guard against the identity resolved for this call.
    pub fn authorize(self, identity: Option<&Identity>) -> Result<(), GuardError> {
        let identity = identity.ok_or(GuardError::Unauthorized)?;
        if self.allows(identity.role) {
            Ok(())
        } else {
            Err(GuardError::Forbidden {
                role: identity.role,
                required: self,
            })
        }
    }
}

impl fmt::Display for GuardTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<GuardError> for EventraError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized => EventraError::Unauthenticated,
            GuardError::Forbidden { .. } => EventraError::Forbidden {
                reason: err.to_string(),
            },
        }
    }
}
