//! The request gate.
//!
//! Implements the per-request decision sequence: locale rewrite, public
//! allow-list, authentication requirement, then role policy. Produces a
//! [`GateOutcome`] for the transport to apply.

use eventra_core::models::identity::{Role, SessionClaims};
use eventra_core::policy::{self, Action, ResourceClass};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::warn;

use crate::config::GateConfig;
use crate::route::{self, RouteTarget};

/// Characters left verbatim in the `callbackUrl` query value.
const CALLBACK_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Decision for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Forward to the handler unmodified.
    Allow,
    /// Static rewrite (locale normalization); re-enter routing with the
    /// new path.
    Rewrite { location: String },
    /// No valid session on a gated path.
    RedirectToLogin { location: String },
    /// Session present, role denied for the target.
    RedirectDenied { location: String },
}

pub struct RequestGate {
    config: GateConfig,
}

impl RequestGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluate one request.
    ///
    /// `session` carries the raw claims from the identity provider, or
    /// `None` when no session exists or identity lookup failed — both
    /// are treated as unauthenticated.
    pub fn evaluate(&self, path: &str, session: Option<&SessionClaims>) -> GateOutcome {
        // Locale normalization is a static rewrite, not a policy decision.
        if path.is_empty() || path == "/" {
            return GateOutcome::Rewrite {
                location: format!("/{}", self.config.default_locale),
            };
        }

        let (locale, rest) = route::split_locale(path, &self.config);
        if locale.is_none() && matches!(route::classify(rest, &self.config), RouteTarget::Dashboard)
        {
            // Dashboard paths are locale-scoped; insert the default.
            return GateOutcome::Rewrite {
                location: format!("/{}{}", self.config.default_locale, rest),
            };
        }
        let locale = locale.unwrap_or(&self.config.default_locale);

        match route::classify(rest, &self.config) {
            RouteTarget::Public | RouteTarget::Open => GateOutcome::Allow,
            RouteTarget::Dashboard => match session {
                Some(_) => GateOutcome::Allow,
                None => self.login_redirect(locale, path),
            },
            RouteTarget::Admin(resource) => self.evaluate_admin(locale, path, resource, session),
        }
    }

    fn evaluate_admin(
        &self,
        locale: &str,
        path: &str,
        resource: ResourceClass,
        session: Option<&SessionClaims>,
    ) -> GateOutcome {
        let Some(claims) = session else {
            return self.login_redirect(locale, path);
        };

        let role = match Role::parse(&claims.role) {
            Some(role) => role,
            None => {
                // Indicates enum drift upstream; deny closed.
                warn!(
                    user_id = %claims.user_id,
                    role = %claims.role,
                    "unrecognized role in session, denying"
                );
                return GateOutcome::RedirectDenied {
                    location: self.config.landing_path(None, locale),
                };
            }
        };

        if role == Role::Admin {
            return GateOutcome::Allow;
        }
        if policy::is_allowed(role, resource, Action::View) {
            GateOutcome::Allow
        } else {
            GateOutcome::RedirectDenied {
                location: self.config.landing_path(Some(role), locale),
            }
        }
    }

    fn login_redirect(&self, locale: &str, original: &str) -> GateOutcome {
        let callback = utf8_percent_encode(original, CALLBACK_SAFE);
        GateOutcome::RedirectToLogin {
            location: format!("/{locale}/login?callbackUrl={callback}"),
        }
    }
}
