//! Request gate configuration.

use eventra_core::models::identity::Role;

/// Configuration for the request gate.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Recognized two-letter locale codes.
    pub locales: Vec<String>,
    /// Locale assumed when a path carries no locale prefix.
    pub default_locale: String,
    /// Post-denial landing path for staff roles.
    pub admin_landing: String,
    /// Path prefixes (locale-stripped) that bypass authentication:
    /// auth endpoints and the public lead-creation call.
    pub public_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            locales: vec!["en".into(), "ar".into()],
            default_locale: "en".into(),
            admin_landing: "/admin/dashboard".into(),
            public_prefixes: vec![
                "/login".into(),
                "/register".into(),
                "/api/auth".into(),
                "/api/rpc/leads.create".into(),
            ],
        }
    }
}

impl GateConfig {
    /// True if `code` is a recognized locale.
    pub fn is_locale(&self, code: &str) -> bool {
        self.locales.iter().any(|l| l == code)
    }

    /// Post-denial landing path for a role.
    ///
    /// `None` means the session carried an unrecognized role; the
    /// fail-closed default is the caller's own dashboard.
    pub fn landing_path(&self, role: Option<Role>, locale: &str) -> String {
        match role {
            Some(Role::Admin) | Some(Role::Moderator) | Some(Role::ContentCreator) => {
                self.admin_landing.clone()
            }
            Some(Role::Client) | None => format!("/{locale}/dashboard"),
        }
    }
}
