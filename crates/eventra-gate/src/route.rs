//! Route classification.
//!
//! Paths are classified into typed targets once, here; the gate applies
//! policy to the resulting enum, never to raw URL fragments.

use eventra_core::policy::ResourceClass;

use crate::config::GateConfig;

/// Typed classification of an inbound path (locale already stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    /// Explicit public allow-list: forwarded without authentication.
    Public,
    /// `/{locale}/dashboard/**`: requires a session, no role check at
    /// path granularity.
    Dashboard,
    /// `/admin/**`, with the concrete resource class under it.
    Admin(ResourceClass),
    /// Anything else (marketing pages): not gated.
    Open,
}

/// Split a leading locale segment off `path`.
///
/// Returns the locale, if the first segment is a recognized code, and
/// the remainder starting with `/`.
pub fn split_locale<'a>(path: &'a str, config: &GateConfig) -> (Option<&'a str>, &'a str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let head = match trimmed.split_once('/') {
        Some((head, _)) => head,
        None => trimmed,
    };

    if config.is_locale(head) {
        // Index into trimmed, not path: the leading slash may be absent.
        let remainder = &trimmed[head.len()..];
        if remainder.is_empty() {
            (Some(head), "/")
        } else {
            (Some(head), remainder)
        }
    } else {
        (None, path)
    }
}

/// Classify a locale-stripped path into a route target.
pub fn classify(path: &str, config: &GateConfig) -> RouteTarget {
    if config
        .public_prefixes
        .iter()
        .any(|prefix| matches_segment(path, prefix))
    {
        return RouteTarget::Public;
    }
    if matches_segment(path, "/dashboard") {
        return RouteTarget::Dashboard;
    }
    if matches_segment(path, "/admin") {
        return RouteTarget::Admin(admin_resource(path));
    }
    RouteTarget::Open
}

/// Prefix match on whole path segments: `/admin` matches `/admin` and
/// `/admin/leads` but not `/administration`.
fn matches_segment(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn admin_resource(path: &str) -> ResourceClass {
    let sub = path.strip_prefix("/admin").unwrap_or(path);
    if matches_segment(sub, "/users/profile") {
        ResourceClass::OwnProfile
    } else if matches_segment(sub, "/users") {
        ResourceClass::UserManagement
    } else if matches_segment(sub, "/leads") {
        ResourceClass::LeadManagement
    } else if matches_segment(sub, "/articles") {
        ResourceClass::ArticleManagement
    } else {
        ResourceClass::AdminArea
    }
}
