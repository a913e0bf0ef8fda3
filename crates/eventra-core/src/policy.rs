//! Role policy engine.
//!
//! A pure, total mapping from `(role, resource class, action)` to an
//! allow/deny decision. Holds no state and performs no I/O. Both the
//! request gate and the RPC guards consult this single table, so the
//! two enforcement points cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::models::identity::Role;

/// Classification of a request's target, independent of URL shape.
///
/// Routes are mapped onto this enum once, at classification time; the
/// policy engine never inspects raw paths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// A signed-in user's own dashboard area.
    DashboardSelf,
    /// The admin area at large (overview pages, settings).
    AdminArea,
    /// Managing other users' accounts.
    UserManagement,
    /// The caller's own profile page. Carved out of user management:
    /// permitted for every role.
    OwnProfile,
    /// Sales leads from the public contact form.
    LeadManagement,
    /// Articles and other published content.
    ArticleManagement,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 6] = [
        ResourceClass::DashboardSelf,
        ResourceClass::AdminArea,
        ResourceClass::UserManagement,
        ResourceClass::OwnProfile,
        ResourceClass::LeadManagement,
        ResourceClass::ArticleManagement,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Manage,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::View, Action::Manage];
}

/// Decide whether `role` may perform `action` on `resource`.
///
/// Total over all enum triples and never panics. `Admin` is permitted
/// every action on every resource class; every other role's permission
/// set is a strict subset.
pub fn is_allowed(role: Role, resource: ResourceClass, action: Action) -> bool {
    match action {
        // The policy grants whole resource classes, so View and Manage
        // share one table. The action stays in the signature so callers
        // do not change if the table ever splits per action.
        Action::View | Action::Manage => permits(role, resource),
    }
}

fn permits(role: Role, resource: ResourceClass) -> bool {
    use ResourceClass::*;

    match role {
        Role::Admin => true,
        Role::Moderator => !matches!(resource, UserManagement),
        Role::ContentCreator => !matches!(resource, UserManagement | LeadManagement),
        Role::Client => matches!(resource, DashboardSelf | OwnProfile),
    }
}
