//! Exhaustive properties of the role policy engine.

use eventra_core::models::identity::Role;
use eventra_core::policy::{Action, ResourceClass, is_allowed};

#[test]
fn total_over_all_triples() {
    // Every triple in the closed enums yields a decision; nothing panics.
    for role in Role::ALL {
        for resource in ResourceClass::ALL {
            for action in Action::ALL {
                let _ = is_allowed(role, resource, action);
            }
        }
    }
}

#[test]
fn admin_is_always_allowed() {
    for resource in ResourceClass::ALL {
        for action in Action::ALL {
            assert!(is_allowed(Role::Admin, resource, action));
        }
    }
}

#[test]
fn non_admin_roles_are_strict_subsets() {
    for role in [Role::Moderator, Role::ContentCreator, Role::Client] {
        let denied_somewhere = ResourceClass::ALL.iter().any(|&resource| {
            Action::ALL
                .iter()
                .any(|&action| !is_allowed(role, resource, action))
        });
        assert!(denied_somewhere, "{role} should not match admin's permissions");
    }
}

#[test]
fn own_profile_is_allowed_for_every_role() {
    for role in Role::ALL {
        for action in Action::ALL {
            assert!(is_allowed(role, ResourceClass::OwnProfile, action));
        }
    }
}

#[test]
fn moderator_is_denied_user_management_only() {
    for resource in ResourceClass::ALL {
        let expected = resource != ResourceClass::UserManagement;
        assert_eq!(
            is_allowed(Role::Moderator, resource, Action::View),
            expected,
            "moderator on {resource:?}"
        );
    }
}

#[test]
fn content_creator_is_denied_leads_and_user_management() {
    assert!(!is_allowed(
        Role::ContentCreator,
        ResourceClass::LeadManagement,
        Action::View
    ));
    assert!(!is_allowed(
        Role::ContentCreator,
        ResourceClass::UserManagement,
        Action::Manage
    ));
    assert!(is_allowed(
        Role::ContentCreator,
        ResourceClass::ArticleManagement,
        Action::Manage
    ));
    assert!(is_allowed(
        Role::ContentCreator,
        ResourceClass::AdminArea,
        Action::View
    ));
}

#[test]
fn client_is_limited_to_own_dashboard_and_profile() {
    for resource in ResourceClass::ALL {
        let expected = matches!(
            resource,
            ResourceClass::DashboardSelf | ResourceClass::OwnProfile
        );
        assert_eq!(
            is_allowed(Role::Client, resource, Action::View),
            expected,
            "client on {resource:?}"
        );
    }
}

#[test]
fn role_parse_round_trips_and_fails_closed() {
    for role in Role::ALL {
        assert_eq!(Role::parse(role.as_str()), Some(role));
    }
    assert_eq!(Role::parse("SUPERUSER"), None);
    assert_eq!(Role::parse(""), None);
    assert_eq!(Role::parse("admin"), None);
}
