//! Role-based gating of console sections.
//!
//! Every render and navigation site asks this module instead of re-deriving
//! capability logic. The mapping is total: every role has a non-empty
//! capability set, and a section outside the current role's set is never
//! reachable.

use crate::api::types::{Role, User};

/// Navigable sections of the console.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    Databases,
    Storages,
    Notifiers,
    Users,
}

/// Ordered set of sections a role may navigate to.
#[must_use]
pub const fn capabilities_for(role: Role) -> &'static [Section] {
    match role {
        Role::Manager => &[Section::Databases, Section::Storages, Section::Notifiers],
        Role::Admin => &[Section::Users],
    }
}

/// Capability set for an optional identity; unauthenticated means nothing
/// may render.
#[must_use]
pub fn capabilities(identity: Option<&User>) -> &'static [Section] {
    identity.map_or(&[], |user| capabilities_for(user.role))
}

/// Landing section immediately after the identity is resolved. Recomputed
/// whenever the identity changes, so a fresh ADMIN login never inherits a
/// MANAGER's previous tab.
#[must_use]
pub const fn default_section_for(role: Role) -> Section {
    match role {
        Role::Admin => Section::Users,
        Role::Manager => Section::Databases,
    }
}

/// Single call-site predicate for navigation and rendering.
#[must_use]
pub fn is_allowed(role: Role, section: Section) -> bool {
    capabilities_for(role).contains(&section)
}
