use std::collections::HashMap;

use crate::menu::{DASHBOARD_PATH, MenuGroup, MenuItem, MenuPolicy};
use crate::roles::{Role, RoleRegistry};

/// has_access
///
/// The single visibility predicate everything else builds on:
/// an empty or absent required-roles set grants access; otherwise the user's
/// role must be a member of the set. An absent user role (not yet
/// authenticated, or unresolvable) always fails a gated check.
///
/// Pure and deterministic; safe to call repeatedly.
pub fn has_access(user_role: Option<Role>, required: Option<&[Role]>) -> bool {
    match required {
        // No restriction declared: present-but-empty behaves identically to
        // absent. This equivalence is part of the contract, not an accident.
        None => true,
        Some([]) => true,
        Some(roles) => match user_role {
            Some(role) => roles.contains(&role),
            None => false,
        },
    }
}

/// AccessPolicy
///
/// The role registry and menu policy bundled into one immutable configuration
/// object, constructed once at startup and passed by reference to the hydrator
/// and route guard. The route-to-roles map is derived here exactly once.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    registry: RoleRegistry,
    menu: MenuPolicy,
    routes: HashMap<String, Option<Vec<Role>>>,
}

impl AccessPolicy {
    pub fn new(registry: RoleRegistry, menu: MenuPolicy) -> Self {
        let routes = menu.route_map();
        Self {
            registry,
            menu,
            routes,
        }
    }

    /// The console's standard policy: every known role, the default menu tree.
    pub fn standard() -> Self {
        Self::new(RoleRegistry::standard(), crate::menu::default_policy())
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn menu(&self) -> &MenuPolicy {
        &self.menu
    }

    /// filter_menu_groups
    ///
    /// Returns the menu groups visible to `user_role`, in declaration order.
    /// A group survives only if its own gate passes AND at least one of its
    /// items passes; surviving groups carry only their visible items. A stable
    /// filter, not a sort; calling it twice with the same inputs yields
    /// structurally identical output.
    pub fn filter_menu_groups(&self, user_role: Option<Role>) -> Vec<MenuGroup> {
        self.menu
            .groups
            .iter()
            .filter(|group| has_access(user_role, group.roles.as_deref()))
            .filter_map(|group| {
                let items: Vec<MenuItem> = group
                    .items
                    .iter()
                    .filter(|item| has_access(user_role, item.roles.as_deref()))
                    .cloned()
                    .collect();
                if items.is_empty() {
                    // Nothing left to show: drop the group entirely.
                    None
                } else {
                    let mut visible = (*group).clone();
                    visible.items = items;
                    Some(visible)
                }
            })
            .collect()
    }

    /// can_access_route
    ///
    /// Exact-string lookup of `path` in the derived route map. A registered
    /// path applies `has_access`; an unregistered path is allowed for any role:
    /// fail-open by design, so routes that live outside the menu system
    /// (the forbidden screen, deep links) remain reachable. Tests pin this
    /// behavior so a future policy change cannot silently flip it.
    pub fn can_access_route(&self, path: &str, user_role: Option<Role>) -> bool {
        match self.routes.get(path) {
            Some(required) => {
                let granted = has_access(user_role, required.as_deref());
                if !granted {
                    tracing::debug!(path, role = ?user_role, "route access denied");
                }
                granted
            }
            None => true,
        }
    }

    /// has_role_or_higher
    ///
    /// Compares privilege ranks from the registry. Returns `false` when either
    /// role is missing from the registry; an unknown role never outranks
    /// anything.
    pub fn has_role_or_higher(&self, user_role: Role, required: Role) -> bool {
        match (self.registry.rank_of(user_role), self.registry.rank_of(required)) {
            (Some(user_rank), Some(required_rank)) => user_rank >= required_rank,
            _ => false,
        }
    }

    /// is_protected
    ///
    /// Whether a path requires an authenticated session. Membership in the
    /// derived route map (the dashboard included); unregistered paths are
    /// unprotected, consistent with the fail-open route rule.
    pub fn is_protected(&self, path: &str) -> bool {
        path == DASHBOARD_PATH || self.routes.contains_key(path)
    }
}
