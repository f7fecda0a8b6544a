use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::roles::Role;

// --- Fixed Shell Paths ---

/// The unauthenticated entry screen. Never role-gated.
pub const LOGIN_PATH: &str = "/login";
/// The default landing screen after a successful hydration or login.
pub const DASHBOARD_PATH: &str = "/dashboard";
/// The access-denied screen the route guard redirects to. Deliberately kept
/// out of the menu policy so the fail-open rule leaves it reachable.
pub const FORBIDDEN_PATH: &str = "/forbidden";

/// MenuItem
///
/// One navigable unit of the console: a path, its display label, and an opaque
/// icon identifier resolved by the presentation layer (an identifier rather
/// than a live object reference keeps the policy serializable).
///
/// `roles` is the permitted-roles gate. `None` and `Some(vec![])` are
/// equivalent and both mean "no restriction", a documented equivalence the
/// evaluator relies on. `children` supports nested navigation; the default
/// policy never exercises nesting but the route map flattens it regardless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub path: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<MenuItem>>,
}

impl MenuItem {
    pub fn new(id: &str, label: &str, path: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            path: path.to_string(),
            icon: icon.to_string(),
            roles: None,
            children: None,
        }
    }

    /// Restricts the item to the given roles.
    pub fn permit(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }

    pub fn with_children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = Some(children);
        self
    }
}

/// MenuGroup
///
/// A named, ordered collection of menu items, itself optionally gated by a
/// permitted-roles set. A group is visible only if its own gate passes AND at
/// least one child item remains visible; the evaluator drops empty groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuGroup {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    pub items: Vec<MenuItem>,
}

impl MenuGroup {
    pub fn new(id: &str, label: &str, items: Vec<MenuItem>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            roles: None,
            items,
        }
    }

    pub fn permit(mut self, roles: &[Role]) -> Self {
        self.roles = Some(roles.to_vec());
        self
    }
}

/// MenuPolicy
///
/// The declarative navigation policy: an ordered list of menu groups. Built
/// once at startup and shared immutably; the route-to-roles map is derived
/// from it, never authored by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuPolicy {
    pub groups: Vec<MenuGroup>,
}

impl MenuPolicy {
    pub fn new(groups: Vec<MenuGroup>) -> Self {
        Self { groups }
    }

    /// route_map
    ///
    /// Flattens every group/item pair (recursing through children) into a map
    /// from exact path to its permitted-roles set. A path that never appears
    /// here is treated as unrestricted by the evaluator. Fail-open for
    /// unregistered routes is an explicit design choice, since routes outside
    /// the menu system (the forbidden screen itself, for one) must stay
    /// reachable.
    pub fn route_map(&self) -> HashMap<String, Option<Vec<Role>>> {
        let mut map = HashMap::new();
        for group in &self.groups {
            for item in &group.items {
                collect_routes(item, &mut map);
            }
        }
        map
    }

}

fn collect_routes(item: &MenuItem, map: &mut HashMap<String, Option<Vec<Role>>>) {
    map.insert(item.path.clone(), item.roles.clone());
    if let Some(children) = &item.children {
        for child in children {
            collect_routes(child, map);
        }
    }
}

/// default_policy
///
/// The console's navigation tree. Every permitted-roles set includes
/// `Role::Admin`; the dashboard itself carries no role gate (any authenticated
/// user lands there).
pub fn default_policy() -> MenuPolicy {
    use Role::{Admin, Finance, Logistics, Management, Sales};

    MenuPolicy::new(vec![
        MenuGroup::new(
            "principal",
            "Principal",
            vec![MenuItem::new(
                "dashboard",
                "Panel",
                DASHBOARD_PATH,
                "home",
            )],
        ),
        MenuGroup::new(
            "operaciones",
            "Operaciones",
            vec![
                MenuItem::new("caja", "Caja", "/caja", "cash-register")
                    .permit(&[Management, Finance, Admin]),
                MenuItem::new("compras", "Compras", "/compras", "truck")
                    .permit(&[Logistics, Management, Admin]),
                MenuItem::new("ventas", "Ventas", "/ventas", "receipt")
                    .permit(&[Sales, Management, Admin]),
            ],
        ),
        MenuGroup::new(
            "catalogo",
            "Catálogo",
            vec![
                MenuItem::new("categorias", "Categorías", "/categorias", "tags")
                    .permit(&[Logistics, Management, Admin]),
                MenuItem::new("productos", "Productos", "/productos", "box")
                    .permit(&[Logistics, Sales, Management, Admin]),
            ],
        ),
        MenuGroup::new(
            "contabilidad",
            "Contabilidad",
            vec![
                MenuItem::new(
                    "libro-diario",
                    "Libro diario",
                    "/contabilidad/diario",
                    "book-open",
                )
                .permit(&[Finance, Admin]),
                MenuItem::new(
                    "libro-mayor",
                    "Libro mayor",
                    "/contabilidad/mayor",
                    "book",
                )
                .permit(&[Finance, Admin]),
            ],
        )
        .permit(&[Finance, Management, Admin]),
        MenuGroup::new(
            "configuracion",
            "Configuración",
            vec![
                MenuItem::new(
                    "usuarios",
                    "Usuarios",
                    "/configuracion/usuarios",
                    "users",
                )
                .permit(&[Admin]),
                MenuItem::new("roles", "Roles", "/configuracion/roles", "shield")
                    .permit(&[Admin]),
            ],
        )
        .permit(&[Admin]),
    ])
}
