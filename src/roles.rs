use serde::{Deserialize, Serialize};

/// Role
///
/// The enumerated identity labels known to the console. A user's role determines
/// which menu groups, routes, and page contents are visible to them. Roles are
/// immutable and defined once at process start; everything downstream (menu
/// policy, evaluator, guard) receives them by value.
///
/// The string form is the stable identifier used on the wire and in the session
/// cache. Parsing is exact-match: no case folding, no aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access. Present in every permitted-roles set in the default policy.
    Admin,
    /// Branch/general management tier.
    Management,
    /// Accounting and cash oversight.
    Finance,
    /// Warehouse, purchasing, and catalog maintenance.
    Logistics,
    /// Point-of-sale operators.
    Sales,
    /// Generic authenticated employee tier.
    Employee,
    /// Read-only tier.
    Viewer,
}

impl Role {
    /// The stable string identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Management => "management",
            Role::Finance => "finance",
            Role::Logistics => "logistics",
            Role::Sales => "sales",
            Role::Employee => "employee",
            Role::Viewer => "viewer",
        }
    }

    /// parse
    ///
    /// Exact-string-match resolution of a role identifier (e.g. the `role` field
    /// of a remote user profile). Unknown strings yield `None`; an unresolvable
    /// role always fails any gated access check downstream.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "management" => Some(Role::Management),
            "finance" => Some(Role::Finance),
            "logistics" => Some(Role::Logistics),
            "sales" => Some(Role::Sales),
            "employee" => Some(Role::Employee),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RoleEntry
///
/// One registry row: the role, its human-readable label, and its numeric
/// privilege rank. The rank participates only in "at-least" comparisons
/// (`AccessPolicy::has_role_or_higher`); it never implies set membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleEntry {
    pub role: Role,
    pub label: String,
    pub rank: u8,
}

/// RoleRegistry
///
/// The explicitly constructed, immutable table of known roles. Built once at
/// startup and passed by reference into the evaluator rather than relied upon
/// as ambient module-level state, so tests can swap in alternate registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRegistry {
    entries: Vec<RoleEntry>,
}

impl RoleRegistry {
    pub fn new(entries: Vec<RoleEntry>) -> Self {
        Self { entries }
    }

    /// The registry shipped with the console: every `Role` variant with its
    /// display label and rank. Ranks are strictly ordered; only the at-least
    /// comparison consults them.
    pub fn standard() -> Self {
        let entry = |role: Role, label: &str, rank: u8| RoleEntry {
            role,
            label: label.to_string(),
            rank,
        };
        Self::new(vec![
            entry(Role::Admin, "Administrador", 100),
            entry(Role::Management, "Gerencia", 80),
            entry(Role::Finance, "Finanzas", 70),
            entry(Role::Logistics, "Logística", 60),
            entry(Role::Sales, "Ventas", 50),
            entry(Role::Employee, "Empleado", 20),
            entry(Role::Viewer, "Consulta", 10),
        ])
    }

    /// rank_of
    ///
    /// Looks up the privilege rank for a role. `None` signals the role is not
    /// part of this registry (possible with custom registries); callers must
    /// treat a missing rank as a failed comparison, never as rank zero passing.
    pub fn rank_of(&self, role: Role) -> Option<u8> {
        self.entries.iter().find(|e| e.role == role).map(|e| e.rank)
    }

    /// label_of
    ///
    /// The display label for a role, if registered.
    pub fn label_of(&self, role: Role) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.role == role)
            .map(|e| e.label.as_str())
    }

    pub fn entries(&self) -> &[RoleEntry] {
        &self.entries
    }
}
