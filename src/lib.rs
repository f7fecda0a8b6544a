// --- Module Structure ---

// Static policy: known roles and the declarative navigation tree.
pub mod menu;
pub mod roles;

// Pure access evaluation over the policy.
pub mod access;

// Session persistence and the remote identity collaborator.
pub mod identity;
pub mod models;
pub mod session;

// The session-hydration state machine and the gating wrapper around screens.
pub mod guard;
pub mod hydrator;

// Authenticated backend access with the uniform unauthorized contract.
pub mod api;

pub mod config;

// --- Public Re-exports ---

// Makes the core types easily accessible to the shell entry point (main.rs)
// and to embedding presentation layers.
pub use access::{AccessPolicy, has_access};
pub use api::{ApiClient, ApiError};
pub use config::{AppConfig, Env};
pub use guard::{GuardDecision, RouteGuard};
pub use hydrator::{AuthSnapshot, AuthState, Navigator, NavigatorState, RecordingNavigator,
    SessionHydrator};
pub use identity::{HttpIdentityProvider, IdentityError, IdentityProvider, IdentityState};
pub use menu::{DASHBOARD_PATH, FORBIDDEN_PATH, LOGIN_PATH, MenuGroup, MenuItem, MenuPolicy,
    default_policy};
pub use models::{LoginRequest, LoginResponse, Session, UserProfile};
pub use roles::{Role, RoleEntry, RoleRegistry};
pub use session::{FileStore, KeyValueState, KeyValueStore, MemoryStore, SessionStore};
