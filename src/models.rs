use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::Role;

// --- Identity Provider Wire Shapes ---

/// UserProfile
///
/// The remote identity provider's user record, cached locally alongside the
/// access token. Field names are camelCase on the wire.
///
/// `role` stays a plain string here: the profile is external input, and an
/// unknown role must deserialize cleanly and then fail access checks, not fail
/// parsing. `resolved_role()` is the one place the string becomes a `Role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl UserProfile {
    /// Exact-match resolution of the profile's role string against the known
    /// roles. `None` means the role is unresolvable and every gated check must
    /// deny.
    pub fn resolved_role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// LoginRequest
///
/// Credentials payload for `POST /auth/login`. The password passes through to
/// the identity provider and is never persisted or logged by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse
///
/// Successful login payload: the user profile plus the bearer tokens. The
/// access token is opaque to this crate and never decoded locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

// --- Local Session State ---

/// Session
///
/// The authenticated principal's locally persisted state: access token,
/// optional refresh token, and the cached profile. Token and profile are
/// written and cleared together; the store never yields a session with one but
/// not the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub refresh_token: Option<String>,
    pub user: UserProfile,
}
