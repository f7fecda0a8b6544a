use crate::access::{AccessPolicy, has_access};
use crate::hydrator::{AuthState, SessionHydrator};
use crate::menu::{FORBIDDEN_PATH, LOGIN_PATH};
use crate::roles::Role;

/// GuardDecision
///
/// What the presentation layer should render for a guarded screen right now.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// The hydrator has not resolved; show the placeholder and make no access
    /// decision.
    Loading,
    /// Authenticated and authorized: render the guarded content.
    Content,
    /// Render the configured fallback (default: nothing). Any redirect has
    /// already been requested through the navigator as a side effect.
    Fallback,
}

/// GuardRequirement
///
/// The two shapes a guard comes in, with identical contract semantics: an
/// explicit role list, or a path looked up against the derived route map.
#[derive(Debug, Clone)]
enum GuardRequirement {
    Roles(Vec<Role>),
    Path(String),
}

/// RouteGuard
///
/// A reusable gating wrapper around a screen. Stateless beyond its own
/// requirement: every `evaluate` call reads the hydrator's current snapshot,
/// so a change in authentication state or resolved role is picked up on the
/// next evaluation.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    requirement: GuardRequirement,
    /// Where an authenticated-but-unauthorized user is sent. Defaults to the
    /// forbidden screen.
    redirect_to: String,
}

impl RouteGuard {
    /// A guard keyed by an explicit permitted-roles list.
    pub fn for_roles(roles: &[Role]) -> Self {
        Self {
            requirement: GuardRequirement::Roles(roles.to_vec()),
            redirect_to: FORBIDDEN_PATH.to_string(),
        }
    }

    /// A guard keyed by a path, resolved through the route-to-roles map at
    /// evaluation time. Unregistered paths inherit the evaluator's fail-open
    /// rule.
    pub fn for_path(path: &str) -> Self {
        Self {
            requirement: GuardRequirement::Path(path.to_string()),
            redirect_to: FORBIDDEN_PATH.to_string(),
        }
    }

    /// Overrides the redirect target for an authorization failure.
    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect_to = target.to_string();
        self
    }

    /// evaluate
    ///
    /// The gating contract:
    /// - while the hydrator is loading, no access decision is made;
    /// - an unauthenticated or errored state requests a login redirect
    ///   (defensively; the hydrator normally already has) and hides content;
    /// - an authenticated user failing the evaluator check is sent to the
    ///   forbidden screen (or the configured alternate) and sees the fallback;
    /// - an authenticated, authorized user gets the content.
    pub fn evaluate(&self, hydrator: &SessionHydrator, policy: &AccessPolicy) -> GuardDecision {
        let snapshot = hydrator.snapshot();

        match snapshot.state {
            AuthState::Loading => GuardDecision::Loading,
            AuthState::NoAuth | AuthState::Error(_) => {
                hydrator.navigator().navigate(LOGIN_PATH);
                GuardDecision::Fallback
            }
            AuthState::Authenticated => {
                let role = snapshot.resolved_role();
                let allowed = match &self.requirement {
                    GuardRequirement::Roles(required) => has_access(role, Some(required.as_slice())),
                    GuardRequirement::Path(path) => policy.can_access_route(path, role),
                };
                if allowed {
                    GuardDecision::Content
                } else {
                    tracing::debug!(role = ?role, "guard denied access, redirecting");
                    hydrator.navigator().navigate(&self.redirect_to);
                    GuardDecision::Fallback
                }
            }
        }
    }
}
