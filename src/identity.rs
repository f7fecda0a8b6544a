use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{LoginRequest, LoginResponse, UserProfile};

/// IdentityError
///
/// Failure taxonomy for the remote identity provider, mirroring the distinct
/// treatments the hydrator applies: a rejected token is a security event
/// (store cleared), while transport and server failures only surface as an
/// error state.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Login rejected the supplied credentials. Propagated to the login form;
    /// never becomes global state.
    #[error("credenciales rechazadas por el servidor")]
    BadCredentials,
    /// The identity endpoint explicitly rejected the access token. The token
    /// is known-invalid and caching it further is actively harmful.
    #[error("sesión rechazada por el servidor")]
    Unauthorized,
    /// A non-auth server error from the identity endpoint.
    #[error("el servidor de identidad respondió con estado {0}")]
    Status(u16),
    /// Network-level failure reaching the endpoint.
    #[error("no se pudo contactar al servidor de identidad: {0}")]
    Transport(String),
}

// 1. IdentityProvider Contract

/// IdentityProvider
///
/// Abstract contract for the external identity endpoints. The concrete
/// implementation is the HTTP client below; tests substitute scripted mocks
/// without touching the hydrator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges credentials for a session at `POST /auth/login`.
    async fn login(&self, username: &str, password: &str)
    -> Result<LoginResponse, IdentityError>;

    /// Resolves the current identity at `GET /auth/me` with the stored bearer
    /// token.
    ///
    /// `Ok(None)` is the "no identity" outcome: the call succeeded transport-
    /// wise but yielded no usable profile (empty body, explicit null, or a
    /// malformed payload). It is deliberately distinct from `Err(_)` so the
    /// hydrator can treat it leniently as an absent session.
    async fn me(&self, token: &str) -> Result<Option<UserProfile>, IdentityError>;
}

/// The shared handle the hydrator holds.
pub type IdentityState = Arc<dyn IdentityProvider>;

// 2. The HTTP Implementation

/// HttpIdentityProvider
///
/// reqwest-backed client for the remote identity provider. The base URL and
/// the optional api-key header come from `AppConfig`; the bearer token is
/// supplied per call and never stored here.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_api_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("apikey", key),
            None => req,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    /// login
    ///
    /// Any 4xx from the login endpoint maps to `BadCredentials`: the form
    /// layer owns the presentation of the failure. A success body that does
    /// not parse is a server fault, reported as `Status`.
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, IdentityError> {
        let payload = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .apply_api_key(self.client.post(self.endpoint("/auth/login")))
            .json(&payload)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(IdentityError::BadCredentials);
        }
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|_| IdentityError::Status(status.as_u16()))
    }

    /// me
    ///
    /// 401/403 map to `Unauthorized` (the security event); other non-2xx map
    /// to `Status`. A 2xx whose body is empty, null, or unparseable resolves
    /// to `Ok(None)`, never to an error.
    async fn me(&self, token: &str) -> Result<Option<UserProfile>, IdentityError> {
        let response = self
            .apply_api_key(self.client.get(self.endpoint("/auth/me")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IdentityError::Unauthorized);
        }
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        match serde_json::from_str::<UserProfile>(&body) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                // Tolerated by contract: an empty or malformed payload means
                // "no identity", not a failure.
                tracing::debug!(error = %e, "identity payload did not yield a profile");
                Ok(None)
            }
        }
    }
}
