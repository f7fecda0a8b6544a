use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::hydrator::SessionHydrator;

/// ApiError
///
/// Failure taxonomy for authenticated API calls made by page content.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session is available to authenticate the request with.
    #[error("no hay una sesión activa")]
    NoSession,
    /// The backend rejected the session. The cross-cutting contract has
    /// already fired: store cleared, navigation to login requested.
    #[error("la sesión fue rechazada por el servidor")]
    Unauthorized,
    #[error("el servidor respondió con estado {0}")]
    Status(u16),
    #[error("fallo de red: {0}")]
    Transport(String),
    #[error("respuesta ilegible del servidor: {0}")]
    Decode(String),
}

/// ApiClient
///
/// The one way page content talks to the backend: attaches the bearer token
/// and api key to every request, and applies the uniform unauthorized
/// contract. Any 401 from any endpoint clears the session and forces
/// navigation to the login screen via the hydrator; call sites never handle
/// that case individually.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    hydrator: Arc<SessionHydrator>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>, hydrator: Arc<SessionHydrator>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(|k| k.to_string()),
            hydrator,
        }
    }

    /// get_json
    ///
    /// Authenticated GET, decoding the JSON response body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.get(self.endpoint(path));
        self.execute(request).await
    }

    /// post_json
    ///
    /// Authenticated POST with a JSON body, decoding the JSON response body.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.client.post(self.endpoint(path)).json(body);
        self.execute(request).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let token = self
            .hydrator
            .store()
            .token()
            .ok_or(ApiError::NoSession)?;

        let mut request = request.bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Uniform across all call sites, not per endpoint.
            self.hydrator.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}
