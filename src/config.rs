use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// AppConfig
///
/// Holds the console's entire configuration state. This struct is designed to
/// be immutable once loaded, ensuring consistency across everything it is
/// handed to (identity client, session store, hydrator).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the remote REST API, including the identity endpoints.
    pub api_base_url: String,
    // Optional api-key header sent alongside every request.
    pub api_key: Option<String>,
    // Runtime environment marker. Controls logging format and whether the
    // trusted session cache flag is honored at all.
    pub env: Env,
    // Where the file-backed session store persists its JSON document.
    pub session_file: PathBuf,
    // Upper bound on the identity-verification call. A hung endpoint resolves
    // the hydration cycle to an error state instead of hanging it forever.
    pub identity_timeout: Duration,
    // Trusted-environment fast path: adopt the cached profile on hydration
    // without a network round-trip. Only ever true in Env::Local, and only
    // via the explicit TRUSTED_SESSION_CACHE flag.
    pub trusted_session_cache: bool,
}

/// Env
///
/// Defines the runtime context, used to switch between development
/// conveniences (pretty logs, trusted cache) and production behavior
/// (JSON logs, mandatory remote verification).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            api_key: None,
            env: Env::Local,
            session_file: PathBuf::from(".erp-session.json"),
            identity_timeout: Duration::from_secs(10),
            trusted_session_cache: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing configuration at startup. Reads
    /// all parameters from environment variables and fails fast on anything a
    /// production run cannot do without.
    ///
    /// # Panics
    /// Panics if `API_BASE_URL` is missing in production. Starting without an
    /// API to talk to is not a state worth recovering into.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            _ => env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
        };

        let identity_timeout = env::var("IDENTITY_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        // The trusted fast path must be asked for explicitly AND the runtime
        // must be local. A production build that sets the flag gets a warning
        // and remote verification anyway.
        let flag_requested = env::var("TRUSTED_SESSION_CACHE")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);
        let trusted_session_cache = match env {
            Env::Local => {
                if flag_requested {
                    tracing::warn!(
                        "TRUSTED_SESSION_CACHE enabled: cached profiles will be adopted \
                         WITHOUT remote verification"
                    );
                }
                flag_requested
            }
            Env::Production => {
                if flag_requested {
                    tracing::warn!("TRUSTED_SESSION_CACHE ignored in production");
                }
                false
            }
        };

        Self {
            api_base_url,
            api_key: env::var("API_KEY").ok(),
            env,
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".erp-session.json")),
            identity_timeout,
            trusted_session_cache,
        }
    }
}
