use std::sync::Arc;

use erp_console::{
    AccessPolicy, AppConfig, DASHBOARD_PATH, Env, HttpIdentityProvider, IdentityState,
    NavigatorState, RecordingNavigator, SessionHydrator, SessionStore,
    session::{FileStore, KeyValueState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The shell entry point: initializes configuration, logging, the session
/// store, the identity client, and the access policy, then runs one hydration
/// cycle for the landing screen and reports what the resolved user may see.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "erp_console=debug".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for human readability while iterating.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Console core starting in {:?} mode", config.env);

    // 4. Session Store (file-backed, the desktop shell's origin storage)
    let kv: KeyValueState = Arc::new(FileStore::open(&config.session_file));
    let store = SessionStore::new(kv);

    // 5. Identity Client & Access Policy
    let identity: IdentityState = Arc::new(HttpIdentityProvider::new(
        &config.api_base_url,
        config.api_key.as_deref(),
    ));
    let policy = Arc::new(AccessPolicy::standard());

    // 6. Hydrator Assembly
    // The recording navigator queues redirect requests for the shell to act on.
    let navigator = Arc::new(RecordingNavigator::new());
    let navigator_state: NavigatorState = navigator.clone();
    let hydrator = SessionHydrator::new(store, identity, policy.clone(), navigator_state, &config);

    // 7. One Hydration Cycle for the Landing Screen
    hydrator.hydrate(DASHBOARD_PATH).await;

    let snapshot = hydrator.snapshot();
    tracing::info!(state = ?snapshot.state, "hydration resolved");

    for target in navigator.drain() {
        tracing::info!(target, "redirect requested");
    }

    if let Some(user) = &snapshot.user {
        tracing::info!(username = %user.username, role = %user.role, "session active");
        let visible = policy.filter_menu_groups(snapshot.resolved_role());
        for group in &visible {
            let items: Vec<&str> = group.items.iter().map(|i| i.path.as_str()).collect();
            tracing::info!(group = %group.label, ?items, "visible navigation");
        }
    }
}
