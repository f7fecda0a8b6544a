use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use erp_console::{HttpIdentityProvider, IdentityError, IdentityProvider};
use serde_json::{Value, json};
use uuid::Uuid;

// --- Loopback Identity Endpoint ---

const VALID_TOKEN: &str = "token-valido";
const EXPIRED_TOKEN: &str = "token-caducado";
const NULL_TOKEN: &str = "token-nulo";
const GARBAGE_TOKEN: &str = "token-roto";
const ERROR_TOKEN: &str = "token-error";

fn wire_profile() -> Value {
    json!({
        "id": Uuid::from_u128(7).to_string(),
        "username": "mrivas",
        "firstName": "Marta",
        "lastName": "Rivas",
        "role": "finance",
    })
}

async fn login_handler(Json(payload): Json<Value>) -> impl IntoResponse {
    if payload["password"] == "secreta" {
        Json(json!({
            "user": wire_profile(),
            "accessToken": "token-valido",
            "refreshToken": "refresh-valido",
        }))
        .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn me_handler(headers: HeaderMap) -> impl IntoResponse {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    match bearer {
        VALID_TOKEN => Json(wire_profile()).into_response(),
        EXPIRED_TOKEN => StatusCode::UNAUTHORIZED.into_response(),
        // Well-formed responses carrying no usable identity.
        NULL_TOKEN => "null".into_response(),
        GARBAGE_TOKEN => "##garbled##".into_response(),
        ERROR_TOKEN => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::FORBIDDEN.into_response(),
    }
}

/// Serves the identity routes on an ephemeral loopback port and returns the
/// base URL.
async fn spawn_identity_endpoint() -> String {
    let app = Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/me", get(me_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

// --- Login ---

#[tokio::test]
async fn login_success_parses_the_camel_case_wire_format() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    let response = provider.login("mrivas", "secreta").await.expect("login");

    assert_eq!(response.access_token, "token-valido");
    assert_eq!(response.refresh_token.as_deref(), Some("refresh-valido"));
    assert_eq!(response.user.username, "mrivas");
    assert_eq!(response.user.first_name, "Marta");
    assert_eq!(response.user.role, "finance");
}

#[tokio::test]
async fn rejected_credentials_map_to_bad_credentials() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    let result = provider.login("mrivas", "incorrecta").await;
    assert!(matches!(result, Err(IdentityError::BadCredentials)));
}

// --- Me ---

#[tokio::test]
async fn valid_token_yields_a_profile() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    let profile = provider
        .me(VALID_TOKEN)
        .await
        .expect("call")
        .expect("profile");
    assert_eq!(profile.username, "mrivas");
    assert_eq!(profile.last_name, "Rivas");
}

#[tokio::test]
async fn rejected_token_maps_to_unauthorized() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    assert!(matches!(
        provider.me(EXPIRED_TOKEN).await,
        Err(IdentityError::Unauthorized)
    ));
    // Forbidden is the same security event.
    assert!(matches!(
        provider.me("cualquier-otro").await,
        Err(IdentityError::Unauthorized)
    ));
}

#[tokio::test]
async fn null_or_garbled_body_is_no_identity_not_an_error() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    assert_eq!(provider.me(NULL_TOKEN).await.expect("call"), None);
    assert_eq!(provider.me(GARBAGE_TOKEN).await.expect("call"), None);
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let base = spawn_identity_endpoint().await;
    let provider = HttpIdentityProvider::new(&base, None);

    assert!(matches!(
        provider.me(ERROR_TOKEN).await,
        Err(IdentityError::Status(500))
    ));
}

#[tokio::test]
async fn unreachable_endpoint_maps_to_transport() {
    // Nothing listens here.
    let provider = HttpIdentityProvider::new("http://127.0.0.1:1", None);

    assert!(matches!(
        provider.me(VALID_TOKEN).await,
        Err(IdentityError::Transport(_))
    ));
    assert!(matches!(
        provider.login("mrivas", "secreta").await,
        Err(IdentityError::Transport(_))
    ));
}

// --- API Key Header ---

#[tokio::test]
async fn api_key_header_is_attached_when_configured() {
    async fn key_checking_handler(headers: HeaderMap) -> impl IntoResponse {
        if headers.get("apikey").and_then(|v| v.to_str().ok()) == Some("clave-123") {
            Json(wire_profile()).into_response()
        } else {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }

    let app = Router::new().route("/auth/me", get(key_checking_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    let provider = HttpIdentityProvider::new(&format!("http://{addr}"), Some("clave-123"));
    assert!(provider.me(VALID_TOKEN).await.expect("call").is_some());
}
