/// Axum webserver implementation
///
/// Main server lifecycle management including startup, shutdown, and
/// graceful termination
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::{
    arguments::get_port_override,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: once_cell::sync::Lazy<Arc<Notify>> =
    once_cell::sync::Lazy::new(|| Arc::new(Notify::new()));

/// Start the webserver
///
/// This function blocks until the server is shut down
pub async fn start_server(state: Arc<AppState>) -> Result<(), String> {
    let host = state.config.server.host.clone();
    let port = get_port_override().unwrap_or(state.config.server.port);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    let app = routes::create_router(Arc::clone(&state));

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        match e.kind() {
            std::io::ErrorKind::AddrInUse => {
                format!(
                    "Failed to bind to {}: Address already in use\n\
                     \n\
                     This usually means another instance of the platform is running.\n\
                     Stop it or pick a different port with --port.",
                    addr
                )
            }
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Failed to bind to {}: Permission denied\n\
                     \n\
                     Port {} requires elevated privileges on this system.\n\
                     Consider using a port above 1024.",
                    addr, port
                )
            }
            _ => format!("Failed to bind to {}: {}", addr, e),
        }
    })?;

    logger::info(
        LogTag::Webserver,
        &format!("🌐 Listening on http://{}", addr),
    );
    logger::info(
        LogTag::Webserver,
        &format!("📊 API endpoints available at http://{}/api", addr),
    );

    serve_with_shutdown(listener, app).await
}

/// Serve an already-bound listener until shutdown is signalled
pub async fn serve_with_shutdown(listener: TcpListener, app: Router) -> Result<(), String> {
    let shutdown_signal = async {
        SHUTDOWN_NOTIFY.notified().await;
        logger::debug(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::debug(LogTag::Webserver, "✅ Webserver stopped gracefully");
    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Triggering webserver shutdown...");
    SHUTDOWN_NOTIFY.notify_one();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webserver::state::test_state;

    /// Bind an ephemeral port and serve the API for the duration of a test
    async fn spawn_test_server() -> (SocketAddr, Arc<AppState>) {
        let state = test_state();
        let app = routes::create_router(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (addr, state)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (addr, _state) = spawn_test_server().await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/api/health", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let (addr, _state) = spawn_test_server().await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/api/account", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_register_login_and_authorized_call() {
        let (addr, _state) = spawn_test_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/api/auth/register", addr))
            .json(&serde_json::json!({
                "email": "alice@example.com",
                "username": "alice",
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let response = client
            .post(format!("http://{}/api/auth/login", addr))
            .json(&serde_json::json!({
                "identifier": "alice",
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let response = client
            .get(format!("http://{}/api/account", addr))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert_eq!(body["data"]["effective_tier"], "free");

        // Registration starts with one default portfolio
        let response = client
            .get(format!("http://{}/api/portfolios", addr))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (addr, _state) = spawn_test_server().await;
        let client = reqwest::Client::new();

        client
            .post(format!("http://{}/api/auth/register", addr))
            .json(&serde_json::json!({
                "email": "bob@example.com",
                "username": "bob",
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();

        let response = client
            .post(format!("http://{}/api/auth/login", addr))
            .json(&serde_json::json!({
                "identifier": "bob",
                "password": "wrong",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }

    #[tokio::test]
    async fn test_free_tier_portfolio_limit_enforced() {
        let (addr, _state) = spawn_test_server().await;
        let client = reqwest::Client::new();

        client
            .post(format!("http://{}/api/auth/register", addr))
            .json(&serde_json::json!({
                "email": "carol@example.com",
                "username": "carol",
                "password": "password123",
            }))
            .send()
            .await
            .unwrap();

        let response = client
            .post(format!("http://{}/api/auth/login", addr))
            .json(&serde_json::json!({ "identifier": "carol", "password": "password123" }))
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = response.json().await.unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();

        // Free tier allows one portfolio; registration already created it
        let response = client
            .post(format!("http://{}/api/portfolios", addr))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "name": "Second" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 429);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], "LIMIT_EXCEEDED");
    }
}
