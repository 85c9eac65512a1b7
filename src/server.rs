//! Router assembly and server lifecycle

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cli::Config;
use crate::error::ServerError;
use crate::routes::{
    battle_handler, github_user_handler, leetcode_battle_handler, leetcode_roast_handler,
    profile_image_handler, roast_handler, root_handler, wake_handler,
};
use crate::state::AppState;

/// Builds the CORS policy for the configured origins
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Builds the application router
pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/wake", get(wake_handler))
        .route("/api/roast", post(roast_handler))
        .route("/api/battle", post(battle_handler))
        .route("/api/leetcode-roast", post(leetcode_roast_handler))
        .route("/api/leetcode-battle", post(leetcode_battle_handler))
        .route("/github/profile-image/{username}", get(profile_image_handler))
        .route("/github/user/{username}", get(github_user_handler))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the server and runs until Ctrl+C or SIGTERM
pub async fn run(config: Config) -> Result<(), ServerError> {
    info!("Initializing state...");
    let state = AppState::from_config(&config)?;
    info!(
        ttl_ms = config.cache_ttl_ms,
        model = %config.gemini_model,
        "Profile caches ready"
    );

    let app = router(state, &config.allowed_origins);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
