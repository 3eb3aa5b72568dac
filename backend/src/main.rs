use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_backend::{config::Config, db::connection::create_pool, routes, state::AppState};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lms_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        port = config.port,
        jwt_secret = %mask_secret(&config.jwt_secret),
        access_token_minutes = config.access_token_minutes,
        refresh_token_hours = config.refresh_token_hours,
        cors_allow_origins = ?config.cors_allow_origins,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let state = AppState::new(pool, config.clone());
    let created = state
        .accounts
        .ensure_default_admin(
            &config.admin_name,
            &config.admin_username,
            &config.admin_password,
        )
        .await?;
    if created {
        tracing::info!(username = %config.admin_username, "Bootstrapped default admin");
    }

    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
