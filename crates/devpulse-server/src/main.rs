mod api;
mod ingest;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(devpulse_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = devpulse_db::PoolConfig::from_app_config(&config);
    let pool = devpulse_db::connect_pool(&config.database_url, pool_config).await?;
    devpulse_db::run_migrations(&pool).await?;

    let github = Arc::new(devpulse_sources::GithubClient::new(
        &config.github_username,
        &config.github_token,
        config.source_timeout_secs,
    )?);
    let leetcode = Arc::new(devpulse_sources::LeetCodeClient::new(
        &config.leetcode_username,
        config.source_timeout_secs,
    )?);

    let state = AppState {
        pool: pool.clone(),
        github: Arc::clone(&github),
        leetcode: Arc::clone(&leetcode),
    };

    let _scheduler = scheduler::build_scheduler(pool, github, leetcode).await?;

    let auth = AuthState::from_env(matches!(
        config.env,
        devpulse_core::Environment::Development
    ))?;
    let app = build_app(state, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
