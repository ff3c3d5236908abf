use inspection_backend::{
    config::Settings,
    database,
    middleware::init_logging,
    AppState, build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before settings so env overrides are visible
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    settings.validate()?;

    init_logging(&settings.log_level, &settings.log_format)
        .map_err(|err| anyhow::anyhow!("logging setup failed: {err}"))?;

    let pool = database::create_pool(&settings.database_url, settings.database_max_connections)
        .await?;
    database::run_migrations(&pool).await?;

    tokio::fs::create_dir_all(settings.captures_dir()).await?;
    tokio::fs::create_dir_all(settings.reports_dir()).await?;

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(settings, pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "inspection backend listening");

    // ConnectInfo gives the rate limiter a peer address when no proxy
    // headers are present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
