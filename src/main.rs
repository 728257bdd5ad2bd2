use learnhub_backend::config::{get_config, init_config};
use learnhub_backend::database::pool::create_pool;
use learnhub_backend::models::catalog::Catalog;
use learnhub_backend::routes::build_router;
use learnhub_backend::AppState;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "learnhub_backend=debug,tower_http=debug".into()),
        )
        .init();

    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected, migrations applied");

    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    tracing::info!(
        "Course catalog loaded: {} programs, {} courses",
        catalog.programs.len(),
        catalog.all_courses().len()
    );

    let state = AppState::new(pool, catalog, config)?;

    // Session sweeper: one pass per second drives every in-progress countdown
    // and force-submits attempts whose time ran out.
    let sweeper = state.session_service.clone();
    let retention_secs = config.session_retention_secs;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            sweeper.tick_once(retention_secs).await;
        }
    });

    let app = build_router(state, config.public_rps)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server_address).await?;
    tracing::info!("Listening on {}", config.server_address);
    axum::serve(listener, app).await?;

    Ok(())
}
