use taskboard_api::app::{build_router, build_state};
use taskboard_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    taskboard_observability::init();

    let config = ApiConfig::from_env();
    let state = build_state(&config).await?;
    let db = state.db.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    if let Some(db) = db {
        db.close().await;
    }

    Ok(())
}
