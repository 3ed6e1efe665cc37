use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::info;

use shopster::{
    adapters::http::app_state::AppState,
    infra::{
        app::create_app,
        setup::{init_app_state, init_tracing},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let app_state = init_app_state().await?;

    // Read bind address from config before moving app_state
    let bind_addr = app_state.config.bind_addr;

    spawn_session_sweep(app_state.clone());

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Shopster listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn spawn_session_sweep(app_state: AppState) {
    let sweep_every = app_state.config.session_sweep_seconds.max(1);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_every));
        loop {
            interval.tick().await;
            match app_state.auth_use_cases.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired sessions removed"),
                Err(err) => tracing::error!(error = ?err, "session sweep failed"),
            }
        }
    });
}
