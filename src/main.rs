use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pricehound::{AppState, BrowserManager, ScrapeConfig, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pricehound=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Arc::new(ScrapeConfig::from_env());
    let browser = BrowserManager::new(config.user_agent.clone(), config.accept_language.clone());

    let app = build_app(AppState {
        browser: browser.clone(),
        config: Arc::clone(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Chrome keeps running if only the listener goes away, so shut it down
    // before surfacing any serve error.
    if let Err(e) = browser.shutdown().await {
        tracing::warn!(error = %e, "browser shutdown failed");
    }
    served?;
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
