use anyhow::{Context, Result};
use dotenv::dotenv;
use funkd::config::ServerConfig;
use funkd::handler::DefaultHandler;
use funkd::server::Server;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funkd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        doc_root = %config.doc_root.display(),
        template_dir = %config.template_dir.display(),
        upload_root = %config.upload_root.display(),
        "configuration loaded"
    );

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = Server::new(&config, DefaultHandler::new(&config));
    tokio::select! {
        res = server.run(listener) => {
            if let Err(e) = &res {
                tracing::error!("server stopped: {e:#}");
            }
            res
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
            Ok(())
        }
    }
}
