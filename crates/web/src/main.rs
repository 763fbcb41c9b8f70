use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use taskboard_web::server::WebServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("TASKBOARD_WEB_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    // Optional on-disk SPA bundle; the embedded bundle is used when unset.
    let static_dir = std::env::var("TASKBOARD_WEB_STATIC_DIR")
        .ok()
        .and_then(|v| {
            let v = v.trim();
            if v.is_empty() {
                None
            } else {
                Some(PathBuf::from(v))
            }
        });

    let cfg = WebServerConfig { static_dir };

    info!("Starting Taskboard web UI on http://{}", addr);

    taskboard_web::server::serve(addr, cfg).await
}
