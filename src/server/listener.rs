use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{Instrument, info, info_span, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::ServerContext;

/// Validates the configuration, binds, and serves until the task is dropped.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let ctx = Arc::new(ServerContext::from_config(cfg)?);
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen_addr))?;

    info!(
        "Listening on {} serving {}",
        listener.local_addr()?,
        ctx.resolver.root().display()
    );

    serve(listener, ctx).await
}

/// Accepts connections forever, one task per connection.
pub async fn serve(listener: TcpListener, ctx: Arc<ServerContext>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let ctx = Arc::clone(&ctx);
        tokio::spawn(
            async move {
                let mut conn = Connection::new(socket, ctx);
                if let Err(e) = conn.run().await {
                    warn!("Connection error: {:#}", e);
                }
            }
            .instrument(info_span!("conn", %peer)),
        );
    }
}
