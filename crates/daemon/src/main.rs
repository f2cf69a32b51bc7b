// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ctxd` — the context broker daemon.

use ctx_daemon::{serve, Config, Daemon, LifecycleError};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctxd=info,ctx_daemon=info".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "fatal");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::from_env();
    let daemon = Daemon::bootstrap(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(
        addr = %config.bind,
        db = %config.db_path.display(),
        "context broker listening"
    );

    let ctx = Arc::clone(&daemon.ctx);
    serve(listener, ctx, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await?;

    // Drain embed jobs, then the write queue, before exiting.
    daemon.shutdown().await;
    info!("context broker stopped");
    Ok(())
}
