//! `pokeproxy run`: start the proxy server.
//!
//! Resolves the upstream settings once (config file, then CLI / env
//! overrides), builds the shared HTTP client and forwarder, and serves
//! until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::sources::create_file_source;
use crate::config::{self, ConfigSource};
use crate::error::ProxyError;
use crate::logging;
use crate::proxy::forwarder::Forwarder;
use crate::server::{self, AppState};

const CONFIG_CANDIDATES: &[&str] = &[
    "pokeproxy.yaml",
    "pokeproxy.yml",
    "pokeproxy.json",
    "pokeproxy.toml",
];

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = resolve_file_source(args.config.as_deref()).await?;
    let settings = config::resolve(source.as_deref(), &args.overrides()).await?;

    let state = Arc::new(AppState {
        forwarder: Forwarder::new(server::build_http_client(), &settings),
    });

    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %settings.base_url,
        timeout_ms = settings.timeout_ms(),
        "pokeproxy started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("pokeproxy stopped");
    Ok(())
}

async fn resolve_file_source(
    explicit: Option<&Path>,
) -> Result<Option<Box<dyn ConfigSource>>, ProxyError> {
    if let Some(path) = explicit {
        return create_file_source(path).map(Some);
    }

    for name in CONFIG_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path).map(Some);
        }
    }

    Ok(None)
}
