//! Serve command - watch the tree and answer queries until interrupted.

use std::path::PathBuf;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::monitor;
use crate::server::QueryServer;
use crate::watcher::recommended_backend;

/// Arguments for the serve command.
pub struct ServeArgs {
    pub dir: Option<PathBuf>,
    pub socket: Option<PathBuf>,
}

/// Run the serve command.
///
/// Startup failures (root watch, socket bind) abort with an error. Once
/// running, Ctrl-C or the watcher stopping cancels both loops; the server
/// removes its socket file on the way out.
pub async fn run(args: ServeArgs, mut config: Settings) -> anyhow::Result<()> {
    // CLI flags take precedence over config
    if let Some(dir) = args.dir {
        config.root = dir;
    }
    if let Some(socket) = args.socket {
        config.socket_path = socket;
    }

    let root = std::fs::canonicalize(&config.root)
        .with_context(|| format!("cannot resolve root directory {}", config.root.display()))?;
    anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

    crate::log_event!("serve", "starting", "{}", root.display());

    let (backend, events) = recommended_backend(config.watcher.channel_capacity)
        .context("cannot initialize file watcher")?;

    // The walk is blocking filesystem work
    let walk = config.walk.clone();
    let walk_root = root.clone();
    let mutator = tokio::task::spawn_blocking(move || monitor::prepare(&walk_root, backend, &walk))
        .await
        .context("startup walk panicked")?
        .with_context(|| format!("cannot watch {}", root.display()))?;

    let server = QueryServer::bind(&config.socket_path, mutator.index().clone(), config.server.clone())
        .context("cannot start query server")?;

    let cancel = CancellationToken::new();
    let mut watcher_task = tokio::spawn(mutator.run(events, cancel.clone()));
    let server_task = tokio::spawn(server.run(cancel.clone()));

    let finished = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                tracing::warn!("[serve] failed to listen for ctrl-c: {e}");
            }
            crate::log_event!("serve", "shutting down");
            None
        }
        result = &mut watcher_task => Some(result),
    };

    cancel.cancel();
    if let Err(e) = server_task.await {
        tracing::error!("[serve] query server task failed: {e}");
    }

    let watcher_result = match finished {
        Some(result) => result,
        None => watcher_task.await,
    };

    watcher_result
        .context("file watcher task panicked")?
        .context("file watcher stopped")
}
