//! Query server over a Unix domain socket.
//!
//! One connection carries one query: the client sends a single
//! newline-terminated pattern, the server answers with every indexed path that
//! contains the pattern as an ordered subsequence, one per line, then closes.
//! There is no end-of-results marker besides EOF.
//!
//! The server only ever takes the index read lock, for the duration of a
//! single scan, and never across an await point.

mod client;
mod error;

pub use client::query;
pub use error::{ServerError, ServerResult};

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::index::SharedIndex;

/// Accepts query connections and answers them from the shared index.
pub struct QueryServer {
    listener: UnixListener,
    socket_path: PathBuf,
    index: SharedIndex,
    config: ServerConfig,
}

impl QueryServer {
    /// Bind the query socket.
    ///
    /// A stale socket left at `socket_path` by an earlier run is removed
    /// first; any other kind of file there is an error. Must be called from
    /// within a tokio runtime.
    pub fn bind(
        socket_path: &Path,
        index: SharedIndex,
        config: ServerConfig,
    ) -> ServerResult<Self> {
        remove_stale_socket(socket_path)?;

        if let Some(parent) = socket_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ServerError::Bind {
                    path: socket_path.to_path_buf(),
                    source,
                })?;
            }
        }

        let listener = UnixListener::bind(socket_path).map_err(|source| ServerError::Bind {
            path: socket_path.to_path_buf(),
            source,
        })?;

        crate::log_event!("server", "listening", "{}", socket_path.display());

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
            index,
            config,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections until `cancel` fires, then remove the socket file.
    ///
    /// Each connection is answered on its own task. A failed accept is logged
    /// and the loop keeps going.
    pub async fn run(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, _addr)) => {
                        let index = self.index.clone();
                        let config = self.config.clone();
                        tokio::spawn(async move {
                            match handle_connection(stream, &index, &config).await {
                                Ok(count) => {
                                    crate::debug_event!("server", "answered", "{count} matches");
                                }
                                Err(e) => {
                                    tracing::warn!("[server] connection error: {e}");
                                }
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!("[server] {}", ServerError::Accept(e));
                    }
                },

                _ = cancel.cancelled() => break,
            }
        }

        match std::fs::remove_file(&self.socket_path) {
            Ok(()) => crate::log_event!("server", "removed socket", "{}", self.socket_path.display()),
            Err(e) => tracing::warn!(
                "[server] failed to remove {}: {e}",
                self.socket_path.display()
            ),
        }
    }
}

/// Answer one query on `stream`. Returns the number of paths written.
///
/// A failed or timed-out read is logged and whatever bytes arrived are still
/// used as the pattern (usually the empty pattern, which matches
/// everything). A line longer than `max_query_bytes` is rejected without a
/// response.
pub async fn handle_connection(
    stream: UnixStream,
    index: &SharedIndex,
    config: &ServerConfig,
) -> ServerResult<usize> {
    let (read_half, write_half) = stream.into_split();

    let limit = config.max_query_bytes;
    // One byte past the limit tells an over-long line from one that fits
    let read_cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    let mut reader = BufReader::new(read_half).take(read_cap);
    let mut line = Vec::new();

    let read = with_timeout(config.read_timeout(), "read", async {
        reader.read_until(b'\n', &mut line).await.map_err(ServerError::Read)
    })
    .await;
    if let Err(e) = read {
        tracing::warn!("[server] {e}; answering with {} bytes received", line.len());
    }

    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.len() > limit {
        return Err(ServerError::QueryTooLong { limit });
    }

    let pattern = String::from_utf8_lossy(&line);
    let matches = index.read().search(&pattern);
    crate::debug_event!("server", "query", "{pattern:?} -> {} matches", matches.len());

    let mut writer = BufWriter::new(write_half);
    with_timeout(config.write_timeout(), "write", async {
        write_response(&mut writer, &matches)
            .await
            .map_err(ServerError::Write)
    })
    .await?;

    Ok(matches.len())
}

/// Run `fut` under an optional deadline.
async fn with_timeout<T>(
    limit: Option<Duration>,
    operation: &'static str,
    fut: impl Future<Output = ServerResult<T>>,
) -> ServerResult<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ServerError::Timeout { operation })?,
        None => fut.await,
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    matches: &[String],
) -> std::io::Result<()> {
    for path in matches {
        writer.write_all(path.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    writer.shutdown().await
}

fn remove_stale_socket(socket_path: &Path) -> ServerResult<()> {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(socket_path) {
        Ok(meta) if meta.file_type().is_socket() => {
            std::fs::remove_file(socket_path).map_err(|source| ServerError::Bind {
                path: socket_path.to_path_buf(),
                source,
            })?;
            crate::debug_event!("server", "removed stale socket", "{}", socket_path.display());
            Ok(())
        }
        Ok(_) => Err(ServerError::NotASocket {
            path: socket_path.to_path_buf(),
        }),
        Err(_) => Ok(()),
    }
}
