//! Client side of the query protocol.

use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::error::{ServerError, ServerResult};

/// Send `pattern` to the server at `socket_path` and collect the matches.
pub async fn query(socket_path: &Path, pattern: &str) -> ServerResult<Vec<String>> {
    if pattern.contains('\n') {
        return Err(ServerError::InvalidPattern);
    }

    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|source| ServerError::Connect {
            path: socket_path.to_path_buf(),
            source,
        })?;
    let (read_half, mut write_half) = stream.into_split();

    let mut request = Vec::with_capacity(pattern.len() + 1);
    request.extend_from_slice(pattern.as_bytes());
    request.push(b'\n');
    write_half
        .write_all(&request)
        .await
        .map_err(ServerError::Write)?;

    let mut lines = BufReader::new(read_half).lines();
    let mut matches = Vec::new();
    while let Some(line) = lines.next_line().await.map_err(ServerError::Read)? {
        matches.push(line);
    }

    Ok(matches)
}
