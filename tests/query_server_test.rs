//! End-to-end tests for the query socket.

use std::os::unix::fs::FileTypeExt;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use treefind::config::ServerConfig;
use treefind::index::PathIndex;
use treefind::server::{self, QueryServer, ServerError};

fn index_of(paths: &[&str]) -> treefind::SharedIndex {
    let index = PathIndex::shared();
    {
        let mut guard = index.write();
        for path in paths {
            guard.add(*path);
        }
    }
    index
}

#[tokio::test]
async fn test_query_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");
    let index = index_of(&["/a/foo", "/a/bar", "/a/foobar"]);

    let server = QueryServer::bind(&socket, index, ServerConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));

    assert_eq!(
        server::query(&socket, "foo").await.unwrap(),
        vec!["/a/foo", "/a/foobar"]
    );
    assert_eq!(
        server::query(&socket, "ba").await.unwrap(),
        vec!["/a/bar", "/a/foobar"]
    );
    assert_eq!(server::query(&socket, "").await.unwrap().len(), 3);
    assert!(server::query(&socket, "qqq").await.unwrap().is_empty());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_queries_see_later_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");
    let index = index_of(&["/a/foo"]);

    let server = QueryServer::bind(&socket, index.clone(), ServerConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));

    assert_eq!(server::query(&socket, "f").await.unwrap(), vec!["/a/foo"]);

    index.write().add("/a/fig");
    index.write().remove("/a/foo");

    assert_eq!(server::query(&socket, "f").await.unwrap(), vec!["/a/fig"]);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_concurrent_clients() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");
    let paths: Vec<String> = (0..200).map(|i| format!("/tree/file{i}")).collect();
    let index = PathIndex::shared();
    {
        let mut guard = index.write();
        for path in &paths {
            guard.add(path.as_str());
        }
    }

    let server = QueryServer::bind(&socket, index, ServerConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));

    let mut clients = Vec::new();
    for _ in 0..16 {
        let socket = socket.clone();
        clients.push(tokio::spawn(async move {
            server::query(&socket, "file").await.unwrap()
        }));
    }
    for client in clients {
        assert_eq!(client.await.unwrap(), paths);
    }

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_socket_removed_on_shutdown() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");

    let server = QueryServer::bind(&socket, PathIndex::shared(), ServerConfig::default()).unwrap();
    assert!(socket.exists());

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    assert!(!socket.exists());
}

#[tokio::test]
async fn test_stale_socket_is_replaced() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");

    // Leftover from a run that never cleaned up
    let stale = std::os::unix::net::UnixListener::bind(&socket).unwrap();
    drop(stale);
    assert!(std::fs::symlink_metadata(&socket).unwrap().file_type().is_socket());

    let server = QueryServer::bind(&socket, index_of(&["/x"]), ServerConfig::default()).unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(server.run(cancel.clone()));

    assert_eq!(server::query(&socket, "x").await.unwrap(), vec!["/x"]);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_bind_refuses_regular_file() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");
    std::fs::write(&socket, "important").unwrap();

    let result = QueryServer::bind(&socket, PathIndex::shared(), ServerConfig::default());
    assert!(matches!(result, Err(ServerError::NotASocket { .. })));
    assert_eq!(std::fs::read_to_string(&socket).unwrap(), "important");
}

#[tokio::test]
async fn test_bind_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("run/nested/query.sock");

    let server = QueryServer::bind(&socket, PathIndex::shared(), ServerConfig::default()).unwrap();
    assert_eq!(server.socket_path(), socket.as_path());
    assert!(socket.exists());
}

#[tokio::test]
async fn test_client_rejects_newline_in_pattern() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("query.sock");

    let result = server::query(&socket, "a\nb").await;
    assert!(matches!(result, Err(ServerError::InvalidPattern)));
}

#[tokio::test]
async fn test_client_reports_missing_server() {
    let temp_dir = TempDir::new().unwrap();
    let socket = temp_dir.path().join("absent.sock");

    let result = server::query(&socket, "a").await;
    assert!(matches!(result, Err(ServerError::Connect { .. })));
}
