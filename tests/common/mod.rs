//! Local HTTP mirrors for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use md5::{Digest, Md5};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const VERSION: &str = "20240101";

/// A running mirror and the number of requests it has answered.
pub struct Mirror {
    pub base: String,
    hits: Arc<AtomicUsize>,
}

impl Mirror {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct Files {
    files: Arc<HashMap<String, Vec<u8>>>,
    hits: Arc<AtomicUsize>,
}

async fn serve_file(
    State(state): State<Files>,
    Path(path): Path<String>,
) -> Result<Vec<u8>, StatusCode> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.files.get(&path).cloned().ok_or(StatusCode::NOT_FOUND)
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Serves `files`, keyed by path without the leading slash.
pub async fn healthy_mirror(files: HashMap<String, Vec<u8>>) -> Mirror {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Files {
        files: Arc::new(files),
        hits: Arc::clone(&hits),
    };
    let router = Router::new()
        .route("/{*path}", get(serve_file))
        .with_state(state);
    Mirror {
        base: spawn(router).await,
        hits,
    }
}

/// Answers every request with 503.
pub async fn broken_mirror() -> Mirror {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::SERVICE_UNAVAILABLE
        }
    });
    Mirror {
        base: spawn(router).await,
        hits,
    }
}

/// Accepts every request, sends headers and a few body bytes, then stalls.
pub async fn stalled_mirror() -> Mirror {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\nabc")
                    .await;
                tokio::time::sleep(Duration::from_secs(300)).await;
            });
        }
    });
    Mirror {
        base: format!("http://{addr}"),
        hits,
    }
}

pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Shard contents keyed by filename.
pub fn shards(n: usize) -> Vec<(String, Vec<u8>)> {
    (1..=n)
        .map(|i| {
            let name = format!("enwiki-{VERSION}-pages-meta-history{i}.xml.7z");
            let body = format!("shard {i} ").repeat(1000 + i).into_bytes();
            (name, body)
        })
        .collect()
}

pub fn remote_path(name: &str) -> String {
    format!("enwiki/{VERSION}/{name}")
}

/// Mirror file map for `shards`, optionally including the manifest itself.
pub fn mirror_files(shards: &[(String, Vec<u8>)], with_manifest: bool) -> HashMap<String, Vec<u8>> {
    let mut files: HashMap<_, _> = shards
        .iter()
        .map(|(name, body)| (remote_path(name), body.clone()))
        .collect();
    if with_manifest {
        files.insert(
            format!("enwiki/{VERSION}/dumpstatus.json"),
            manifest_json(shards).into_bytes(),
        );
    }
    files
}

/// `dumpstatus.json` describing `shards` as a finished 7z job.
pub fn manifest_json(shards: &[(String, Vec<u8>)]) -> String {
    let files: serde_json::Map<String, serde_json::Value> = shards
        .iter()
        .map(|(name, body)| {
            (
                name.clone(),
                serde_json::json!({
                    "url": format!("/{}", remote_path(name)),
                    "md5": md5_hex(body),
                    "size": body.len(),
                }),
            )
        })
        .collect();
    serde_json::json!({
        "jobs": {
            "metahistory7zdump": {"status": "done", "files": files},
            "metahistorybz2dump": {"status": "done", "files": {}}
        },
        "version": "0.8"
    })
    .to_string()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
