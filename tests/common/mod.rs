#![allow(dead_code)]

use apod_etl::db::ApodStorage;
use axum::{
    Router,
    extract::{RawQuery, State},
    http::{StatusCode, header},
    routing::get,
};
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

/// SQLite database file under the temp dir, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "apod-etl-{}-{}-{}.sqlite",
            tag,
            std::process::id(),
            nanos
        ));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    pub async fn storage(&self) -> ApodStorage {
        ApodStorage::connect(&self.url())
            .await
            .expect("failed to open sqlite database")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut p = self.path.clone().into_os_string();
            p.push(suffix);
            let _ = std::fs::remove_file(PathBuf::from(p));
        }
    }
}

/// Stand-in for the APOD endpoint serving a fixed status and body.
pub struct FakeApod {
    status: StatusCode,
    body: String,
    hits: AtomicUsize,
    last_api_key: Mutex<Option<String>>,
}

impl FakeApod {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.last_api_key.lock().expect("poisoned").clone()
    }
}

async fn apod_handler(
    State(state): State<Arc<FakeApod>>,
    RawQuery(query): RawQuery,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let key = query.and_then(|qs| {
        url::form_urlencoded::parse(qs.as_bytes())
            .find(|(k, _)| k == "api_key")
            .map(|(_, v)| v.into_owned())
    });
    *state.last_api_key.lock().expect("poisoned") = key;
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Spawn the fake endpoint; returns its full URL and shared state.
pub async fn spawn_fake_apod(status: StatusCode, body: &str) -> (url::Url, Arc<FakeApod>) {
    let state = Arc::new(FakeApod {
        status,
        body: body.to_string(),
        hits: AtomicUsize::new(0),
        last_api_key: Mutex::new(None),
    });
    let app = Router::new()
        .route("/planetary/apod", get(apod_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake apod listener");
    let addr = listener.local_addr().expect("listener has no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake apod server failed");
    });

    let url = url::Url::parse(&format!("http://{addr}/planetary/apod")).expect("valid url");
    (url, state)
}
