//! In-process Moonraker stand-in for integration tests.
//!
//! An `axum` router whose fallback serves canned responses keyed by the raw
//! (still percent-encoded) request path and records every request target.
//! Unknown paths get a 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;

use klipper_mcp::config::MoonrakerConfig;
use klipper_mcp::mcp::tools::ToolHandler;
use klipper_mcp::moonraker::MoonrakerClient;

#[derive(Debug, Clone)]
struct Reply {
    status: StatusCode,
    body: String,
}

#[derive(Clone)]
struct MockState {
    routes: Arc<HashMap<String, Reply>>,
    requests: Arc<Mutex<Vec<String>>>,
}

/// A running mock Moonraker instance.
pub struct MockMoonraker {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

/// Builder collecting routes before the listener starts.
#[derive(Default)]
pub struct MockBuilder {
    routes: HashMap<String, Reply>,
}

/// Percent-encodes `segments` into a request path, the way a URL builder would.
pub fn encoded_path<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut url = reqwest::Url::parse("http://localhost/").unwrap();
    url.path_segments_mut().unwrap().pop_if_empty().extend(segments);
    url.path().to_string()
}

impl MockBuilder {
    /// Answers `path` with status 200 and `body`.
    pub fn ok(self, path: &str, body: impl Into<String>) -> Self {
        self.status(path, 200, body)
    }

    /// Answers `path` with the given status and body.
    pub fn status(mut self, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.insert(
            path.to_string(),
            Reply {
                status: StatusCode::from_u16(status).unwrap(),
                body: body.into(),
            },
        );
        self
    }

    /// Serves a config file under `/server/files/config/`.
    pub fn config_file(self, name: &str, text: &str) -> Self {
        let path = encoded_path(["server", "files", "config"].into_iter().chain(name.split('/')));
        self.ok(&path, text)
    }

    /// Serves a log file under `/server/files/logs/`.
    pub fn log_file(self, name: &str, text: &str) -> Self {
        let path = encoded_path(["server", "files", "logs"].into_iter().chain(name.split('/')));
        self.ok(&path, text)
    }

    /// Binds to an ephemeral localhost port and starts serving.
    pub async fn start(self) -> MockMoonraker {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = MockState {
            routes: Arc::new(self.routes),
            requests: Arc::clone(&requests),
        };
        let router = Router::new().fallback(answer).with_state(state);
        tokio::spawn(async move { axum::serve(listener, router).await });

        MockMoonraker {
            url: format!("http://{addr}"),
            requests,
        }
    }
}

impl MockMoonraker {
    pub fn builder() -> MockBuilder {
        MockBuilder::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn client(&self) -> MoonrakerClient {
        let config = MoonrakerConfig {
            url: self.url.clone(),
            timeout_secs: 5,
        };
        MoonrakerClient::new(&config).unwrap()
    }

    pub fn handler(&self) -> ToolHandler {
        ToolHandler::new(self.client(), 100)
    }

    /// Request targets received so far, encoded, including query strings.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// A client pointed at a port nothing listens on.
pub fn unreachable_client() -> MoonrakerClient {
    let config = MoonrakerConfig {
        url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 2,
    };
    MoonrakerClient::new(&config).unwrap()
}

async fn answer(State(state): State<MockState>, uri: Uri) -> impl IntoResponse {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    state.requests.lock().unwrap().push(target);

    let reply = state.routes.get(uri.path()).cloned().unwrap_or(Reply {
        status: StatusCode::NOT_FOUND,
        body: "Not Found".to_string(),
    });
    let content_type = if reply.body.starts_with('{') {
        "application/json"
    } else {
        "text/plain"
    };

    (reply.status, [(header::CONTENT_TYPE, content_type)], reply.body)
}
