//! In-process fake file-manager backend: the REST endpoints over a temp
//! directory plus a minimal STOMP broker on `/ws/websocket`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use fmclient::ClientConfig;
use fmclient::progress::frame::{Command, Frame};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// How the broker answers CONNECT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandshakeMode {
    #[default]
    Accept,
    /// Reply with an ERROR frame, then close
    Reject,
    /// Close the socket without replying
    HangUp,
}

#[derive(Default)]
struct BrokerInner {
    handshake: HandshakeMode,
    next_conn: usize,
    connections_opened: usize,
    outbound: HashMap<usize, mpsc::UnboundedSender<String>>,
    /// (connection, subscription id, destination)
    subscriptions: Vec<(usize, String, String)>,
    unsubscribed: Vec<String>,
    disconnects: usize,
    next_message: u64,
}

#[derive(Default)]
pub struct Broker {
    inner: Mutex<BrokerInner>,
}

impl Broker {
    fn open(&self, tx: mpsc::UnboundedSender<String>) -> usize {
        let mut inner = self.inner.lock();
        inner.next_conn += 1;
        inner.connections_opened += 1;
        let conn = inner.next_conn;
        inner.outbound.insert(conn, tx);
        conn
    }

    fn close(&self, conn: usize) {
        let mut inner = self.inner.lock();
        inner.outbound.remove(&conn);
        inner.subscriptions.retain(|(c, _, _)| *c != conn);
    }

    fn send(&self, conn: usize, frame: &Frame) {
        if let Some(tx) = self.inner.lock().outbound.get(&conn) {
            let _ = tx.send(frame.encode());
        }
    }

    pub fn set_handshake(&self, mode: HandshakeMode) {
        self.inner.lock().handshake = mode;
    }

    pub fn connections_opened(&self) -> usize {
        self.inner.lock().connections_opened
    }

    pub fn disconnects(&self) -> usize {
        self.inner.lock().disconnects
    }

    /// Live subscriptions as (id, destination).
    pub fn subscriptions(&self) -> Vec<(String, String)> {
        self.inner
            .lock()
            .subscriptions
            .iter()
            .map(|(_, id, dest)| (id.clone(), dest.clone()))
            .collect()
    }

    pub fn unsubscribed(&self) -> Vec<String> {
        self.inner.lock().unsubscribed.clone()
    }

    /// Push a raw body to every subscriber of `destination`.
    pub fn publish(&self, destination: &str, body: &str) {
        let mut inner = self.inner.lock();
        let targets: Vec<(usize, String)> = inner
            .subscriptions
            .iter()
            .filter(|(_, _, dest)| dest == destination)
            .map(|(conn, id, _)| (*conn, id.clone()))
            .collect();
        for (conn, id) in targets {
            inner.next_message += 1;
            let frame = Frame::new(Command::Message)
                .header("destination", destination)
                .header("subscription", &id)
                .header("message-id", &inner.next_message.to_string())
                .header("content-type", "application/json")
                .body(body);
            if let Some(tx) = inner.outbound.get(&conn) {
                let _ = tx.send(frame.encode());
            }
        }
    }

    pub fn publish_update(&self, operation_id: &str, update: Value) {
        self.publish(&format!("/topic/progress/{operation_id}"), &update.to_string());
    }

    /// Close every client socket from the server side.
    pub fn drop_connections(&self) {
        let mut inner = self.inner.lock();
        inner.outbound.clear();
        inner.subscriptions.clear();
    }

    pub async fn wait_for<F>(&self, mut condition: F) -> bool
    where
        F: FnMut(&Broker) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while tokio::time::Instant::now() < deadline {
            if condition(self) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition(self)
    }

    pub async fn wait_for_destination(&self, destination: &str) -> bool {
        self.wait_for(|b| b.subscriptions().iter().any(|(_, d)| d == destination))
            .await
    }
}

pub struct ServerState {
    pub home: PathBuf,
    pub broker: Broker,
    /// (operation endpoint name, request body)
    pub requests: Mutex<Vec<(String, Value)>>,
}

pub struct FakeServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
    pub dir: TempDir,
}

impl FakeServer {
    /// Serve a temp tree:
    /// `Photos/`, `music/`, `.hidden/`, `b.txt` (5 bytes), `A.txt` (3 bytes).
    pub async fn start() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("Photos")).expect("mkdir");
        std::fs::create_dir(dir.path().join("music")).expect("mkdir");
        std::fs::create_dir(dir.path().join(".hidden")).expect("mkdir");
        std::fs::write(dir.path().join("b.txt"), b"hello").expect("write");
        std::fs::write(dir.path().join("A.txt"), b"abc").expect("write");

        let state = Arc::new(ServerState {
            home: dir.path().to_path_buf(),
            broker: Broker::default(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/filesystem/home", get(home))
            .route("/api/filesystem/roots", get(roots))
            .route("/api/filesystem/list", get(list))
            .route("/api/filesystem/validate", get(validate))
            .route("/api/operations/{op}", post(operation))
            .route("/ws/websocket", get(stomp))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self { addr, state, dir }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&format!("http://{}/api", self.addr)).expect("config")
    }

    pub fn broker(&self) -> &Broker {
        &self.state.broker
    }

    pub fn home(&self) -> String {
        self.state.home.to_string_lossy().into_owned()
    }

    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().into_owned()
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message, "error": "IllegalArgumentException" })),
    )
        .into_response()
}

async fn home(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({ "path": state.home.to_string_lossy() }))
}

async fn roots() -> Json<Value> {
    Json(json!({
        "roots": [{ "path": "/", "name": "/", "directory": true, "readable": true, "writable": false }]
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    path: String,
    #[serde(default)]
    include_files: bool,
}

fn entry_json(path: &Path, name: String, parent: bool) -> Value {
    let meta = std::fs::metadata(path).ok();
    let directory = meta.as_ref().is_some_and(|m| m.is_dir());
    let mut entry = json!({
        "path": path.to_string_lossy(),
        "name": name,
        "directory": directory,
        "parent": parent,
        "readable": true,
        "writable": true,
    });
    if let (false, Some(meta)) = (directory, meta) {
        entry["size"] = json!(meta.len());
        entry["lastModified"] = json!(1_700_000_000_000i64);
    }
    entry
}

async fn list(Query(query): Query<ListQuery>) -> Response {
    let dir = PathBuf::from(&query.path);
    let Ok(read) = std::fs::read_dir(&dir) else {
        return bad_request(format!("Directory does not exist: {}", query.path));
    };

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for item in read.flatten() {
        let name = item.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = item.path();
        if path.is_dir() {
            dirs.push((name, path));
        } else if query.include_files {
            files.push((name, path));
        }
    }
    dirs.sort_by_key(|(name, _)| name.to_lowercase());
    files.sort_by_key(|(name, _)| name.to_lowercase());

    let mut entries = Vec::new();
    if let Some(parent) = dir.parent() {
        entries.push(entry_json(parent, "..".to_string(), true));
    }
    for (name, path) in dirs.into_iter().chain(files) {
        entries.push(entry_json(&path, name, false));
    }

    Json(json!({ "currentPath": query.path, "entries": entries })).into_response()
}

#[derive(Deserialize)]
struct ValidateQuery {
    path: String,
}

async fn validate(Query(query): Query<ValidateQuery>) -> Json<Value> {
    let path = Path::new(&query.path);
    Json(json!({
        "exists": path.exists(),
        "isDirectory": path.is_dir(),
        "isFile": path.is_file(),
        "absolutePath": query.path,
    }))
}

async fn operation(
    State(state): State<Arc<ServerState>>,
    UrlPath(op): UrlPath<String>,
    Json(body): Json<Value>,
) -> Response {
    state.requests.lock().push((op.clone(), body.clone()));

    let count_field = match op.as_str() {
        "rename" => "filesRenamed",
        "organize" => "filesOrganized",
        "extract" => "filesExtracted",
        "photo-organize" => "photosOrganized",
        "find-duplicates" => "duplicatesRemoved",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    let source = body
        .get("sourceDirectory")
        .or_else(|| body.get("directory"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !Path::new(&source).is_dir() {
        return bad_request(format!("Source directory does not exist: {source}"));
    }

    if let Some(id) = body.get("operationId").and_then(Value::as_str) {
        let broker = &state.broker;
        if broker.wait_for_destination(&format!("/topic/progress/{id}")).await {
            broker.publish_update(id, json!({ "operationId": id, "status": "running", "message": "Working", "current": 1, "total": 2 }));
            broker.publish_update(id, json!({ "operationId": id, "status": "completed", "message": "Done" }));
        }
    }

    let mut response = Map::new();
    response.insert("success".to_string(), json!(true));
    response.insert("message".to_string(), json!(format!("{op} finished")));
    response.insert(count_field.to_string(), json!(2));
    Json(Value::Object(response)).into_response()
}

async fn stomp(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(move |socket| broker_session(state, socket))
}

async fn broker_session(state: Arc<ServerState>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let conn = state.broker.open(tx);

    // Ends when the broker forgets this connection
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                return;
            }
        }
        let _ = sink.close().await;
    });

    'session: while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(frames) = Frame::decode_all(&text) else {
            continue;
        };
        for frame in frames {
            match frame.command {
                Command::Connect => {
                    let mode = state.broker.inner.lock().handshake;
                    match mode {
                        HandshakeMode::Accept => {
                            let connected = Frame::new(Command::Connected)
                                .header("version", "1.2")
                                .header("heart-beat", "0,0");
                            state.broker.send(conn, &connected);
                        }
                        HandshakeMode::Reject => {
                            let error = Frame::new(Command::Error)
                                .header("message", "Access denied")
                                .body("subscriptions are disabled");
                            state.broker.send(conn, &error);
                            break 'session;
                        }
                        HandshakeMode::HangUp => break 'session,
                    }
                }
                Command::Subscribe => {
                    let id = frame.get("id").unwrap_or_default().to_string();
                    let dest = frame.get("destination").unwrap_or_default().to_string();
                    state.broker.inner.lock().subscriptions.push((conn, id, dest));
                }
                Command::Unsubscribe => {
                    let id = frame.get("id").unwrap_or_default().to_string();
                    let mut inner = state.broker.inner.lock();
                    inner.subscriptions.retain(|(c, i, _)| !(*c == conn && *i == id));
                    inner.unsubscribed.push(id);
                }
                Command::Disconnect => {
                    state.broker.inner.lock().disconnects += 1;
                    break 'session;
                }
                _ => {}
            }
        }
    }

    state.broker.close(conn);
    let _ = writer.await;
}
