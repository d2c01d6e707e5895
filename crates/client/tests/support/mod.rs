//! In-process stand-in for a Reverb server and a Laravel broadcasting auth
//! endpoint, shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::{Json, Router};
use reverb_tester_shared::{ConnectionConfig, Scheme};
use serde_json::{json, Value};

pub const APP_KEY: &str = "app-key";
pub const SOCKET_ID: &str = "1234.5678";
pub const TOKEN: &str = "secret-token";

/// One request the auth endpoint received.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub authorization: Option<String>,
    pub csrf: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct Recorded {
    pub connections: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
    pub frames: Arc<Mutex<Vec<Value>>>,
    pub auth_requests: Arc<Mutex<Vec<AuthRequest>>>,
}

impl Recorded {
    pub fn frames(&self) -> Vec<Value> {
        self.frames.lock().unwrap().clone()
    }

    pub fn auth_requests(&self) -> Vec<AuthRequest> {
        self.auth_requests.lock().unwrap().clone()
    }

    /// Wait until a frame matching `predicate` has arrived from a client.
    pub async fn wait_for_frame(&self, predicate: impl Fn(&Value) -> bool) -> Value {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(frame) = self.frames().into_iter().find(|f| predicate(f)) {
                return frame;
            }
            assert!(tokio::time::Instant::now() < deadline, "frame never arrived: {:?}", self.frames());
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub struct FakeReverb {
    pub addr: SocketAddr,
    pub recorded: Recorded,
}

impl FakeReverb {
    pub async fn start() -> Self {
        let recorded = Recorded::default();
        let app = Router::new()
            .route("/app/{key}", any(upgrade))
            .route("/broadcasting/auth", post(authorize))
            .route("/broadcasting/login-page", post(login_page))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, recorded }
    }

    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: Some(self.addr.port()),
            key: APP_KEY.to_string(),
            scheme: Scheme::Ws,
            cluster: String::new(),
        }
    }

    pub fn auth_endpoint(&self) -> String {
        format!("http://{}/broadcasting/auth", self.addr)
    }

    pub fn login_page_endpoint(&self) -> String {
        format!("http://{}/broadcasting/login-page", self.addr)
    }
}

async fn upgrade(
    ws: WebSocketUpgrade,
    Path(key): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    State(recorded): State<Recorded>,
) -> Response {
    recorded.connections.lock().unwrap().push((key, query));
    ws.on_upgrade(move |socket| serve_socket(socket, recorded))
}

async fn send(socket: &mut WebSocket, frame: Value) {
    let _ = socket.send(Message::Text(frame.to_string().into())).await;
}

async fn serve_socket(mut socket: WebSocket, recorded: Recorded) {
    send(
        &mut socket,
        json!({
            "event": "pusher:connection_established",
            "data": json!({ "socket_id": SOCKET_ID, "activity_timeout": 30 }).to_string(),
        }),
    )
    .await;

    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else { continue };
        let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else { continue };
        recorded.frames.lock().unwrap().push(frame.clone());

        match frame["event"].as_str().unwrap_or_default() {
            "pusher:ping" => send(&mut socket, json!({ "event": "pusher:pong", "data": "{}" })).await,
            "pusher:subscribe" => {
                let channel = frame["data"]["channel"].as_str().unwrap_or_default().to_string();
                for reply in subscription_replies(&channel, &frame["data"]) {
                    send(&mut socket, reply).await;
                }
            }
            _ => {}
        }
    }
}

/// What the server pushes after a subscribe request.
fn subscription_replies(channel: &str, request: &Value) -> Vec<Value> {
    let needs_auth = channel.starts_with("private-") || channel.starts_with("presence-");
    let signed = request["auth"]
        .as_str()
        .is_some_and(|auth| auth.starts_with(&format!("{APP_KEY}:")));
    if needs_auth && !signed {
        return vec![json!({
            "event": "pusher:subscription_error",
            "channel": channel,
            "data": json!({ "type": "AuthError", "error": "Invalid signature", "status": 401 }).to_string(),
        })];
    }

    let ack_data = if channel.starts_with("presence-") {
        json!({
            "presence": {
                "ids": ["1", "2"],
                "hash": { "1": { "name": "Ada" }, "2": { "name": "Grace" } },
                "count": 2,
            }
        })
        .to_string()
    } else {
        "{}".to_string()
    };

    let mut replies = vec![json!({
        "event": "pusher_internal:subscription_succeeded",
        "channel": channel,
        "data": ack_data,
    })];

    if channel == "orders" {
        replies.push(json!({
            "event": "App\\Events\\OrderShipped",
            "channel": channel,
            "data": json!({ "id": 7 }).to_string(),
        }));
        replies.push(json!({
            "event": "stock-updated",
            "channel": channel,
            "data": json!({ "sku": "A1" }).to_string(),
        }));
    }
    if channel.starts_with("presence-") {
        replies.push(json!({
            "event": "pusher_internal:member_added",
            "channel": channel,
            "data": json!({ "user_id": "3", "user_info": { "name": "Linus" } }).to_string(),
        }));
    }

    replies
}

async fn authorize(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let authorization = header("authorization");
    recorded.auth_requests.lock().unwrap().push(AuthRequest {
        authorization: authorization.clone(),
        csrf: header("x-csrf-token"),
        body: body.clone(),
    });

    if authorization.as_deref() != Some(&format!("Bearer {TOKEN}")) {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let channel = body["channel_name"].as_str().unwrap_or_default();
    let socket_id = body["socket_id"].as_str().unwrap_or_default();
    let mut signed = json!({ "auth": format!("{APP_KEY}:signature-for-{socket_id}") });
    if channel.starts_with("presence-") {
        signed["channel_data"] = json!(json!({ "user_id": "1", "user_info": { "name": "Ada" } }).to_string());
    }
    Json(signed).into_response()
}

async fn login_page() -> &'static str {
    "<html><body>Please log in</body></html>"
}
