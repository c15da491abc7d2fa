/// HTTP endpoint for querying thing state
///
/// Exposes what the pollers last reported, so dashboards and scripts can
/// read restriction levels without polling council websites themselves.
///
/// Endpoints:
/// - GET /things - All configured things
/// - GET /thing/{id} - One thing's status and alert level
/// - GET /health - Service health check

use crate::handler::{StatusSink, ThingStatus};
use crate::model::AlertLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

// ---------------------------------------------------------------------------
// Channel store
// ---------------------------------------------------------------------------

/// Last known state of one thing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThingData {
    pub id: String,
    #[serde(flatten)]
    pub status: ThingStatus,
    /// Channel id to last published level.
    pub channels: HashMap<String, AlertLevel>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ThingData {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: ThingStatus::Unknown,
            channels: HashMap::new(),
            last_updated: None,
        }
    }
}

/// Body of GET /things
#[derive(Debug, Serialize)]
struct ThingsResponse {
    things: Vec<ThingData>,
}

/// Shared, thread-safe record of every status and channel update.
#[derive(Clone, Default)]
pub struct ChannelStore {
    things: Arc<RwLock<HashMap<String, ThingData>>>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a thing so it shows up before its first poll.
    pub fn register(&self, id: &str) {
        self.write(|things| {
            things.entry(id.to_string()).or_insert_with(|| ThingData::new(id));
        });
    }

    pub fn get(&self, id: &str) -> Option<ThingData> {
        self.read(|things| things.get(id).cloned())
    }

    /// All things, sorted by id.
    pub fn all(&self) -> Vec<ThingData> {
        let mut all: Vec<ThingData> = self.read(|things| things.values().cloned().collect());
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<String, ThingData>) -> T) -> T {
        let guard = self.things.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut HashMap<String, ThingData>) -> T) -> T {
        let mut guard = self.things.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl StatusSink for ChannelStore {
    fn update_status(&self, thing_id: &str, status: ThingStatus) {
        self.write(|things| {
            let data = things
                .entry(thing_id.to_string())
                .or_insert_with(|| ThingData::new(thing_id));
            if data.status != status {
                info!(thing = %thing_id, status = ?status, "Status changed");
            }
            data.status = status;
        });
    }

    fn publish_level(&self, thing_id: &str, channel: &str, level: AlertLevel, at: DateTime<Utc>) {
        self.write(|things| {
            let data = things
                .entry(thing_id.to_string())
                .or_insert_with(|| ThingData::new(thing_id));
            data.channels.insert(channel.to_string(), level);
            data.last_updated = Some(at);
        });
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port (blocks)
pub fn start_endpoint_server(port: u16, store: ChannelStore) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    info!("HTTP endpoint listening on http://0.0.0.0:{}", port);
    serve(&server, &store);
    Ok(())
}

/// Answers requests until the server is dropped or unblocked.
pub fn serve(server: &tiny_http::Server, store: &ChannelStore) {
    for request in server.incoming_requests() {
        let response = route(request.url(), store);

        if let Err(e) = request.respond(response) {
            error!("Failed to send response: {}", e);
        }
    }
}

fn route(url: &str, store: &ChannelStore) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let path = url.split('?').next().unwrap_or(url);

    if path == "/health" {
        handle_health()
    } else if path == "/things" {
        create_response(200, &ThingsResponse { things: store.all() })
    } else if let Some(id) = path.strip_prefix("/thing/") {
        handle_thing_query(store, id)
    } else {
        create_response(
            404,
            &serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/things", "/thing/{id}"]
            }),
        )
    }
}

/// Handle /health endpoint
fn handle_health() -> tiny_http::Response<Cursor<Vec<u8>>> {
    create_response(
        200,
        &serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

/// Handle /thing/{id} endpoint
fn handle_thing_query(store: &ChannelStore, id: &str) -> tiny_http::Response<Cursor<Vec<u8>>> {
    match store.get(id) {
        Some(data) => create_response(200, &data),
        None => create_response(
            404,
            &serde_json::json!({
                "error": format!("Thing {} is not configured", id),
                "id": id
            }),
        ),
    }
}

/// Create HTTP response with JSON body
fn create_response<T: Serialize>(status_code: u16, body: &T) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let (status_code, body) = match serde_json::to_string_pretty(body) {
        Ok(body) => (status_code, body),
        Err(e) => (500, format!("{{\"error\": \"Failed to serialize response: {}\"}}", e)),
    };

    let mut response =
        tiny_http::Response::from_data(body.into_bytes()).with_status_code(tiny_http::StatusCode::from(status_code));
    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
