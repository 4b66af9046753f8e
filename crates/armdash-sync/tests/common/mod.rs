//! Stub control service for integration tests
//!
//! Implements the HTTP/JSON contract with recorded request counters so
//! tests can assert exactly how many sends reached the wire.

#![allow(dead_code)]

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use armdash_sync::SyncConfig;

#[derive(Default)]
pub struct StubControl {
    pub status_hits: AtomicUsize,
    pub connect_hits: AtomicUsize,
    pub cam_triggers: AtomicUsize,
    pub servo_posts: Mutex<Vec<(u8, i64)>>,
    pub position_posts: Mutex<Vec<([f64; 3], bool)>>,
    pub world_posts: Mutex<Vec<([f64; 3], String)>>,
    pub grab_posts: Mutex<Vec<String>>,
    /// Lines handed out once by /api/serial_read, then drained
    pub serial_lines: Mutex<Vec<String>>,
    /// Wire mode string served by /api/mode
    pub mode: Mutex<String>,
    /// Base64 camera frame served by /api/image, None while not ready
    pub image: Mutex<Option<String>>,
    /// Box list served by /api/boxes (wire JSON objects)
    pub boxes: Mutex<Vec<Value>>,
    /// Service-native position served by /api/position
    pub position: Mutex<Option<[f64; 3]>>,
    /// `otherFrameCoords` replied to /api/send_position
    pub other_frame_coords: Mutex<Option<[f64; 3]>>,
    pub fail_connect: AtomicBool,
    pub fail_servo: AtomicBool,
    pub fail_boxes: AtomicBool,
}

impl StubControl {
    pub fn servo_posts(&self) -> Vec<(u8, i64)> {
        self.servo_posts.lock().unwrap().clone()
    }

    pub fn position_posts(&self) -> Vec<([f64; 3], bool)> {
        self.position_posts.lock().unwrap().clone()
    }

    pub fn set_mode(&self, mode: &str) {
        *self.mode.lock().unwrap() = mode.to_string();
    }

    pub fn set_image(&self, encoded: &str) {
        *self.image.lock().unwrap() = Some(encoded.to_string());
    }

    pub fn set_boxes(&self, boxes: Vec<Value>) {
        *self.boxes.lock().unwrap() = boxes;
    }
}

pub fn test_box(id: &str) -> Value {
    json!({
        "id": id,
        "x": 0.1, "y": 0.2, "z": 0.0,
        "width": 0.05, "height": 0.05, "depth": 0.05
    })
}

/// Config tuned for fast tests: 20ms polls, 150ms debounce window
pub fn test_config(base_url: &str) -> SyncConfig {
    SyncConfig {
        base_url: base_url.to_string(),
        poll_interval_ms: 20,
        debounce_ms: 150,
        request_timeout_secs: 5,
        ..SyncConfig::default()
    }
}

/// Start the stub on an ephemeral port; returns its shared state and
/// base URL
pub async fn spawn_stub() -> (Arc<StubControl>, String) {
    let stub = Arc::new(StubControl {
        mode: Mutex::new("serial".to_string()),
        ..StubControl::default()
    });

    let app = Router::new()
        .route("/api/status", get(status))
        .route("/api/ports", get(ports))
        .route("/api/connect", post(connect))
        .route("/api/disconnect", post(disconnect))
        .route("/api/servos", get(servos))
        .route("/api/servo", post(servo))
        .route("/api/serial_read", get(serial_read))
        .route("/api/send_position", post(send_position))
        .route("/api/world_position", post(world_position))
        .route("/api/position", get(position))
        .route("/api/boxes", get(boxes))
        .route("/api/image", get(image))
        .route("/api/cam", get(cam))
        .route("/api/grab_box", post(grab_box))
        .route("/api/mode", get(mode))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (stub, format!("http://{}", addr))
}

async fn status(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    stub.status_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({"connected": true, "port": "COM3"}))
}

async fn ports(State(_stub): State<Arc<StubControl>>) -> Json<Value> {
    Json(json!({"success": true, "ports": ["COM3", "COM4"]}))
}

async fn connect(State(stub): State<Arc<StubControl>>, Json(body): Json<Value>) -> Json<Value> {
    stub.connect_hits.fetch_add(1, Ordering::SeqCst);
    if stub.fail_connect.load(Ordering::SeqCst) {
        return Json(json!({"success": false, "error": "could not open port"}));
    }
    let port = body["port"].as_str().unwrap_or("?");
    Json(json!({
        "success": true,
        "message": format!("Connected to {}", port),
        "armPosition": [0.1, 0.2, 0.3]
    }))
}

async fn disconnect(State(_stub): State<Arc<StubControl>>) -> Json<Value> {
    Json(json!({"success": true, "message": "Disconnected"}))
}

async fn servos(State(_stub): State<Arc<StubControl>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "servos": [
            {"id": 0, "name": "Servo Base", "min_angle": 0, "max_angle": 180, "initial_angle": 90},
            {"id": 5, "name": "Servo Gripper", "min_angle": 90, "max_angle": 180, "initial_angle": 160}
        ]
    }))
}

async fn servo(State(stub): State<Arc<StubControl>>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["servo_id"].as_u64().unwrap_or(0) as u8;
    let angle = body["angle"].as_i64().unwrap_or(0);
    stub.servo_posts.lock().unwrap().push((id, angle));
    if stub.fail_servo.load(Ordering::SeqCst) {
        return Json(json!({"success": false, "error": "servo fault"}));
    }
    Json(json!({"success": true}))
}

async fn serial_read(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    let lines: Vec<String> = stub.serial_lines.lock().unwrap().drain(..).collect();
    Json(json!({"success": true, "data": lines}))
}

async fn send_position(State(stub): State<Arc<StubControl>>, Json(body): Json<Value>) -> Json<Value> {
    let coords = body["coordinates"]
        .as_array()
        .map(|a| {
            let mut c = [0.0; 3];
            for (i, v) in a.iter().take(3).enumerate() {
                c[i] = v.as_f64().unwrap_or(0.0);
            }
            c
        })
        .unwrap_or_default();
    let is_world = body["isWorldFrame"].as_bool().unwrap_or(false);
    stub.position_posts.lock().unwrap().push((coords, is_world));

    let other = stub.other_frame_coords.lock().unwrap().clone();
    match other {
        Some(c) => Json(json!({"success": true, "otherFrameCoords": c})),
        None => Json(json!({"success": true, "otherFrameCoords": [0.0, 0.0, 0.0]})),
    }
}

async fn world_position(State(stub): State<Arc<StubControl>>, Json(body): Json<Value>) -> Json<Value> {
    let coords = [
        body["x"].as_f64().unwrap_or(0.0),
        body["y"].as_f64().unwrap_or(0.0),
        body["z"].as_f64().unwrap_or(0.0),
    ];
    let frame = body["frame"].as_str().unwrap_or("?").to_string();
    stub.world_posts.lock().unwrap().push((coords, frame));
    Json(json!({"success": true}))
}

async fn position(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    match stub.position.lock().unwrap().clone() {
        Some(p) => Json(json!({"success": true, "position": {"x": p[0], "y": p[1], "z": p[2]}})),
        None => Json(json!({"success": false})),
    }
}

async fn boxes(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    if stub.fail_boxes.load(Ordering::SeqCst) {
        return Json(json!({"success": false, "error": "camera offline"}));
    }
    let boxes = stub.boxes.lock().unwrap().clone();
    Json(json!({"success": true, "boxes": boxes}))
}

async fn image(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    match stub.image.lock().unwrap().clone() {
        Some(encoded) => Json(json!({"success": true, "image": encoded})),
        None => Json(json!({"success": false})),
    }
}

async fn cam(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    stub.cam_triggers.fetch_add(1, Ordering::SeqCst);
    Json(json!({}))
}

async fn grab_box(State(stub): State<Arc<StubControl>>, Json(body): Json<Value>) -> Json<Value> {
    let id = body["box_id"].as_str().unwrap_or("").to_string();
    stub.grab_posts.lock().unwrap().push(id.clone());
    let known = stub
        .boxes
        .lock()
        .unwrap()
        .iter()
        .any(|b| b["id"].as_str() == Some(id.as_str()));
    if known {
        Json(json!({"success": true}))
    } else {
        Json(json!({"success": false, "error": "not found"}))
    }
}

async fn mode(State(stub): State<Arc<StubControl>>) -> Json<Value> {
    let mode = stub.mode.lock().unwrap().clone();
    Json(json!({"mode": mode}))
}
