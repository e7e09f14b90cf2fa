#![allow(dead_code)] // Test helpers appear unused when compiled independently

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

pub const REQUEST_ID: &str = "00000000-aaaa-bbbb-cccc-000000000001";

/// A PUT received by the mock Resource Manager
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub subscription: String,
    pub resource_group: String,
    pub name: String,
    pub api_version: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct ArmState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockArm {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockArm {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.handle.await;
    }
}

/// Best-effort check for whether binding to loopback is permitted in the current sandbox.
pub async fn can_bind_loopback() -> bool {
    match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => {
            drop(listener);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => false,
        Err(_) => true, // treat other errors as non-fatal for skipping
    }
}

/// Spawn the mock Resource Manager on a free port, return (handle, base URL).
///
/// VM names starting with `conflict` get a 409 ARM error envelope; names
/// starting with `broken` get a bare 500. Everything else is accepted with 201.
pub async fn spawn_mock_arm() -> (MockArm, String) {
    let state = ArmState::default();
    let requests = state.requests.clone();

    let app = Router::new()
        .route(
            "/subscriptions/:subscription/resourceGroups/:resource_group/providers/Microsoft.Compute/virtualMachines/:name",
            put(put_vm),
        )
        .route("/health", get(|| async { "ok" }))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock arm listener");
    let port = listener.local_addr().unwrap().port();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        if let Err(err) = server.await {
            eprintln!("mock arm server error: {}", err);
        }
    });

    (
        MockArm {
            shutdown_tx,
            handle,
            requests,
        },
        format!("http://127.0.0.1:{}", port),
    )
}

async fn put_vm(
    State(state): State<ArmState>,
    Path((subscription, resource_group, name)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.requests.lock().await.push(RecordedRequest {
        subscription,
        resource_group,
        name: name.clone(),
        api_version: query.get("api-version").cloned(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string()),
        body: body.clone(),
    });

    if name.starts_with("conflict") {
        return (
            StatusCode::CONFLICT,
            [("x-ms-request-id", REQUEST_ID)],
            Json(json!({
                "error": {
                    "code": "PropertyChangeNotAllowed",
                    "message": "Changing property 'osDisk.name' is not allowed."
                }
            })),
        )
            .into_response();
    }

    if name.starts_with("broken") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut response = body;
    response["id"] = json!(format!("/virtualMachines/{}", name));
    response["properties"]["provisioningState"] = json!("Creating");

    (
        StatusCode::CREATED,
        [
            ("x-ms-request-id", REQUEST_ID),
            ("azure-asyncoperation", "http://127.0.0.1/operations/op-1"),
        ],
        Json(response),
    )
        .into_response()
}
