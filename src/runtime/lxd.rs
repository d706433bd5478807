//! LXD management API client over the local unix socket

use std::future::Future;
use std::path::{Path, PathBuf};

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::Client;
use hyperlocal::{UnixClientExt, UnixConnector, Uri as HyperlocalUri};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::api::{Devices, InstanceState, InstanceStatus, LifecycleApi};
use crate::error::{NookError, Result};

const INSTANCES_ENDPOINT: &str = "/1.0/instances";

/// Blocking LXD client; every call runs to completion before returning
#[derive(Debug, Clone)]
pub struct LxdClient {
    socket: PathBuf,
}

#[derive(Debug, Clone)]
struct UnixResponse {
    status: StatusCode,
    body: Bytes,
}

/// Standard LXD response envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    operation: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_code: u16,
    #[serde(default)]
    metadata: Value,
}

#[derive(Debug, Deserialize)]
struct InstanceMetadata {
    status: String,
    #[serde(default)]
    devices: Devices,
}

#[derive(Debug, Deserialize)]
struct OperationMetadata {
    #[serde(default)]
    status: String,
    #[serde(default)]
    status_code: u16,
    #[serde(default)]
    err: String,
}

impl LxdClient {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    fn change_state(&self, name: &str, action: &'static str) -> Result<()> {
        let operation = match action {
            "start" => "start_instance",
            _ => "stop_instance",
        };
        let socket = self.socket.clone();
        let path = format!("{INSTANCES_ENDPOINT}/{name}/state");

        run_async(async move {
            let response = send_unix_json_request(
                &socket,
                Method::PUT,
                &path,
                Some(json!({ "action": action })),
                operation,
            )
            .await?;
            let envelope = parse_envelope(operation, &response)?;
            if envelope.operation.is_empty() {
                return Err(NookError::ApiResponse {
                    operation,
                    message: "async response carried no operation".to_string(),
                });
            }

            debug!(operation = %envelope.operation, "waiting for LXD operation");
            let waited = send_unix_json_request(
                &socket,
                Method::GET,
                &format!("{}/wait", envelope.operation),
                None,
                "wait_operation",
            )
            .await?;
            let result = parse_envelope("wait_operation", &waited)?;
            check_operation(&envelope.operation, result.metadata)
        })
    }
}

impl LifecycleApi for LxdClient {
    fn instance(&self, name: &str) -> Result<Option<InstanceState>> {
        let socket = self.socket.clone();
        let path = format!("{INSTANCES_ENDPOINT}/{name}");
        let response = run_async(async move {
            send_unix_json_request(&socket, Method::GET, &path, None, "get_instance").await
        })?;

        if response.status == StatusCode::NOT_FOUND {
            debug!(instance = name, "instance does not exist");
            return Ok(None);
        }
        let envelope = parse_envelope("get_instance", &response)?;
        parse_instance(envelope.metadata).map(Some)
    }

    fn start(&self, name: &str) -> Result<()> {
        debug!(instance = name, "requesting start");
        self.change_state(name, "start")
    }

    fn stop(&self, name: &str) -> Result<()> {
        debug!(instance = name, "requesting stop");
        self.change_state(name, "stop")
    }
}

fn parse_envelope(operation: &'static str, response: &UnixResponse) -> Result<Envelope> {
    let envelope: Envelope = match serde_json::from_slice(&response.body) {
        Ok(envelope) => envelope,
        Err(e) if response.status.is_success() => {
            return Err(NookError::ApiResponse {
                operation,
                message: e.to_string(),
            })
        }
        Err(_) => {
            return Err(NookError::ApiStatus {
                operation,
                status: response.status.as_u16(),
                message: String::from_utf8_lossy(&response.body).into_owned(),
            })
        }
    };

    if envelope.kind == "error" || !response.status.is_success() {
        let status = if envelope.error_code != 0 {
            envelope.error_code
        } else {
            response.status.as_u16()
        };
        return Err(NookError::ApiStatus {
            operation,
            status,
            message: envelope.error,
        });
    }

    Ok(envelope)
}

fn parse_instance(metadata: Value) -> Result<InstanceState> {
    let metadata: InstanceMetadata =
        serde_json::from_value(metadata).map_err(|e| NookError::ApiResponse {
            operation: "get_instance",
            message: e.to_string(),
        })?;

    Ok(InstanceState {
        status: InstanceStatus::from_api(&metadata.status),
        devices: metadata.devices,
    })
}

fn check_operation(operation: &str, metadata: Value) -> Result<()> {
    let result: OperationMetadata =
        serde_json::from_value(metadata).map_err(|e| NookError::ApiResponse {
            operation: "wait_operation",
            message: e.to_string(),
        })?;

    if result.status_code == StatusCode::OK.as_u16() && result.err.is_empty() {
        return Ok(());
    }

    let message = if result.err.is_empty() {
        format!("{} ({})", result.status, result.status_code)
    } else {
        result.err
    };
    Err(NookError::OperationFailed {
        operation: operation.to_string(),
        message,
    })
}

async fn send_unix_json_request(
    socket_path: &Path,
    method: Method,
    path: &str,
    body: Option<Value>,
    operation: &'static str,
) -> Result<UnixResponse> {
    let client: Client<UnixConnector, Full<Bytes>> = Client::unix();
    let uri: Uri = HyperlocalUri::new(socket_path, path).into();
    debug!(%method, path, "LXD request");

    let mut request_builder = Request::builder().method(method).uri(uri);
    let request_body = match body {
        Some(payload) => {
            request_builder = request_builder.header("content-type", "application/json");
            Full::new(Bytes::from(payload.to_string()))
        }
        None => Full::new(Bytes::new()),
    };

    let request = request_builder
        .body(request_body)
        .map_err(|e| NookError::ApiResponse {
            operation,
            message: e.to_string(),
        })?;

    let transport = |message: String| NookError::ApiTransport {
        operation,
        socket: socket_path.to_path_buf(),
        message,
    };

    let response = client
        .request(request)
        .await
        .map_err(|e| transport(e.to_string()))?;
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| transport(e.to_string()))?
        .to_bytes();

    Ok(UnixResponse { status, body })
}

fn run_async<T, F>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(NookError::AsyncRuntime)?;
    runtime.block_on(future)
}
