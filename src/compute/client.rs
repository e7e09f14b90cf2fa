// src/compute/client.rs
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use super::models::{OperationResponse, VirtualMachine};

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_API_VERSION: &str = "2024-07-01";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors returned by the compute API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// Request never produced an HTTP response (DNS, TLS, timeout, ...)
    Transport(String),
    /// Service answered with a non-success status
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },
    /// HTTP client could not be constructed
    Client(String),
}

impl std::fmt::Display for ComputeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputeError::Transport(msg) => write!(f, "transport error: {}", msg),
            ComputeError::Service {
                status,
                code: Some(code),
                message,
            } => write!(f, "HTTP {} ({}): {}", status, code, message),
            ComputeError::Service {
                status,
                code: None,
                message,
            } => write!(f, "HTTP {}: {}", status, message),
            ComputeError::Client(msg) => write!(f, "failed to build HTTP client: {}", msg),
        }
    }
}

impl std::error::Error for ComputeError {}

/// The create-or-update capability on virtual machines (abstracts the HTTP client)
#[async_trait::async_trait]
pub trait VirtualMachineOperations: Send + Sync {
    async fn create_or_update(
        &self,
        resource_group: &str,
        vm: &VirtualMachine,
    ) -> Result<OperationResponse, ComputeError>;
}

/// Connection settings for [`ComputeClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Azure Resource Manager compute client
pub struct ComputeClient {
    client: Client,
    options: ClientOptions,
    subscription_id: String,
    token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

impl ComputeClient {
    pub fn new(
        subscription_id: String,
        token: String,
        options: ClientOptions,
    ) -> Result<Self, ComputeError> {
        let client = Client::builder()
            .user_agent(concat!("azvm/", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(|e| ComputeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            options,
            subscription_id,
            token,
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Full resource URL of a VM, without the api-version query
    pub fn vm_url(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachines/{}",
            self.options.endpoint.trim_end_matches('/'),
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            urlencoding::encode(name),
        )
    }
}

#[async_trait::async_trait]
impl VirtualMachineOperations for ComputeClient {
    #[tracing::instrument(
        name = "vm_create_or_update",
        skip(self, vm),
        fields(vm = %vm.name, location = %vm.location)
    )]
    async fn create_or_update(
        &self,
        resource_group: &str,
        vm: &VirtualMachine,
    ) -> Result<OperationResponse, ComputeError> {
        let url = self.vm_url(resource_group, &vm.name);
        debug!(%url, api_version = %self.options.api_version, "PUT virtual machine");

        let response = self
            .client
            .put(&url)
            .query(&[("api-version", self.options.api_version.as_str())])
            .bearer_auth(&self.token)
            .json(vm)
            .send()
            .await
            .map_err(|e| ComputeError::Transport(e.to_string()))?;

        into_operation_response(response).await
    }
}

async fn into_operation_response(response: Response) -> Result<OperationResponse, ComputeError> {
    let status = response.status();
    let request_id = header_value(&response, "x-ms-request-id");
    let async_operation = header_value(&response, "azure-asyncoperation");

    let text = response
        .text()
        .await
        .map_err(|e| ComputeError::Transport(e.to_string()))?;

    if !status.is_success() {
        debug!(status = status.as_u16(), ?request_id, "create-or-update rejected");
        return Err(parse_error_body(status, &text));
    }

    debug!(status = status.as_u16(), ?request_id, "create-or-update accepted");
    Ok(OperationResponse {
        status_code: status.as_u16(),
        request_id,
        async_operation,
        body: parse_body(&text),
    })
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Body of a successful response; non-JSON text is kept as a string
fn parse_body(text: &str) -> JsonValue {
    if text.trim().is_empty() {
        return JsonValue::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| JsonValue::String(text.to_string()))
}

/// Map an error response to [`ComputeError::Service`], reading the ARM error envelope when present
fn parse_error_body(status: StatusCode, text: &str) -> ComputeError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (None, None),
    };

    let message = message
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    ComputeError::Service {
        status: status.as_u16(),
        code,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> ComputeClient {
        ComputeClient::new(
            "sub-1".to_string(),
            "token".to_string(),
            ClientOptions {
                endpoint: endpoint.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_vm_url() {
        let c = client("https://management.azure.com/");
        assert_eq!(
            c.vm_url("rg1", "vm1"),
            "https://management.azure.com/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1"
        );
    }

    #[test]
    fn test_vm_url_encodes_segments() {
        let c = client("http://127.0.0.1:8080");
        assert!(c.vm_url("my rg", "vm/1").ends_with("resourceGroups/my%20rg/providers/Microsoft.Compute/virtualMachines/vm%2F1"));
    }

    #[test]
    fn test_parse_error_envelope() {
        let err = parse_error_body(
            StatusCode::CONFLICT,
            r#"{"error":{"code":"OperationNotAllowed","message":"Quota exceeded"}}"#,
        );
        assert_eq!(
            err,
            ComputeError::Service {
                status: 409,
                code: Some("OperationNotAllowed".to_string()),
                message: "Quota exceeded".to_string(),
            }
        );
        assert_eq!(err.to_string(), "HTTP 409 (OperationNotAllowed): Quota exceeded");
    }

    #[test]
    fn test_parse_error_plain_text() {
        let err = parse_error_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.to_string(), "HTTP 502: upstream down");
    }

    #[test]
    fn test_parse_error_empty_body_uses_reason() {
        let err = parse_error_body(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), JsonValue::Null);
        assert_eq!(parse_body(r#"{"name":"vm1"}"#)["name"], "vm1");
        assert_eq!(parse_body("ok"), JsonValue::String("ok".to_string()));
    }
}
