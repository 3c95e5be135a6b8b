//! OpenStack orchestration client utilities.
//!
//! This module provides a small client for pulling resource type catalogs out
//! of a running OpenStack instance. It covers:
//!
//! - Password authentication against the Keystone identity service
//! - Discovering the orchestration (Heat) endpoint from the service catalog
//! - Listing resource types and fetching their full descriptors
//!
//! The primary entry point is [`OrchestrationClient`]. Create an instance via
//! [`OrchestrationClient::login`], then call
//! [`OrchestrationClient::download_catalog`].
//!
//! Network and authentication failures surface unchanged to the caller; the
//! client never retries.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use hotschema_types::{ResourceTypeCatalog, ResourceTypeDescriptor, ResourceTypeSummary};
use reqwest::{Client, Url, header};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Environment variable consulted when no password is given explicitly.
pub const OS_PASSWORD_VAR: &str = "OS_PASSWORD";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin wrapper around a configured `reqwest::Client` scoped to one
/// orchestration endpoint, authenticated with a Keystone token.
#[derive(Debug, Clone)]
pub struct OrchestrationClient {
    http: Client,
    heat_url: String,
}

impl OrchestrationClient {
    /// Authenticate against Keystone and discover the orchestration endpoint.
    ///
    /// Requests a token via the password method, scoped to `project_id` when
    /// given and unscoped otherwise. Unscoped tokens usually come without a
    /// service catalog, in which case the error advises passing a project id
    /// (matching the service's behavior).
    pub async fn login(
        keystone_url: &str,
        username: &str,
        password: &str,
        project_id: Option<&str>,
    ) -> Result<Self> {
        validate_keystone_url(keystone_url)?;

        let login_http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        let token_url = format!("{}/auth/tokens", keystone_url.trim_end_matches('/'));
        debug!(%token_url, "requesting keystone token");

        let response = login_http
            .post(&token_url)
            .json(&auth_request(username, password, project_id))
            .send()
            .await
            .context("keystone token request")?
            .error_for_status()
            .context("keystone rejected the login")?;

        let token = response
            .headers()
            .get("x-subject-token")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("keystone response is missing the X-Subject-Token header"))?;
        let body: Value = response.json().await.context("parse keystone token response")?;
        let heat_url = orchestration_endpoint(&body)?;
        info!(%heat_url, "discovered orchestration endpoint");

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            "X-Auth-Token",
            header::HeaderValue::from_str(&token).context("token is not a valid header value")?,
        );
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;

        Ok(Self { http, heat_url })
    }

    /// List the resource types the orchestration service knows, with their
    /// short descriptions.
    pub async fn list_resource_types(&self) -> Result<Vec<ResourceTypeSummary>> {
        let url = format!("{}/resource_types?with_description=true", self.heat_url);
        debug!(%url, "listing resource types");
        let body: Value = self
            .http
            .get(&url)
            .send()
            .await
            .context("resource type listing request")?
            .error_for_status()?
            .json()
            .await
            .context("parse resource type listing")?;
        let summaries = body
            .get("resource_types")
            .cloned()
            .ok_or_else(|| anyhow!("resource type listing is missing the resource_types array"))?;
        serde_json::from_value(summaries).context("decode resource type listing")
    }

    /// Fetch the full descriptor of one resource type.
    pub async fn fetch_resource_type(&self, name: &str) -> Result<ResourceTypeDescriptor> {
        let url = format!("{}/resource_types/{}", self.heat_url, name);
        debug!(%url, "fetching resource type");
        self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request resource type {name}"))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decode resource type {name}"))
    }

    /// Download the whole catalog: list, then fetch every type's descriptor,
    /// assembling the map sorted by name. The listing's short description
    /// fills in for types whose detail payload carries none.
    pub async fn download_catalog(&self) -> Result<ResourceTypeCatalog> {
        let mut summaries = self.list_resource_types().await?;
        summaries.sort_by(|a, b| a.resource_type.cmp(&b.resource_type));
        info!(count = summaries.len(), "downloading resource type details");

        let mut catalog = ResourceTypeCatalog::default();
        for summary in summaries {
            let mut descriptor = self
                .fetch_resource_type(&summary.resource_type)
                .await
                .with_context(|| format!("download {}", summary.resource_type))?;
            if descriptor.description.is_none() {
                descriptor.description = summary.description;
            }
            catalog.resource_types.insert(summary.resource_type, descriptor);
        }
        Ok(catalog)
    }
}

/// Resolve the login password from an explicit value or [`OS_PASSWORD_VAR`].
pub fn resolve_password(explicit: Option<String>) -> Result<String> {
    explicit
        .or_else(|| env::var(OS_PASSWORD_VAR).ok())
        .ok_or_else(|| anyhow!("no password given; pass --password or set {OS_PASSWORD_VAR}"))
}

/// The Keystone URL must be an absolute http(s) URL with a host.
fn validate_keystone_url(base: &str) -> Result<()> {
    let parsed = Url::parse(base).map_err(|e| anyhow!("invalid keystone URL '{}': {}", base, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "keystone URL must use http or https; got '{}://'",
            parsed.scheme()
        ));
    }
    if parsed.host_str().is_none() {
        return Err(anyhow!("keystone URL must include a host"));
    }
    Ok(())
}

/// The password-method token request body.
fn auth_request(username: &str, password: &str, project_id: Option<&str>) -> Value {
    let scope = match project_id {
        Some(id) => json!({ "project": { "id": id } }),
        None => Value::String("unscoped".to_string()),
    };
    json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": username,
                        "domain": { "id": "default" },
                        "password": password
                    }
                }
            },
            "scope": scope
        }
    })
}

/// Locate the orchestration service's public endpoint in a token response.
fn orchestration_endpoint(token_body: &Value) -> Result<String> {
    let services = token_body
        .pointer("/token/catalog")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("no service catalog available; try passing a project id"))?;
    let orchestration = services
        .iter()
        .find(|service| service.get("type").and_then(Value::as_str) == Some("orchestration"))
        .ok_or_else(|| anyhow!("service catalog has no orchestration service"))?;
    let endpoint = orchestration
        .get("endpoints")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|endpoint| endpoint.get("interface").and_then(Value::as_str) == Some("public"))
        .ok_or_else(|| anyhow!("orchestration service has no public endpoint"))?;
    endpoint
        .get("url")
        .and_then(Value::as_str)
        .map(|url| url.trim_end_matches('/').to_string())
        .ok_or_else(|| anyhow!("orchestration endpoint has no url"))
}
