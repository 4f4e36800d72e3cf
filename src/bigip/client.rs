//! BIG-IP iControl REST client
//!
//! Only what object listing needs: authenticated GETs under `/mgmt/tm/ltm`.

use super::error::BigIpError;
use super::{ObjectLister, ObjectListing};
use crate::config::BigIpConfig;
use crate::metrics;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Root of the LTM configuration tree
const LTM_ROOT: &str = "/mgmt/tm/ltm";

/// REST client for one BIG-IP device
pub struct BigIpClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for BigIpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigIpClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BigIpClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`BigIpError::MissingSetting`] if host or credentials are
    /// absent, or [`BigIpError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BigIpConfig) -> Result<Self, BigIpError> {
        let host = required(&config.host, "host")?;
        let username = required(&config.username, "username")?;
        let password = required(&config.password, "password")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url(host),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// URL prefix requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a REST path and decode the JSON body
    async fn load(&self, path: &str) -> Result<Value, BigIpError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        metrics::BIGIP_REQUESTS_TOTAL
            .with_label_values(&[status.as_str()])
            .inc();

        let body = response.text().await?;
        if !status.is_success() {
            return Err(BigIpError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| BigIpError::UnexpectedPayload(e.to_string()))
    }
}

#[async_trait]
impl ObjectLister for BigIpClient {
    async fn list_objects(
        &self,
        obj_type: &str,
        obj_name: Option<&str>,
    ) -> Result<ObjectListing, BigIpError> {
        validate_object_type(obj_type)?;

        match obj_name.filter(|name| !name.is_empty()) {
            None => {
                let body = self.load(&format!("{}/{}", LTM_ROOT, obj_type)).await?;
                let names = collection_names(&body)?;
                info!("Listed {} {} objects", names.len(), obj_type);
                Ok(ObjectListing::Names(names))
            }
            Some(name) => {
                let encoded = encode_object_name(name)?;
                let body = self
                    .load(&format!("{}/{}/{}", LTM_ROOT, obj_type, encoded))
                    .await?;
                match body {
                    Value::Object(properties) => {
                        info!("Loaded {} {}", obj_type, name);
                        Ok(ObjectListing::Objects(vec![properties]))
                    }
                    other => Err(BigIpError::UnexpectedPayload(format!(
                        "expected an object, got {}",
                        json_kind(&other)
                    ))),
                }
            }
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, BigIpError> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(BigIpError::MissingSetting(name))
}

/// `10.1.1.4` -> `https://10.1.1.4`; values with a scheme are kept
fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

/// Object types are LTM collection paths such as `pool` or `monitor/http`
fn validate_object_type(obj_type: &str) -> Result<(), BigIpError> {
    let valid_segment = |segment: &str| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };

    if obj_type.split('/').all(valid_segment) {
        Ok(())
    } else {
        Err(BigIpError::InvalidObjectType(obj_type.to_string()))
    }
}

/// Rewrite a full path name into the REST form: `/Common/web` -> `~Common~web`
fn encode_object_name(name: &str) -> Result<String, BigIpError> {
    let forbidden = |c: char| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#' | '%');
    if name.chars().any(forbidden) || name.split('/').any(|segment| segment == "..") {
        return Err(BigIpError::InvalidObjectName(name.to_string()));
    }
    Ok(name.replace('/', "~"))
}

/// Names of the entries of a collection response
///
/// A collection with no members has no `items` key at all.
fn collection_names(body: &Value) -> Result<Vec<String>, BigIpError> {
    match body.get("items") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect()),
        Some(other) => Err(BigIpError::UnexpectedPayload(format!(
            "expected 'items' to be an array, got {}",
            json_kind(other)
        ))),
    }
}

/// Prefer the appliance's `message` field over the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
