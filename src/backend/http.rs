//! `HttpBackend` — the Vault HTTP API over a blocking `ureq` agent.
//!
//! Every call is a single request governed by the agent's global timeout.
//! Nothing is retried: a failed write must never be silently repeated.

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;
use ureq::http::{Response, StatusCode};
use ureq::tls::{Certificate, ClientCert, PrivateKey, TlsConfig};
use ureq::{Agent, Body};
use zeroize::Zeroizing;

use crate::config::VaultInstance;
use crate::engine::KvVersion;
use crate::errors::{Result, VaultUtilError};

use super::{kv_relative_path, BackendError, MountContext, MountMap, SecretBackend, SecretData};

/// Header carrying the client token on every request.
const TOKEN_HEADER: &str = "X-Vault-Token";

/// Upper bound on a single request, connect to last byte.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A connection to one Vault server.
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
    token: Zeroizing<String>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Build a client for `instance`, applying its TLS settings.
    pub fn connect(instance: &VaultInstance) -> Result<Self> {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .tls_config(tls_config(instance)?)
            .build();

        debug!(url = %instance.url, "created vault client");

        Ok(Self {
            agent: Agent::new_with_config(config),
            base_url: instance.url.trim_end_matches('/').to_string(),
            token: Zeroizing::new(instance.token.clone()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_json(&self, path: &str, list: bool) -> std::result::Result<Value, BackendError> {
        let url = self.url(path);
        let mut request = self
            .agent
            .get(url.as_str())
            .header(TOKEN_HEADER, self.token.as_str());
        if list {
            request = request.query("list", "true");
        }

        let response = request
            .call()
            .map_err(|e| BackendError::Transport(format!("GET {url}: {e}")))?;
        let mut response = check_status(response, path)?;

        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|e| BackendError::Decode(format!("{path}: {e}")))
    }
}

impl SecretBackend for HttpBackend {
    fn write_at(
        &self,
        path: &str,
        data: &SecretData,
        mount: MountContext<'_>,
    ) -> std::result::Result<(), BackendError> {
        let body = match mount.version {
            KvVersion::V2 => json!({ "data": data }),
            KvVersion::V1 => json!(data),
        };

        let url = self.url(path);
        debug!(%path, version = %mount.version, "writing secret");
        let response = self
            .agent
            .post(url.as_str())
            .header(TOKEN_HEADER, self.token.as_str())
            .send_json(&body)
            .map_err(|e| BackendError::Transport(format!("POST {url}: {e}")))?;
        check_status(response, path)?;
        Ok(())
    }

    fn read_at(
        &self,
        path: &str,
        mount: MountContext<'_>,
    ) -> std::result::Result<SecretData, BackendError> {
        debug!(%path, version = %mount.version, "reading secret");
        let body = self.get_json(path, false)?;

        secret_payload(&body, mount.version, path)
    }

    fn list_at(
        &self,
        path: &str,
        mount: MountContext<'_>,
    ) -> std::result::Result<Vec<String>, BackendError> {
        let endpoint = list_endpoint(path, mount)?;
        debug!(%path, %endpoint, "listing");
        let body = self.get_json(&endpoint, true)?;
        listing_keys(&body, &endpoint)
    }

    fn describe_mounts(&self) -> std::result::Result<MountMap, BackendError> {
        debug!("fetching mount table");
        let body = self.get_json("sys/mounts", false)?;

        // Newer servers nest the table under `data`; older ones return it bare.
        match body {
            Value::Object(mut top) => match top.remove("data") {
                Some(Value::Object(data)) => Ok(data),
                _ => Ok(top),
            },
            _ => Err(BackendError::Decode(
                "sys/mounts: response is not an object".into(),
            )),
        }
    }
}

/// Pass a 2xx response through; anything else becomes a `BackendError`.
fn check_status(
    mut response: Response<Body>,
    path: &str,
) -> std::result::Result<Response<Body>, BackendError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }
    let body = response.body_mut().read_json::<Value>().ok();
    Err(status_error(status, path, body.as_ref()))
}

/// Classify a failed response.
///
/// A 404 is the only status that means "path absent". Whatever the body
/// says does not change that.
fn status_error(status: u16, path: &str, body: Option<&Value>) -> BackendError {
    if status == 404 {
        return BackendError::NotFound {
            path: path.to_string(),
        };
    }

    let message = body.and_then(vault_errors).unwrap_or_else(|| {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("request failed")
            .to_string()
    });

    BackendError::Status {
        status,
        path: path.to_string(),
        message,
    }
}

/// API path to list the physical directory `path`.
///
/// v2 listings go through `metadata/`: `secret/data/app/` is listed at
/// `secret/metadata/app/`.
fn list_endpoint(path: &str, mount: MountContext<'_>) -> std::result::Result<String, BackendError> {
    let relative = kv_relative_path(path, mount)?;
    Ok(match mount.version {
        KvVersion::V2 => format!("{}metadata/{relative}", mount.mount),
        KvVersion::V1 => path.to_string(),
    })
}

/// Child names from a `?list=true` response.
fn listing_keys(body: &Value, endpoint: &str) -> std::result::Result<Vec<String>, BackendError> {
    let keys = body
        .pointer("/data/keys")
        .and_then(Value::as_array)
        .ok_or_else(|| BackendError::Decode(format!("{endpoint}: listing has no keys")))?;

    Ok(keys
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Secret data from a read response: `data` for v1, `data.data` for v2.
fn secret_payload(
    body: &Value,
    version: KvVersion,
    path: &str,
) -> std::result::Result<SecretData, BackendError> {
    let pointer = match version {
        KvVersion::V2 => "/data/data",
        KvVersion::V1 => "/data",
    };

    match body.pointer(pointer) {
        Some(Value::Object(map)) => Ok(map.clone().into_iter().collect()),
        _ => Err(BackendError::Decode(format!(
            "{path}: response carries no secret data"
        ))),
    }
}

/// Join the `errors` array of a Vault error body.
fn vault_errors(body: &Value) -> Option<String> {
    let errors: Vec<&str> = body
        .get("errors")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

/// Build the TLS settings for a vault instance.
///
/// `skip_tls_verify` wins over everything else. A stored certificate and key
/// are presented as the client certificate. Otherwise the platform roots are
/// used as-is.
fn tls_config(instance: &VaultInstance) -> Result<TlsConfig> {
    if instance.skip_tls_verify {
        debug!("skipping all tls verification");
        return Ok(TlsConfig::builder().disable_verification(true).build());
    }

    match (&instance.ca_cert, &instance.ca_cert_key) {
        (Some(cert), Some(key)) => {
            debug!("using stored certificate and key for tls");
            let cert = Certificate::from_pem(cert.as_bytes()).map_err(|e| {
                VaultUtilError::InvalidConnection(format!("unreadable certificate: {e}"))
            })?;
            let key = PrivateKey::from_pem(key.as_bytes()).map_err(|e| {
                VaultUtilError::InvalidConnection(format!("unreadable certificate key: {e}"))
            })?;
            Ok(TlsConfig::builder()
                .client_cert(Some(ClientCert::new_with_certs(&[cert], key)))
                .build())
        }
        _ => {
            debug!("no tls information provided, assuming known cert");
            Ok(TlsConfig::builder().build())
        }
    }
}
