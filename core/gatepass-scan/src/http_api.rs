//! HTTP binding of [`GateApi`] against the gate backend.
//!
//! All endpoints live under `{api_base_url}/security`. Non-2xx responses carry
//! a `{ "message": ... }` body which is surfaced to the operator verbatim.

use gatepass_core::{ApiError, Entry, GateApi, RecordEntryRequest, ScannerConfig, VerifiedSubject};
use gatepass_protocol::{CrossHostelReasonRequest, ErrorBody, VerifyScanRequest};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;

const CONNECT_TIMEOUT_MS: u64 = 3_000;

pub struct HttpGateApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
}

impl HttpGateApi {
    pub fn new(config: &ScannerConfig) -> Result<Self, String> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS));
        if !config.request_timeout.is_zero() {
            builder = builder.timeout(config.request_timeout);
        }
        let client = builder.build().map_err(|err| err.to_string())?;
        let base_url = parse_base_url(&config.api_base_url)?;

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone().filter(|token| !token.is_empty()),
            timeout: config.request_timeout,
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        endpoint_url(&self.base_url, segments)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|err| self.transport_error(operation, err))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| self.transport_error(operation, err))?;

        if status.is_success() {
            tracing::debug!(operation, status = status.as_u16(), "Backend call succeeded");
            Ok(body)
        } else {
            tracing::debug!(operation, status = status.as_u16(), "Backend call rejected");
            Err(error_for_status(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ))
        }
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(operation, request)?;
        serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    fn transport_error(&self, operation: &'static str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                operation,
                after: self.timeout,
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl GateApi for HttpGateApi {
    fn verify_scan(
        &self,
        subject_identifier: &str,
        encrypted_body: &str,
    ) -> Result<VerifiedSubject, ApiError> {
        let body = VerifyScanRequest {
            email: subject_identifier.to_string(),
            encrypted_data: encrypted_body.to_string(),
        };
        let request = self
            .client
            .post(self.url(&["security", "verify-scan"]))
            .json(&body);
        self.send_json("verify_scan", request)
    }

    fn record_entry(&self, request: &RecordEntryRequest) -> Result<Entry, ApiError> {
        let builder = self.client.post(self.url(&["security", "entries"])).json(request);
        self.send_json("record_entry", builder)
    }

    fn list_recent_entries(&self) -> Result<Vec<Entry>, ApiError> {
        let request = self.client.get(self.url(&["security", "entries", "recent"]));
        self.send_json("list_recent_entries", request)
    }

    fn set_cross_hostel_reason(&self, entry_id: &str, reason: &str) -> Result<(), ApiError> {
        let body = CrossHostelReasonRequest {
            reason: reason.to_string(),
        };
        let url = self.url(&["security", "entries", entry_id, "reason"]);
        let request = self.client.put(url).json(&body);
        self.send("set_cross_hostel_reason", request).map(|_| ())
    }
}

fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|err| format!("invalid api_base_url {:?}: {}", raw, err))?;
    if url.cannot_be_a_base() {
        return Err(format!("invalid api_base_url {:?}: not a base URL", raw));
    }
    Ok(url)
}

/// Appends path segments to the base, percent-encoding each one.
fn endpoint_url(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn error_for_status(status: u16, reason: Option<&str>, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.best_message().map(str::to_string))
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status == 404 {
        ApiError::NotFound { message }
    } else {
        ApiError::Rejected { status, message }
    }
}
