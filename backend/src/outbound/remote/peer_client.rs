//! Shared reqwest plumbing for calls into peer record services.
//!
//! Owns transport details only: URL building, the per-client timeout,
//! trace propagation, status mapping and JSON decoding.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::ports::RemoteReferenceError;
use crate::domain::{TRACE_ID_HEADER, TraceId};

/// HTTP client bound to one peer base URL.
#[derive(Debug, Clone)]
pub(super) struct PeerClient {
    client: Client,
    base: Url,
}

impl PeerClient {
    pub(super) fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// GET `path` and decode a JSON body.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RemoteReferenceError> {
        let response = self.send(path, query).await?;
        decode(response).await
    }

    /// GET `path`, mapping a 404 to `Ok(None)`.
    pub(super) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, RemoteReferenceError> {
        let response = self.send(path, query).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    async fn send(&self, path: &str, query: &[(&str, String)]) -> Result<Response, RemoteReferenceError> {
        let url = endpoint(&self.base, path)?;
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        if let Some(trace_id) = TraceId::current() {
            request = request.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        debug!(peer = %self.base, path, "calling peer service");
        request.send().await.map_err(map_transport_error)
    }
}

/// Append `path` to the base URL, keeping any prefix the base carries.
fn endpoint(base: &Url, path: &str) -> Result<Url, RemoteReferenceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| RemoteReferenceError::transport(format!("peer url {base} cannot take a path")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    Ok(url)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteReferenceError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }
    serde_json::from_slice(body.as_ref()).map_err(|error| {
        RemoteReferenceError::decode(format!("invalid peer JSON payload: {error}"))
    })
}

/// Comma-separated identity list for `by-ids` calls.
pub(super) fn id_list<I: std::fmt::Display>(ids: &[I]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn map_transport_error(error: reqwest::Error) -> RemoteReferenceError {
    if error.is_timeout() {
        RemoteReferenceError::timeout(error.to_string())
    } else if error.is_decode() {
        RemoteReferenceError::decode(error.to_string())
    } else {
        RemoteReferenceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RemoteReferenceError {
    let preview = body_preview(body);
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RemoteReferenceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => RemoteReferenceError::status(status.as_u16(), preview),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
