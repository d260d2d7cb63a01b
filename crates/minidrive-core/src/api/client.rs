//! API client for communicating with the Mini Drive REST API.
//!
//! This module provides the `ApiClient` struct for the auth endpoints and
//! the bearer-authenticated file endpoints.

use std::path::Path;
use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Credentials;
use crate::models::{FileRecord, Reply};
use crate::utils::truncate_string;

use super::ApiError;

/// Maximum length for response bodies written to the debug log
const MAX_LOGGED_BODY_LENGTH: usize = 500;

/// Message for listing replies that do not carry a `files` array.
pub const INVALID_FORMAT: &str = "Invalid response format";

/// Body of a successful download.
pub enum Payload {
    /// File bytes still to be read from the response.
    Streamed(Response),
    /// File bytes already read.
    Buffered(Vec<u8>),
}

/// API client for the Mini Drive service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client for the service at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ApiError::Validation(format!("Invalid service address {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Validation(format!(
                "Invalid service address {}",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL. Each segment is percent-encoded as a single
    /// path segment, so file names can never escape their route.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turn a non-success response into a `Rejected` error carrying the
    /// server's `error` message, if it sent one.
    async fn reject(response: Response) -> ApiError {
        let status = response.status();
        let body = response.bytes().await.unwrap_or_default();
        debug!(
            %status,
            body = %truncate_string(&String::from_utf8_lossy(&body), MAX_LOGGED_BODY_LENGTH),
            "Request rejected"
        );
        ApiError::rejected(status, Reply::parse(&body).error)
    }

    async fn reply(response: Response) -> Result<Reply, ApiError> {
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let body = response.bytes().await?;
        Ok(Reply::parse(&body))
    }

    /// Check that the service answers at all.
    pub async fn health(&self) -> Result<bool, ApiError> {
        let response = self.client.get(self.base_url.clone()).send().await?;
        Ok(response.status().is_success())
    }

    /// Exchange credentials for a bearer token.
    /// A success status without a `token` field is still a failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let url = self.endpoint(&["login"]);
        debug!(username = credentials.username(), "POST /login");

        let response = self.client.post(url).json(credentials).send().await?;
        let status = response.status();
        let reply = Self::reply(response).await?;

        match reply.token.filter(|t| !t.is_empty()) {
            Some(token) => Ok(token),
            None => Err(ApiError::rejected(status, reply.error)),
        }
    }

    /// Register a new account. No token is issued.
    pub async fn signup(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.endpoint(&["signup"]);
        debug!(username = credentials.username(), "POST /signup");

        let response = self.client.post(url).json(credentials).send().await?;
        Self::reply(response).await?;
        Ok(())
    }

    /// Upload a local file as the multipart field `file`.
    /// Returns the name the server stored it under.
    pub async fn upload(&self, token: Option<&str>, path: &Path) -> Result<String, ApiError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::Validation("Please select a file to upload.".to_string()))?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let data = tokio::fs::read(path).await?;
        debug!(file = %file_name, bytes = data.len(), %mime, "POST /upload");

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(mime.as_ref())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = self.endpoint(&["upload"]);
        let response = Self::authorized(self.client.post(url), token)
            .multipart(form)
            .send()
            .await?;
        let reply = Self::reply(response).await?;
        Ok(reply.filename.unwrap_or(file_name))
    }

    /// Fetch the full current file set.
    pub async fn list_files(&self, token: Option<&str>) -> Result<Vec<FileRecord>, ApiError> {
        let url = self.endpoint(&["files"]);
        debug!("GET /files");

        let response = Self::authorized(self.client.get(url), token).send().await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|_| ApiError::InvalidResponse(INVALID_FORMAT.to_string()))?;
        parse_file_list(value)
    }

    /// Fetch a file's content.
    ///
    /// The service may answer with the bytes themselves or with a JSON
    /// object holding a short-lived `url` to fetch them from; the second
    /// request carries no bearer header.
    pub async fn download(&self, token: Option<&str>, filename: &str) -> Result<Payload, ApiError> {
        let url = self.endpoint(&["download", filename]);
        debug!(file = filename, "GET /download");

        let response = Self::authorized(self.client.get(url), token).send().await?;
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }
        if !is_json(&response) {
            return Ok(Payload::Streamed(response));
        }

        let body = response.bytes().await?;
        match Reply::parse(&body).url {
            Some(link) => {
                debug!(file = filename, "Following download link");
                let link = Url::parse(&link).map_err(|e| {
                    ApiError::InvalidResponse(format!("Bad download link: {}", e))
                })?;
                let response = self.client.get(link).send().await?;
                if !response.status().is_success() {
                    warn!(file = filename, status = %response.status(), "Download link failed");
                    return Err(Self::reject(response).await);
                }
                Ok(Payload::Streamed(response))
            }
            None => Ok(Payload::Buffered(body.to_vec())),
        }
    }

    /// Delete a file. Irreversible.
    pub async fn delete(&self, token: Option<&str>, filename: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["delete", filename]);
        debug!(file = filename, "DELETE /delete");

        let response = Self::authorized(self.client.delete(url), token).send().await?;
        Self::reply(response).await?;
        Ok(())
    }

    /// Ask the server for a shareable link to one file.
    pub async fn share(&self, token: Option<&str>, filename: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["share", filename]);
        debug!(file = filename, "POST /share");

        let response = Self::authorized(self.client.post(url), token).send().await?;
        let status = response.status();
        let reply = Self::reply(response).await?;
        match reply.share_url.filter(|u| !u.is_empty()) {
            Some(url) => Ok(url),
            None => Err(ApiError::rejected(status, reply.error)),
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Extract the `files` array from a listing reply.
/// Anything other than an object with a well-formed `files` array is
/// rejected whole; no partial list is returned.
fn parse_file_list(value: Value) -> Result<Vec<FileRecord>, ApiError> {
    let files = match value {
        Value::Object(mut map) => match map.remove("files") {
            Some(files @ Value::Array(_)) => files,
            _ => return Err(ApiError::InvalidResponse(INVALID_FORMAT.to_string())),
        },
        _ => return Err(ApiError::InvalidResponse(INVALID_FORMAT.to_string())),
    };
    serde_json::from_value(files).map_err(|_| ApiError::InvalidResponse(INVALID_FORMAT.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).expect("client builds")
    }

    #[test]
    fn test_parse_file_list() {
        let files = parse_file_list(json!({
            "files": [{"filename": "a.txt", "uploaded": "t1", "s3_key": "u/a.txt"}]
        }))
        .expect("valid listing");
        assert_eq!(files, vec![FileRecord::new("a.txt", "t1")]);
    }

    #[test]
    fn test_parse_file_list_empty_array() {
        assert!(parse_file_list(json!({"files": []})).unwrap().is_empty());
    }

    #[test]
    fn test_parse_file_list_keeps_record_without_timestamp() {
        let files = parse_file_list(json!({
            "files": [
                {"filename": "a.txt", "uploaded": "t1"},
                {"filename": "b.txt"}
            ]
        }))
        .expect("valid listing");
        assert_eq!(
            files,
            vec![FileRecord::new("a.txt", "t1"), FileRecord::new("b.txt", "")]
        );
    }

    #[test]
    fn test_parse_file_list_rejects_other_shapes() {
        for value in [
            json!({}),
            json!({"files": null}),
            json!({"files": {"filename": "a.txt"}}),
            json!([{"filename": "a.txt", "uploaded": "t1"}]),
            json!({"files": [{"uploaded": "t1"}]}),
            json!({"files": ["a.txt"]}),
        ] {
            let err = parse_file_list(value.clone()).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidResponse(ref m) if m == INVALID_FORMAT),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_endpoint_encodes_filename() {
        let api = client("http://127.0.0.1:5000");
        assert_eq!(
            api.endpoint(&["download", "my report.pdf"]).as_str(),
            "http://127.0.0.1:5000/download/my%20report.pdf"
        );
        assert_eq!(
            api.endpoint(&["delete", "../etc/passwd"]).as_str(),
            "http://127.0.0.1:5000/delete/..%2Fetc%2Fpasswd"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://files.example.com/api/");
        assert_eq!(
            api.endpoint(&["files"]).as_str(),
            "https://files.example.com/api/files"
        );
    }

    #[test]
    fn test_invalid_base_address() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(ApiError::Validation(_))
        ));
    }
}
