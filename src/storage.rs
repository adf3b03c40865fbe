//! Object store access: listing portrait prefixes and downloading objects.

use crate::error::PortraitError;
use crate::types::{RemoteObject, SyncConfig};
use async_trait::async_trait;
use base64::Engine;
use futures_util::StreamExt;
use md5::{Digest, Md5};
use reqwest::{RequestBuilder, Response, Url};
use serde::Deserialize;
use std::io;
use tracing::{debug, info, warn};

/// Upper bound on the buffer reserved up front from a Content-Length header.
const MAX_PREALLOCATION: u64 = 64 << 20;

/// Read-only operations the sync needs from a bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Lists every object whose name starts with `prefix`, in listing order.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<RemoteObject>, PortraitError>;

    /// Downloads the full contents of an object.
    async fn download(&self, object: &RemoteObject) -> Result<Vec<u8>, PortraitError>;
}

/// One page of `objects.list` results.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ObjectListing {
    #[serde(default)]
    items: Vec<ObjectResource>,
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    name: String,
    /// The JSON API reports sizes as decimal strings.
    size: Option<String>,
    md5_hash: Option<String>,
}

impl From<ObjectResource> for RemoteObject {
    fn from(resource: ObjectResource) -> Self {
        Self {
            size: resource.size.and_then(|s| s.parse().ok()),
            name: resource.name,
            md5_hash: resource.md5_hash,
        }
    }
}

/// Google Cloud Storage client over the JSON API.
#[derive(Debug, Clone)]
pub struct GcsClient {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_token: Option<String>,
    skip_verify: bool,
}

impl GcsClient {
    /// Creates a client for the bucket and endpoint in `config`.
    pub fn new(config: &SyncConfig) -> Result<Self, PortraitError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("portraitsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
            skip_verify: config.skip_verify,
        })
    }

    /// Builds `{endpoint}/storage/v1/b/{bucket}/o`, plus `extra` as a
    /// percent-encoded trailing segment.
    fn objects_url(&self, extra: Option<&str>) -> Result<Url, PortraitError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            PortraitError::DownloadFailed(format!("Invalid endpoint {}: {}", self.endpoint, e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                PortraitError::DownloadFailed(format!(
                    "Endpoint {} cannot be used as a base URL",
                    self.endpoint
                ))
            })?;
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", self.bucket.as_str(), "o"]);
            if let Some(name) = extra {
                segments.push(name);
            }
        }
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Buffer size to reserve for a download; the header is only a hint.
fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.map_or(0, |len| len.min(MAX_PREALLOCATION) as usize)
}

/// Turns non-success statuses into a readable error.
fn check_status(response: Response, what: &str) -> Result<Response, PortraitError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    if status.as_u16() == 404 {
        return Err(PortraitError::DownloadFailed(format!(
            "{} not found (HTTP 404): {}\n\
             This usually means:\n\
             - The bucket name is wrong\n\
             - The object was removed after it was listed",
            what, url
        )));
    }
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(PortraitError::DownloadFailed(format!(
            "Access denied for {} (HTTP {}): {}\n\
             Set GOOGLE_OAUTH_ACCESS_TOKEN or pass --access-token for private buckets",
            what, status, url
        )));
    }
    Err(PortraitError::DownloadFailed(format!(
        "Failed to fetch {} from {}: HTTP {}",
        what, url, status
    )))
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<RemoteObject>, PortraitError> {
        let mut objects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.get(self.objects_url(None)?).query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = check_status(request.send().await?, "object listing")?;
            let body = response.bytes().await?;
            let listing: ObjectListing = serde_json::from_slice(&body).map_err(|e| {
                warn!("Invalid listing for prefix '{}': {}", prefix, e);
                e
            })?;

            debug!(
                "Listed {} objects under {} (more pages: {})",
                listing.items.len(),
                prefix,
                listing.next_page_token.is_some()
            );
            objects.extend(listing.items.into_iter().map(RemoteObject::from));

            match listing.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn download(&self, object: &RemoteObject) -> Result<Vec<u8>, PortraitError> {
        let mut url = self.objects_url(Some(&object.name))?;
        url.query_pairs_mut().append_pair("alt", "media");

        let response = check_status(self.get(url).send().await?, &object.name)?;
        let content_length = response.content_length();

        let mut hasher = match (&object.md5_hash, self.skip_verify) {
            (Some(_), false) => Some(Md5::new()),
            _ => None,
        };

        let mut data = Vec::with_capacity(initial_capacity(content_length));
        let mut byte_stream = response.bytes_stream();
        while let Some(piece) = byte_stream.next().await {
            let chunk = piece?;
            if let Some(ref mut h) = hasher {
                h.update(&chunk);
            }
            data.extend_from_slice(&chunk);
        }

        if let Some(content_length) = content_length {
            if data.len() as u64 != content_length {
                return Err(PortraitError::IoError(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "Size mismatch for {}: expected {} bytes, got {} bytes",
                        object.name,
                        content_length,
                        data.len()
                    ),
                )));
            }
        } else {
            debug!(
                "Content-Length header was not present for {}. Cannot verify size.",
                object.name
            );
        }

        if let (Some(expected), Some(hasher)) = (&object.md5_hash, hasher) {
            let computed =
                base64::engine::general_purpose::STANDARD.encode(hasher.finalize());
            if &computed != expected {
                warn!("MD5 mismatch for {}", object.name);
                return Err(PortraitError::DownloadFailed(format!(
                    "MD5 mismatch for {}: expected {}, got {}",
                    object.name, expected, computed
                )));
            }
            info!("MD5 verified for {}", object.name);
        }

        Ok(data)
    }
}
