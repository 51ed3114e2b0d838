//! HTTP access to the manifest metadata service and its archives.

use crate::error::{ErrorKind, Result};
use crate::{ManifestDescriptor, ManifestSource};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Response, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// Metadata endpoint, relative to the base URL.
pub const MANIFEST_ENDPOINT: &str = "/Platform/Destiny2/Manifest/";
const API_KEY_HEADER: &str = "X-API-Key";
// The service reports its own status inside a 200 response; 1 means "Success".
const SUCCESS_CODE: i64 = 1;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope<T> {
    response: Option<T>,
    error_code: i64,
    #[serde(default)]
    error_status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestResponse {
    version: String,
    mobile_world_content_paths: HashMap<String, String>,
}

/// Client for the metadata service host.
///
/// Remote paths handed out by the service are relative to the same host, so
/// one client both asks where the manifest is and downloads it.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).or_raise(|| ErrorKind::Client)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { http, base_url, api_key })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a remote path (as reported by the metadata service) against
    /// the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).or_raise(|| ErrorKind::InvalidPath(path.to_string()))
    }

    /// Download a full response body.
    ///
    /// Any non-2xx status is an error; the body of an error page is never
    /// handed back as if it were the requested artifact.
    #[instrument(skip(self), fields(url = %url, bytes))]
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let response = self.http.get(url.clone()).send().await.or_raise(|| ErrorKind::Network)?;
        let body = Self::check_status(response)?.bytes().await.or_raise(|| ErrorKind::Network)?;
        tracing::Span::current().record("bytes", body.len());
        Ok(Vec::from(body))
    }

    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl ManifestSource for HttpClient {
    #[instrument(skip(self))]
    async fn descriptor(&self) -> Result<ManifestDescriptor> {
        let mut request = self.http.get(self.url(MANIFEST_ENDPOINT)?);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        let response = request.send().await.or_raise(|| ErrorKind::Network)?;
        let body = Self::check_status(response)?.bytes().await.or_raise(|| ErrorKind::Network)?;
        let envelope: Envelope<ManifestResponse> =
            serde_json::from_slice(&body).or_raise(|| ErrorKind::InvalidResponse)?;
        let manifest = match envelope {
            Envelope { response: Some(manifest), error_code: SUCCESS_CODE, .. } => manifest,
            Envelope { error_code, error_status, .. } => exn::bail!(ErrorKind::Service(error_code, error_status)),
        };
        tracing::debug!(
            version = %manifest.version,
            locales = manifest.mobile_world_content_paths.len(),
            "Manifest metadata received"
        );
        Ok(ManifestDescriptor::new(manifest.version, manifest.mobile_world_content_paths))
    }
}
