//! Where the current manifest lives, and how to fetch it.
//!
//! The metadata service is an external collaborator behind the
//! [`ManifestSource`] trait: it reports, for the current manifest version,
//! one remote database path per locale. [`HttpClient`] talks to the real
//! service and also downloads the archives it points at; [`StaticSource`]
//! pins a known descriptor without any network access.

pub mod error;
mod http;

pub use crate::http::{HttpClient, MANIFEST_ENDPOINT};
pub use reqwest::Url;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::OptionExt;
use std::collections::HashMap;

/// The current manifest as reported by the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    /// Opaque version string of the published manifest.
    pub version: String,
    /// Remote path (relative to the service host) of the database archive,
    /// keyed by locale.
    pub paths: HashMap<String, String>,
}
impl ManifestDescriptor {
    pub fn new(version: impl Into<String>, paths: HashMap<String, String>) -> Self {
        Self { version: version.into(), paths }
    }

    /// Remote archive path for `locale`.
    pub fn path_for(&self, locale: &str) -> Result<&str> {
        self.paths.get(locale).map(String::as_str).ok_or_raise(|| ErrorKind::MissingLocale(locale.to_string()))
    }
}

/// Anything that can report the current [`ManifestDescriptor`].
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn descriptor(&self) -> Result<ManifestDescriptor>;
}

/// A source that always reports the same descriptor.
#[derive(Debug, Clone)]
pub struct StaticSource(ManifestDescriptor);
impl StaticSource {
    pub fn new(descriptor: ManifestDescriptor) -> Self {
        Self(descriptor)
    }
}
impl From<ManifestDescriptor> for StaticSource {
    fn from(descriptor: ManifestDescriptor) -> Self {
        Self(descriptor)
    }
}

#[async_trait]
impl ManifestSource for StaticSource {
    async fn descriptor(&self) -> Result<ManifestDescriptor> {
        Ok(self.0.clone())
    }
}
