//! Remote image hosting. Payloads are handed over as-is (URL or data URI) and come back as a
//! durable URL.

/// Cloudinary upload API client.
pub mod cloudinary;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryImageStore};

/// Result alias for image store operations.
pub type ImageStoreResult<T> = Result<T, ImageStoreError>;

/// Failures that can occur while uploading to the image host.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// Building the HTTP client failed.
    #[error("failed to build image store client")]
    ClientBuilder {
        /// HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The upload request could not be sent or its response could not be read.
    #[error("image upload request failed")]
    Request {
        /// HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The image host refused the upload.
    #[error("image upload rejected ({status}): {message}")]
    Rejected {
        /// HTTP status of the refusal.
        status: StatusCode,
        /// Message from the host's error body, or the raw body.
        message: String,
    },
    /// The upload succeeded but the response body was not understood.
    #[error("failed to decode image upload response")]
    DecodeResponse {
        /// HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The image host answered without a URL for the stored image.
    #[error("image store returned no URL for the uploaded image")]
    MissingUrl,
}

/// Outcome of an upload as reported by the image host.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct HostedImage {
    /// Plain URL of the stored image. Other response fields are ignored.
    #[serde(default)]
    pub url: Option<String>,
}

impl HostedImage {
    /// The plain URL, when the host returned a non-empty one.
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Abstraction over the image hosting service.
pub trait ImageStore: Send + Sync {
    /// Host `payload`, a remote URL or a data URI.
    fn upload(&self, payload: String) -> BoxFuture<'static, ImageStoreResult<HostedImage>>;
}
