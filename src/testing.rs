//! Doubles shared by unit tests across modules.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::{FutureExt, future::BoxFuture};
use reqwest::StatusCode;

use crate::dao::image_store::{HostedImage, ImageStore, ImageStoreError, ImageStoreResult};

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    Hosting,
    Slow(Duration),
    NoUrl,
    Rejecting,
}

/// In-process image store recording every payload it receives.
#[derive(Debug, Clone)]
pub struct FakeImageStore {
    behaviour: Behaviour,
    uploads: Arc<Mutex<Vec<String>>>,
}

impl FakeImageStore {
    /// Hosts every payload at `https://img.test/{payload}`.
    pub fn hosting() -> Self {
        Self::with(Behaviour::Hosting)
    }

    /// Hosts like [`FakeImageStore::hosting`] after waiting `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self::with(Behaviour::Slow(delay))
    }

    /// Accepts uploads but answers without a URL.
    pub fn without_url() -> Self {
        Self::with(Behaviour::NoUrl)
    }

    /// Refuses every upload.
    pub fn rejecting() -> Self {
        Self::with(Behaviour::Rejecting)
    }

    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            uploads: Arc::default(),
        }
    }

    /// Payloads received so far, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

impl ImageStore for FakeImageStore {
    fn upload(&self, payload: String) -> BoxFuture<'static, ImageStoreResult<HostedImage>> {
        self.uploads.lock().unwrap().push(payload.clone());
        let hosted = HostedImage {
            url: Some(format!("https://img.test/{payload}")),
        };
        let (delay, result) = match self.behaviour {
            Behaviour::Hosting => (Duration::ZERO, Ok(hosted)),
            Behaviour::Slow(delay) => (delay, Ok(hosted)),
            Behaviour::NoUrl => (Duration::ZERO, Ok(HostedImage::default())),
            Behaviour::Rejecting => (
                Duration::ZERO,
                Err(ImageStoreError::Rejected {
                    status: StatusCode::BAD_REQUEST,
                    message: "Invalid image file".into(),
                }),
            ),
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        .boxed()
    }
}
