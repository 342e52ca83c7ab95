//! Async API surface used by pages and forms.
//!
//! Wraps the sans-IO `ApiClient` with a `Transport` and the dashboard's
//! `PageCache`. Every call yields an `Envelope`; transport errors are folded
//! into the failure branch here, so callers only ever branch on the tag.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tutor_core::{ApiClient, ApiError, Envelope, HttpRequest};

use crate::cache::PageCache;
use crate::transport::Transport;

#[derive(Clone)]
pub struct Api {
    client: ApiClient,
    transport: Arc<dyn Transport>,
    cache: PageCache,
}

impl Api {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, cache: PageCache) -> Self {
        Self {
            client: ApiClient::new(base_url),
            transport,
            cache,
        }
    }

    /// The same API, authenticated with `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            client: self.client.with_token(token),
            transport: Arc::clone(&self.transport),
            cache: self.cache.clone(),
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Envelope<T> {
        let request = self.client.build_get(path);
        self.round_trip(request).await
    }

    /// POST `body` to `path`. On success, `revalidate` is marked stale.
    pub async fn create<T, B>(&self, path: &str, body: &B, revalidate: &str) -> Envelope<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let envelope = match self.client.build_create(path, body) {
            Ok(request) => self.round_trip(request).await,
            Err(err) => self.client.failure(err),
        };
        self.after_mutation(path, &envelope, revalidate).await;
        envelope
    }

    /// PATCH `body` to `path`. On success, `revalidate` is marked stale.
    pub async fn update<T, B>(&self, path: &str, body: &B, revalidate: &str) -> Envelope<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let envelope = match self.client.build_update(path, body) {
            Ok(request) => self.round_trip(request).await,
            Err(err) => self.client.failure(err),
        };
        self.after_mutation(path, &envelope, revalidate).await;
        envelope
    }

    async fn round_trip<T: DeserializeOwned>(&self, request: HttpRequest) -> Envelope<T> {
        match self.transport.execute(request).await {
            Ok(response) => self.client.parse(response),
            Err(err) => self.client.failure(ApiError::Transport(err.to_string())),
        }
    }

    async fn after_mutation<T>(&self, path: &str, envelope: &Envelope<T>, revalidate: &str) {
        if envelope.is_success() {
            tracing::info!(%path, message = envelope.message(), "mutation accepted");
            self.cache.revalidate(revalidate).await;
        } else {
            tracing::warn!(%path, message = envelope.message(), "mutation rejected");
        }
    }
}
