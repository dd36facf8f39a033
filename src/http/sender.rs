use std::future::Future;

use async_trait::async_trait;
use reqwest::{Client, Request};

use super::{RequestResult, send};

/// The injectable send function of a run.
///
/// Implementations are shared by every worker, so they must be safe for
/// concurrent use. Failures are reported through [`RequestResult::error`].
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(&self, request: Request) -> RequestResult;
}

/// Default sender: [`send`] bound to one shared client.
#[derive(Debug, Clone)]
pub struct ClientSender {
    client: Client,
}

impl ClientSender {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RequestSender for ClientSender {
    async fn send(&self, request: Request) -> RequestResult {
        send(&self.client, request).await
    }
}

/// Adapts a closure returning a future into a [`RequestSender`].
pub struct FnSender<F> {
    send: F,
}

impl<F> FnSender<F> {
    #[must_use]
    pub const fn new(send: F) -> Self {
        Self { send }
    }
}

#[async_trait]
impl<F, Fut> RequestSender for FnSender<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = RequestResult> + Send + 'static,
{
    async fn send(&self, request: Request) -> RequestResult {
        (self.send)(request).await
    }
}
