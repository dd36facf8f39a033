use std::time::Instant;

use futures_util::StreamExt;
use reqwest::{Client, Request, Response};
use tracing::debug;

use super::RequestResult;
use crate::error::RequestError;

/// Performs one exchange and reports it as a [`RequestResult`].
///
/// The response body is always drained so the connection can return to the
/// pool. Failures never escape as errors; they are recorded in the result.
pub async fn send(client: &Client, request: Request) -> RequestResult {
    let started = Instant::now();
    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(err) => {
            debug!("Request failed: {}", err);
            return RequestResult::failed(RequestError::from_send(&err), started.elapsed());
        }
    };

    let status = response.status().as_u16();
    let (bytes, drained) = drain_response_body(response).await;
    let error = drained.err().map(|err| {
        debug!("Failed to read response body: {}", err);
        RequestError::from_body(&err)
    });

    RequestResult {
        status,
        bytes,
        duration: started.elapsed(),
        error,
    }
}

async fn drain_response_body(response: Response) -> (u64, Result<(), reqwest::Error>) {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                total_bytes =
                    total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
            }
            Err(err) => return (total_bytes, Err(err)),
        }
    }
    (total_bytes, Ok(()))
}
