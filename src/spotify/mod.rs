//! # Spotify Web API access layer
//!
//! One submodule per endpoint family:
//!
//! - [`search`] - playlist search (pages capped at 50)
//! - [`tracks`] - playlist contents (pages capped at 100)
//! - [`features`] - batch audio features (at most 100 ids per request)
//! - [`client`] - the reqwest-backed [`SpotifyClient`] implementing the
//!   gather-engine source traits
//!
//! All requests go through [`send_with_retry`]: 5xx and network errors are
//! retried a bounded number of times with a doubling backoff, 429 responses
//! honor the `Retry-After` header, and any other non-2xx status is mapped to
//! a [`FetchError`] value for the loop-owning caller to act on. Nothing in
//! this layer panics on a failed request.

pub mod client;
pub mod features;
pub mod search;
pub mod tracks;

pub use client::SpotifyClient;

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{config, error::FetchError, warning};

/// Sends a request, retrying transient failures.
///
/// Retries apply to 5xx statuses and network-level errors, with a backoff
/// that doubles from two seconds. A 429 waits for the server-provided
/// `Retry-After` instead, unless it is abnormally high (> 120s). Anything
/// else non-2xx is returned as a `FetchError` immediately.
pub(crate) async fn send_with_retry(request: RequestBuilder) -> Result<Response, FetchError> {
    let max_retries = config::max_fetch_retries();
    let mut attempt: u32 = 0;
    let mut backoff = Duration::from_secs(2);

    loop {
        let Some(req) = request.try_clone() else {
            return Err(FetchError::network("request cannot be retried"));
        };

        match req.send().await {
            Ok(response) => {
                let status = response.status();

                if status == StatusCode::TOO_MANY_REQUESTS && attempt < max_retries {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(1);
                    if retry_after <= 120 {
                        sleep(Duration::from_secs(retry_after)).await;
                        attempt += 1;
                        continue;
                    }
                    warning!(
                        "Retry-After has reached an abnormal high of {} seconds. Giving up on this request.",
                        retry_after
                    );
                }

                if status.is_server_error() && attempt < max_retries {
                    sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                    continue;
                }

                if !status.is_success() {
                    return Err(FetchError::status(
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("unknown error"),
                    ));
                }

                return Ok(response);
            }
            Err(err) => {
                if attempt < max_retries {
                    sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                    continue;
                }
                return Err(FetchError::network(err.to_string()));
            }
        }
    }
}
