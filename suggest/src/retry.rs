//! HTTP retry policy with exponential backoff.
//!
//! - Max retries: 2 (3 total attempts)
//! - Initial delay: 250ms, doubling, capped at 2s
//! - Jitter: down-jitter up to 25% (multiplier in [0.75, 1.0])
//!
//! Retryable: HTTP 408, 409, 429, 5xx and connection errors. A server may
//! override with `x-should-retry: true|false`. Every attempt carries the same
//! `Idempotency-Key` and an `X-Retry-Count` header.
//!
//! Suggestions are interactive, so the budget is tighter than a batch client
//! would use: a slow answer is superseded by the next keystroke anyway.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Down-jitter factor (0.25 = up to 25% shorter).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            jitter_factor: 0.25,
        }
    }
}

/// Parse `Retry-After-Ms` or `Retry-After`. Only `0 < d < 60s` is honored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(val) = headers.get("retry-after-ms")
        && let Ok(s) = val.to_str()
        && let Ok(ms) = s.parse::<f64>()
    {
        let duration = Duration::from_secs_f64(ms / 1000.0);
        if duration > Duration::ZERO && duration < Duration::from_secs(60) {
            return Some(duration);
        }
    }

    if let Some(val) = headers.get("retry-after")
        && let Ok(s) = val.to_str()
        && let Ok(secs) = s.parse::<u64>()
    {
        let duration = Duration::from_secs(secs);
        if duration > Duration::ZERO && duration < Duration::from_secs(60) {
            return Some(duration);
        }
    }

    None
}

fn should_retry(status: StatusCode, headers: &HeaderMap) -> bool {
    if let Some(val) = headers.get("x-should-retry")
        && let Ok(s) = val.to_str()
    {
        if s.eq_ignore_ascii_case("true") {
            return true;
        }
        if s.eq_ignore_ascii_case("false") {
            return false;
        }
    }

    matches!(status.as_u16(), 408 | 409 | 429 | 500..=599)
}

/// Delay before retry number `backoff_step + 1`.
fn calculate_retry_delay(
    backoff_step: u32,
    config: &RetryConfig,
    headers: Option<&HeaderMap>,
) -> Duration {
    if let Some(headers) = headers
        && let Some(delay) = parse_retry_after(headers)
    {
        return delay.min(config.max_delay);
    }

    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(backoff_step as i32);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

fn add_retry_headers(
    builder: RequestBuilder,
    retry_count: u32,
    idempotency_key: &str,
) -> RequestBuilder {
    builder
        .header("X-Retry-Count", retry_count.to_string())
        .header("Idempotency-Key", idempotency_key)
}

fn generate_idempotency_key() -> String {
    format!("venire-suggest-{}", Uuid::new_v4())
}

/// Outcome of a retried request. Success and failure are distinct variants so
/// an error response can never be read as a result.
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx response.
    Success(Response),
    /// Non-2xx response after retries were exhausted or ruled out.
    HttpError(Response),
    /// Transport failure after retries were exhausted.
    ConnectionError {
        attempts: u32,
        source: reqwest::Error,
    },
    /// Transport failure that cannot be retried.
    NonRetryable(reqwest::Error),
}

/// Send the request built by `build_request`, retrying per `config`.
pub async fn send_with_retry<F>(build_request: F, config: &RetryConfig) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let idempotency_key = generate_idempotency_key();

    for retry_count in 0..config.max_retries {
        let request = add_retry_headers(build_request(), retry_count, &idempotency_key);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return RetryOutcome::Success(response);
                }
                if !should_retry(status, response.headers()) {
                    return RetryOutcome::HttpError(response);
                }
                let delay = calculate_retry_delay(retry_count, config, Some(response.headers()));
                tracing::debug!(
                    status = %status,
                    retry_count = retry_count + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying suggestion request after error status"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if is_retryable_error(&e) {
                    let delay = calculate_retry_delay(retry_count, config, None);
                    tracing::debug!(
                        error = %e,
                        retry_count = retry_count + 1,
                        delay_ms = delay.as_millis(),
                        "Retrying suggestion request after connection error"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                if retry_count == 0 {
                    return RetryOutcome::NonRetryable(e);
                }
                return RetryOutcome::ConnectionError {
                    attempts: retry_count + 1,
                    source: e,
                };
            }
        }
    }

    // Final attempt: whatever happens is the outcome.
    let request = add_retry_headers(build_request(), config.max_retries, &idempotency_key);
    match request.send().await {
        Ok(response) => {
            if response.status().is_success() {
                RetryOutcome::Success(response)
            } else {
                RetryOutcome::HttpError(response)
            }
        }
        Err(e) => RetryOutcome::ConnectionError {
            attempts: config.max_retries + 1,
            source: e,
        },
    }
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn parse_retry_after_prefers_milliseconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("1500"));
        headers.insert("retry-after", HeaderValue::from_static("9"));
        assert_eq!(
            parse_retry_after(&headers),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn parse_retry_after_rejects_out_of_range() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("120"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.clear();
        headers.insert("retry-after", HeaderValue::from_static("0"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn retryable_statuses() {
        let headers = HeaderMap::new();
        assert!(should_retry(StatusCode::TOO_MANY_REQUESTS, &headers));
        assert!(should_retry(StatusCode::INTERNAL_SERVER_ERROR, &headers));
        assert!(should_retry(StatusCode::SERVICE_UNAVAILABLE, &headers));
        assert!(should_retry(StatusCode::REQUEST_TIMEOUT, &headers));
        assert!(!should_retry(StatusCode::BAD_REQUEST, &headers));
        assert!(!should_retry(StatusCode::UNAUTHORIZED, &headers));
    }

    #[test]
    fn should_retry_header_overrides_status() {
        let mut headers = HeaderMap::new();
        headers.insert("x-should-retry", HeaderValue::from_static("true"));
        assert!(should_retry(StatusCode::BAD_REQUEST, &headers));

        headers.clear();
        headers.insert("x-should-retry", HeaderValue::from_static("false"));
        assert!(!should_retry(StatusCode::TOO_MANY_REQUESTS, &headers));
    }

    #[test]
    fn delay_stays_within_jitter_bounds() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let delay = calculate_retry_delay(0, &config, None);
            assert!(delay >= Duration::from_millis(187));
            assert!(delay <= Duration::from_millis(250));

            let delay = calculate_retry_delay(5, &config, None);
            assert!(delay <= Duration::from_secs(2));
        }
    }

    #[test]
    fn retry_after_is_capped_by_max_delay() {
        let config = RetryConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));
        assert_eq!(
            calculate_retry_delay(0, &config, Some(&headers)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn idempotency_keys_are_unique() {
        let a = generate_idempotency_key();
        let b = generate_idempotency_key();
        assert!(a.starts_with("venire-suggest-"));
        assert_ne!(a, b);
    }
}
