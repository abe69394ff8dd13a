use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("crmm-publish/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when talking to a remote HTTP API
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to create HTTP client")]
    ClientInit(#[source] reqwest::Error),

    #[error("failed to fetch {operation} from {url}")]
    Request {
        operation: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("failed to parse response from {url}")]
    ParseResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Build the blocking client shared by the API clients.
///
/// # Errors
///
/// Returns [`HttpError::ClientInit`] if the TLS backend cannot be initialized.
pub fn client() -> Result<Client, HttpError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(HttpError::ClientInit)
}

/// Send `request` and parse a successful response body as JSON.
///
/// # Errors
///
/// Returns [`HttpError::Request`] if the request cannot be sent,
/// [`HttpError::ApiStatus`] for a non-success status, and
/// [`HttpError::ParseResponse`] if the body is not the expected JSON.
pub fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    operation: &'static str,
    url: &str,
) -> Result<T, HttpError> {
    let response = request.send().map_err(|source| HttpError::Request {
        operation,
        url: url.to_owned(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(HttpError::ApiStatus {
            status,
            url: url.to_owned(),
            body: response.text().unwrap_or_default(),
        });
    }

    response.json().map_err(|source| HttpError::ParseResponse {
        url: url.to_owned(),
        source,
    })
}

/// Render an error with all of its sources, separated by `: `.
#[must_use]
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
