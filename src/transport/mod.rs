//! How payloads travel to the remote MockServer.
//!
//! [`HttpTransport`] is the seam: it issues a `PUT` and hands back the status code and body,
//! nothing more. It never retries - retry policies belong to the verification poller.
//! [`HyperTransport`] is the implementation used unless you provide your own via
//! [`MockServerClientBuilder::transport`].
//!
//! [`MockServerClientBuilder::transport`]: crate::MockServerClientBuilder::transport
mod hyper;

pub use self::hyper::HyperTransport;

use crate::errors::TransportError;
use async_trait::async_trait;
use http::StatusCode;
use log::debug;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

pub const BODY_PRINT_LIMIT: usize = 10_000;

/// Specifies limitations on printing response bodies in failure messages. MockServer can echo
/// back large bodies and it may be desirable to limit them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyPrintLimit {
    /// Maximum length of a body to print in bytes.
    Limited(usize),
    /// There is no limit to the size of a body that may be printed.
    Unlimited,
}

/// What the MockServer answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ServerResponse {
    pub fn new<B: Into<Vec<u8>>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn print_body_with_limit(
        &self,
        mut buffer: impl fmt::Write,
        body_print_limit: BodyPrintLimit,
    ) -> fmt::Result {
        if self.body.is_empty() {
            return write!(buffer, "<empty>");
        }
        match body_print_limit {
            BodyPrintLimit::Limited(limit) if self.body.len() > limit => {
                // Cut on a char boundary at or below the limit.
                let truncated = match std::str::from_utf8(&self.body[..limit]) {
                    Ok(truncated) => Some(truncated),
                    Err(e) if e.error_len().is_none() => {
                        std::str::from_utf8(&self.body[..e.valid_up_to()]).ok()
                    }
                    Err(_) => None,
                };
                match truncated {
                    Some(truncated) => {
                        writeln!(buffer, "{}", truncated)?;
                        write!(
                            buffer,
                            "We truncated the body because it was too large: {} bytes (limit: {} bytes). \
                             Increase this limit by setting `MOCKSERVER_BODY_PRINT_LIMIT`, or calling \
                             `MockServerClientBuilder::body_print_limit` when building your client",
                            self.body.len(),
                            limit
                        )
                    }
                    None => self.print_binary(buffer),
                }
            }
            _ => match std::str::from_utf8(&self.body) {
                Ok(body) => write!(buffer, "{}", body),
                Err(_) => self.print_binary(buffer),
            },
        }
    }

    fn print_binary(&self, mut buffer: impl fmt::Write) -> fmt::Result {
        write!(
            buffer,
            "Body is likely binary (invalid utf-8) size is {} bytes",
            self.body.len()
        )
    }

    pub(crate) fn body_with_limit(&self, body_print_limit: BodyPrintLimit) -> String {
        let mut buffer = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.print_body_with_limit(&mut buffer, body_print_limit);
        buffer
    }
}

/// Anything able to `PUT` a JSON document to a MockServer endpoint.
///
/// Implementations must send `Content-Type: application/json`, send an empty body when `body`
/// is `None` and must not retry on their own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn put(&self, uri: &Url, body: Option<Vec<u8>>) -> Result<ServerResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn put(&self, uri: &Url, body: Option<Vec<u8>>) -> Result<ServerResponse, TransportError> {
        (**self).put(uri, body).await
    }
}

/// Serializes payloads and hands them over to the configured [`HttpTransport`].
#[derive(Clone)]
pub(crate) struct TransportClient {
    inner: Arc<dyn HttpTransport>,
}

impl TransportClient {
    pub(crate) fn new(inner: Arc<dyn HttpTransport>) -> Self {
        Self { inner }
    }

    pub(crate) async fn execute<P: Serialize + Sync>(
        &self,
        payload: &P,
        uri: &Url,
    ) -> Result<ServerResponse, TransportError> {
        let body = serde_json::to_vec(payload)?;
        debug!("PUT {} ({} bytes)", uri, body.len());
        self.inner.put(uri, Some(body)).await
    }

    pub(crate) async fn execute_empty(&self, uri: &Url) -> Result<ServerResponse, TransportError> {
        debug!("PUT {} (empty body)", uri);
        self.inner.put(uri, None).await
    }
}

impl fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient").finish_non_exhaustive()
    }
}
