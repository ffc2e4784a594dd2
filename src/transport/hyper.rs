use crate::errors::TransportError;
use crate::payload::JSON_CONTENT_TYPE;
use crate::transport::{HttpTransport, ServerResponse};
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{Method, Request};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::fmt;
use url::Url;

/// The default [`HttpTransport`], an HTTP/1 `hyper` client.
///
/// It must be used from within a `tokio` runtime. Cloning is cheap: clones share the same
/// connection pool.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn put(&self, uri: &Url, body: Option<Vec<u8>>) -> Result<ServerResponse, TransportError> {
        let body = body.map(Bytes::from).unwrap_or_default();
        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri.as_str())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Full::new(body))
            .map_err(|source| TransportError::InvalidRequest {
                uri: uri.to_string(),
                source,
            })?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportError::Connection {
                uri: uri.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Body {
                uri: uri.to_string(),
                source: Box::new(e),
            })?
            .to_bytes();

        Ok(ServerResponse::new(status, body.to_vec()))
    }
}
