use crate::errors::BuildError;
use crate::payload::{capture_json, BodyEncoding, CapturedJson, HttpRequestPayload, JsonBody};
use serde::Serialize;
use std::collections::BTreeMap;

/// A description of the requests the remote MockServer should match on.
///
/// It is used both to register an [`Expectation`] (what should the server answer when a matching
/// request comes in?) and to [`verify`] how many matching requests the server received.
///
/// Every criterion is optional: a `RequestPattern` without a method matches any method.
/// The path is not checked client-side - a pattern without a path is sent as is and the
/// server will reject it with a `400`.
///
/// ### Example:
/// ```rust
/// use mockserver_client::RequestPattern;
/// use serde_json::json;
///
/// let pattern = RequestPattern::new()
///     .method("POST")
///     .path("/users/{id}/notes")
///     .path_parameter("id", ["1", "2"])
///     .query_param("draft", "true")
///     .header("Content-Type", "application/json")
///     .body_json(json!({ "text": "hello" }));
/// ```
///
/// [`Expectation`]: crate::Expectation
/// [`verify`]: crate::MockServerClient::verify
#[derive(Debug, Clone, Default)]
pub struct RequestPattern {
    method: Option<String>,
    path: String,
    headers: BTreeMap<String, Vec<String>>,
    cookies: BTreeMap<String, String>,
    query_params: BTreeMap<String, Vec<String>>,
    path_parameters: BTreeMap<String, Vec<String>>,
    body: Option<CapturedJson>,
}

impl RequestPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on the HTTP method, e.g. `"GET"` or [`http::Method::GET`].
    ///
    /// [`http::Method::GET`]: crate::http::Method::GET
    pub fn method<M: AsRef<str>>(mut self, method: M) -> Self {
        self.method = Some(method.as_ref().to_string());
        self
    }

    /// Match on the request path. MockServer accepts `{name}` placeholders, see
    /// [`path_parameter`](#method.path_parameter).
    pub fn path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Append a header `value` to the list of accepted values for `key`.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Append multiple header key-value pairs.
    pub fn headers<K, V, I>(self, headers: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        headers
            .into_iter()
            .fold(self, |pattern, (key, value)| pattern.header(key, value))
    }

    pub fn cookie<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Append `value` to the accepted values of the query string parameter `key`.
    pub fn query_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.query_params
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    pub fn query_params<K, V, I>(self, params: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        params
            .into_iter()
            .fold(self, |pattern, (key, value)| pattern.query_param(key, value))
    }

    /// Accept any of `values` for the `{name}` placeholder in the path.
    ///
    /// Path parameters are only sent to MockServer if at least one was specified.
    pub fn path_parameter<K, V, I>(mut self, name: K, values: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        self.path_parameters
            .entry(name.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Match requests whose body is **exactly** the JSON representation of `body`.
    ///
    /// If `body` cannot be serialized, the error surfaces when the pattern is registered
    /// or verified.
    pub fn body_json<B: Serialize>(mut self, body: B) -> Self {
        self.body = Some(capture_json(body));
        self
    }

    pub(crate) fn to_payload(&self, encoding: BodyEncoding) -> Result<HttpRequestPayload, BuildError> {
        let body = self
            .body
            .as_ref()
            .map(|body| JsonBody::encode(body, encoding))
            .transpose()?;
        Ok(HttpRequestPayload {
            method: self.method.clone(),
            path: self.path.clone(),
            path_parameters: self.path_parameters.clone(),
            query_parameters: self.query_params.clone(),
            headers: self.headers.clone(),
            cookies: self.cookies.clone(),
            body,
        })
    }
}
