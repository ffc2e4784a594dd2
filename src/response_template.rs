use crate::errors::BuildError;
use crate::payload::{capture_json, CapturedJson, HttpResponsePayload};
use http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

/// The blueprint for the response the remote MockServer returns when an [`Expectation`] matches
/// an incoming request.
///
/// [`Expectation`]: crate::Expectation
#[derive(Clone, Debug)]
pub struct ResponseTemplate {
    status_code: StatusCode,
    headers: BTreeMap<String, Vec<String>>,
    body: Option<CapturedJson>,
}

impl ResponseTemplate {
    /// Start building a `ResponseTemplate` specifying the status code of the response.
    ///
    /// It panics if `s` is not a valid status code.
    pub fn new<S>(s: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        let status_code = s.try_into().expect("Failed to convert into status code.");
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Append a header `value` to list of headers with `key` as header name.
    ///
    /// Unlike `insert_header`, this function will not override the contents of a header.
    pub fn append_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.entry(key.into()).or_default().push(value.into());
        self
    }

    /// Insert a header `value` with `key` as header name, dropping any value previously set
    /// for `key`.
    pub fn insert_header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.headers.insert(key.into(), vec![value.into()]);
        self
    }

    /// Set the response body from a JSON-serializable value.
    ///
    /// MockServer receives the JSON-encoded text of `body`.
    pub fn set_body_json<B: Serialize>(mut self, body: B) -> Self {
        self.body = Some(capture_json(body));
        self
    }

    pub(crate) fn to_payload(&self) -> Result<HttpResponsePayload, BuildError> {
        let body = match &self.body {
            None => None,
            Some(Err(e)) => return Err(BuildError::Body(e.clone())),
            Some(Ok(value)) => {
                Some(serde_json::to_string(value).map_err(|e| BuildError::Body(e.to_string()))?)
            }
        };
        Ok(HttpResponsePayload {
            status_code: self.status_code.as_u16(),
            headers: self.headers.clone(),
            body,
        })
    }
}
