//! The JSON documents MockServer expects on its `expectation` and `verify` endpoints.
use crate::errors::BuildError;
use crate::{Expectation, RequestPattern, VerificationRange};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// A body value captured when a builder setter was called.
///
/// Serialization happens eagerly (the caller's value may not outlive the builder) but the
/// error is only surfaced when a payload gets built, to keep setters chainable.
pub(crate) type CapturedJson = Result<Value, String>;

pub(crate) fn capture_json<B: Serialize>(body: B) -> CapturedJson {
    serde_json::to_value(body).map_err(|e| e.to_string())
}

/// How the request body is embedded in the `json` field of the body matcher.
///
/// The two MockServer endpoints disagree: `expectation` wants the structured value,
/// `verify` wants the JSON-encoded text of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyEncoding {
    Structured,
    Stringified,
}

/// Body matcher: always an exact, structural JSON comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonBody {
    content_type: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    match_type: &'static str,
    json: Value,
}

impl JsonBody {
    fn strict(json: Value) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE,
            kind: "JSON",
            match_type: "STRICT",
            json,
        }
    }

    pub(crate) fn encode(body: &CapturedJson, encoding: BodyEncoding) -> Result<Self, BuildError> {
        let value = body.as_ref().map_err(|e| BuildError::Body(e.clone()))?;
        let json = match encoding {
            BodyEncoding::Structured => value.clone(),
            BodyEncoding::Stringified => Value::String(
                serde_json::to_string(value).map_err(|e| BuildError::Body(e.to_string()))?,
            ),
        };
        Ok(Self::strict(json))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HttpRequestPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) method: Option<String>,
    pub(crate) path: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) path_parameters: BTreeMap<String, Vec<String>>,
    #[serde(
        rename = "queryStringParameters",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub(crate) query_parameters: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) headers: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) cookies: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) body: Option<JsonBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HttpResponsePayload {
    pub(crate) status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) headers: BTreeMap<String, Vec<String>>,
    /// The JSON-encoded text of the response body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) body: Option<String>,
}

/// The payload sent to `PUT /mockserver/expectation`.
///
/// Get one from [`Expectation::build_payload`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectationRequest {
    http_request: HttpRequestPayload,
    http_response: HttpResponsePayload,
}

impl ExpectationRequest {
    pub(crate) fn build(expectation: &Expectation) -> Result<Self, BuildError> {
        Ok(Self {
            http_request: expectation
                .request()
                .to_payload(BodyEncoding::Structured)?,
            http_response: expectation.response().to_payload()?,
        })
    }
}

/// The payload sent to `PUT /mockserver/verify`.
///
/// Get one from [`VerificationRequest::build`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    http_request: HttpRequestPayload,
    times: VerificationRange,
}

impl VerificationRequest {
    /// Assemble the verification payload for `pattern`.
    ///
    /// Unlike [`ExpectationRequest`], the request body is embedded as a JSON-encoded string:
    /// that is what the `verify` endpoint expects.
    pub fn build(pattern: &RequestPattern, range: VerificationRange) -> Result<Self, BuildError> {
        Ok(Self {
            http_request: pattern.to_payload(BodyEncoding::Stringified)?,
            times: range,
        })
    }
}
