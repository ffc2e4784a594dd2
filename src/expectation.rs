use crate::errors::{BuildError, ExpectationError};
use crate::{ExpectationRequest, MockServerClient, RequestPattern, ResponseTemplate};

/// Given a [`RequestPattern`], an `Expectation` instructs the remote MockServer to return a
/// pre-determined response whenever a matching request comes in.
///
/// `Expectation`s have to be registered with the server, using [`MockServerClient::expect`] or
/// [`mount`], to become effective.
///
/// ### Example:
/// ```rust,no_run
/// use mockserver_client::{Expectation, MockServerClient, RequestPattern, ResponseTemplate};
/// use serde_json::json;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let client = MockServerClient::new("localhost:1080").unwrap();
///
///     Expectation::when(RequestPattern::new().method("GET").path("/users/1"))
///         .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
///         .mount(&client)
///         .await
///         .unwrap();
/// }
/// ```
///
/// [`mount`]: #method.mount
#[derive(Debug, Clone)]
pub struct Expectation {
    request: RequestPattern,
    response: ResponseTemplate,
}

/// A fluent builder to construct an [`Expectation`] given a [`RequestPattern`] and a
/// [`ResponseTemplate`].
#[derive(Debug, Clone)]
pub struct ExpectationBuilder {
    request: RequestPattern,
}

impl Expectation {
    /// Start building an `Expectation` specifying which requests it applies to.
    pub fn when(request: RequestPattern) -> ExpectationBuilder {
        ExpectationBuilder { request }
    }

    pub fn request(&self) -> &RequestPattern {
        &self.request
    }

    pub fn response(&self) -> &ResponseTemplate {
        &self.response
    }

    /// Assemble the payload for MockServer's `expectation` endpoint.
    ///
    /// The request body, if any, is embedded as a structured JSON value; the response body
    /// as its JSON-encoded text.
    pub fn build_payload(&self) -> Result<ExpectationRequest, BuildError> {
        ExpectationRequest::build(self)
    }

    /// Register this `Expectation` on the MockServer `client` talks to.
    pub async fn mount(&self, client: &MockServerClient) -> Result<(), ExpectationError> {
        client.expect(self).await
    }
}

impl ExpectationBuilder {
    /// Establish what [`ResponseTemplate`] MockServer should answer with.
    ///
    /// `respond_with` finalises the `ExpectationBuilder` and returns an [`Expectation`],
    /// ready to be [`mount`]ed.
    ///
    /// [`mount`]: Expectation::mount
    pub fn respond_with(self, template: ResponseTemplate) -> Expectation {
        Expectation {
            request: self.request,
            response: template,
        }
    }
}
