//! `mockserver_client` lets your tests drive a [MockServer] instance running outside of the test
//! process: register the responses it should serve and verify how many times your application
//! called it.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Verification](#verification)
//! 3. [Failure reporting](#failure-reporting)
//! 4. [Runtime compatibility](#runtime-compatibility)
//!
//! ## Getting started
//! ```rust,no_run
//! use mockserver_client::{
//!     Expectation, MockServerClient, RequestPattern, ResponseTemplate, VerificationRange,
//! };
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Point the client at a running MockServer
//!     let client = MockServerClient::new("localhost:1080").unwrap();
//!
//!     // Arrange: when MockServer receives a POST on '/users' with this exact JSON body,
//!     // it answers with a 201.
//!     let create_user = RequestPattern::new()
//!         .method("POST")
//!         .path("/users")
//!         .body_json(json!({ "name": "Ada" }));
//!     Expectation::when(create_user.clone())
//!         .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
//!         .mount(&client)
//!         .await
//!         .unwrap();
//!
//!     // Act: exercise your application here.
//!
//!     // Assert: the user was created exactly once.
//!     client
//!         .verify(&create_user, VerificationRange::once(), 5)
//!         .await
//!         .unwrap();
//!
//!     // Clean up for the next test.
//!     client.reset().await.unwrap();
//! }
//! ```
//!
//! ## Verification
//!
//! Your application might call MockServer asynchronously: when you verify, the expected call
//! may not have happened yet. [`MockServerClient::verify`] therefore polls MockServer's `verify`
//! endpoint, up to the number of attempts you choose, waiting one second between attempts.
//! Answers other than "satisfied" are tolerated until the last attempt; the last one decides
//! the [`FailureReason`].
//!
//! Use [`MockServerClient::verify_until`] to stop waiting early.
//!
//! ## Failure reporting
//!
//! Every operation returns a `Result`. Failures are also handed to a [`Reporter`]: the default,
//! [`LogReporter`], logs them via the `log` facade; [`PanicReporter`] panics, failing the
//! current test right away.
//!
//! ## Runtime compatibility
//!
//! The default [`HyperTransport`] requires a `tokio` runtime, and so does the delay between
//! verification attempts.
//!
//! [MockServer]: https://www.mock-server.com/
mod client;
mod errors;
mod expectation;
pub mod http;
mod payload;
mod range;
mod reporter;
mod request;
mod response_template;
mod transport;
mod verification;

pub use client::{MockServerClient, MockServerClientBuilder};
pub use errors::{
    BuildError, ConfigError, ExpectationError, FailureReason, InvalidRange, ResetError,
    TransportError, VerificationError,
};
pub use expectation::{Expectation, ExpectationBuilder};
pub use payload::{ExpectationRequest, VerificationRequest};
pub use range::VerificationRange;
pub use reporter::{LogReporter, PanicReporter, Reporter};
pub use request::RequestPattern;
pub use response_template::ResponseTemplate;
pub use transport::{BodyPrintLimit, HttpTransport, HyperTransport, ServerResponse};
pub use verification::{VerificationReport, DEFAULT_POLL_INTERVAL};
