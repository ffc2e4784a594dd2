use crate::client::MockServerClientBuilder;
use crate::errors::{
    error_chain, ConfigError, ExpectationError, FailureReason, ResetError, VerificationError,
};
use crate::reporter::Reporter;
use crate::transport::{BodyPrintLimit, TransportClient};
use crate::verification::{VerificationPoller, VerificationReport};
use crate::{Expectation, RequestPattern, VerificationRange};
use futures::future;
use http::StatusCode;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// The three MockServer endpoints we talk to, resolved once against the base address.
#[derive(Debug, Clone)]
pub(super) struct Endpoints {
    expectation: Url,
    verify: Url,
    reset: Url,
}

impl Endpoints {
    fn new(base: &Url) -> Result<Self, ConfigError> {
        let join = |endpoint: &str| {
            base.join(endpoint)
                .map_err(|source| ConfigError::InvalidAddress {
                    address: base.to_string(),
                    source,
                })
        };
        Ok(Self {
            expectation: join("mockserver/expectation")?,
            verify: join("mockserver/verify")?,
            reset: join("mockserver/reset")?,
        })
    }
}

/// A client for a MockServer instance running outside of your test process.
///
/// It lets you:
/// - register [`Expectation`]s with [`expect`];
/// - check how many times a [`RequestPattern`] was received with [`verify`];
/// - drop every expectation (and the request log) with [`reset`].
///
/// Use [`MockServerClient::new`] to get a client with the default configuration or
/// [`MockServerClient::builder`] to customise the transport, the failure [`Reporter`] or the
/// delay between verification attempts.
///
/// Cloning a `MockServerClient` is cheap: clones share the same transport.
///
/// ### Example:
/// ```rust,no_run
/// use mockserver_client::{
///     Expectation, MockServerClient, RequestPattern, ResponseTemplate, VerificationRange,
/// };
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let client = MockServerClient::new("localhost:1080").unwrap();
///     let pattern = RequestPattern::new().method("POST").path("/notifications");
///
///     Expectation::when(pattern.clone())
///         .respond_with(ResponseTemplate::new(202))
///         .mount(&client)
///         .await
///         .unwrap();
///
///     // Exercise the system under test here...
///
///     // Give the system under test up to 5 attempts (~5 seconds) to call the API once.
///     client
///         .verify(&pattern, VerificationRange::once(), 5)
///         .await
///         .unwrap();
/// }
/// ```
///
/// [`expect`]: MockServerClient::expect
/// [`verify`]: MockServerClient::verify
/// [`reset`]: MockServerClient::reset
#[derive(Clone)]
pub struct MockServerClient {
    base: Url,
    endpoints: Endpoints,
    transport: TransportClient,
    reporter: Arc<dyn Reporter>,
    poll_interval: Duration,
    body_print_limit: BodyPrintLimit,
}

impl MockServerClient {
    pub(super) fn new_with(
        base: Url,
        transport: TransportClient,
        reporter: Arc<dyn Reporter>,
        poll_interval: Duration,
        body_print_limit: BodyPrintLimit,
    ) -> Result<Self, ConfigError> {
        let endpoints = Endpoints::new(&base)?;
        Ok(Self {
            base,
            endpoints,
            transport,
            reporter,
            poll_interval,
            body_print_limit,
        })
    }

    /// A client for the MockServer listening on `address` (`host:port`), using the default
    /// configuration.
    pub fn new(address: &str) -> Result<Self, ConfigError> {
        Self::builder(address).build()
    }

    /// You can use `MockServerClient::builder` if you need to specify custom configuration.
    ///
    /// If this is not your case, use [`MockServerClient::new`].
    pub fn builder<A: Into<String>>(address: A) -> MockServerClientBuilder {
        MockServerClientBuilder::new(address.into())
    }

    /// Return the base uri of the remote MockServer, e.g. `http://127.0.0.1:1080`.
    pub fn uri(&self) -> String {
        self.base.as_str().trim_end_matches('/').to_string()
    }

    /// Register an [`Expectation`] on the remote MockServer.
    ///
    /// A single request is sent: creating an expectation is synchronous on MockServer's side,
    /// there is nothing to wait for. Any answer other than `201 Created` is an error.
    pub async fn expect(&self, expectation: &Expectation) -> Result<(), ExpectationError> {
        let outcome = self.submit(expectation).await;
        self.report(outcome)
    }

    async fn submit(&self, expectation: &Expectation) -> Result<(), ExpectationError> {
        let payload = expectation.build_payload()?;
        let response = self
            .transport
            .execute(&payload, &self.endpoints.expectation)
            .await?;

        let reason = match response.status().as_u16() {
            201 => {
                self.reporter.log("Expectation has been created");
                return Ok(());
            }
            400 => FailureReason::MalformedRequest,
            406 => FailureReason::ServerRejected,
            _ => FailureReason::Unclassified,
        };
        Err(ExpectationError::Rejected {
            reason,
            status: response.status(),
            body: response.body_with_limit(self.body_print_limit),
        })
    }

    /// Check that the remote MockServer received a request matching `pattern` a number of
    /// times within `range`.
    ///
    /// The target call might not have happened yet: MockServer is queried up to `max_attempts`
    /// times, waiting for the configured poll interval (one second by default) between two
    /// attempts. Whatever the server answers, only the classification of the last attempt
    /// determines the error. There is no default for `max_attempts`: pick one that fits the
    /// timeout tolerance of your test. Zero attempts is a [`BuildError::NoAttempts`].
    ///
    /// A transport failure (e.g. the server is down) is not retried.
    ///
    /// [`BuildError::NoAttempts`]: crate::BuildError::NoAttempts
    pub async fn verify<R>(
        &self,
        pattern: &RequestPattern,
        range: R,
        max_attempts: u32,
    ) -> Result<VerificationReport, VerificationError>
    where
        R: Into<VerificationRange>,
    {
        self.verify_until(pattern, range, max_attempts, future::pending())
            .await
    }

    /// Same as [`verify`], but stop polling with [`VerificationError::Cancelled`] as soon as
    /// `shutdown` resolves while waiting between two attempts.
    ///
    /// A cancellation is returned to the caller but not handed to [`Reporter::fail`].
    ///
    /// ### Example:
    /// ```rust,no_run
    /// use mockserver_client::{MockServerClient, RequestPattern, VerificationRange};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let client = MockServerClient::new("localhost:1080").unwrap();
    ///     let (cancel, cancelled) = tokio::sync::oneshot::channel::<()>();
    ///
    ///     // Hand `cancel` to whoever may decide that waiting is pointless.
    ///     # drop(cancel);
    ///     let outcome = client
    ///         .verify_until(
    ///             &RequestPattern::new().path("/hello"),
    ///             VerificationRange::once(),
    ///             30,
    ///             async {
    ///                 let _ = cancelled.await;
    ///             },
    ///         )
    ///         .await;
    /// }
    /// ```
    ///
    /// [`verify`]: MockServerClient::verify
    pub async fn verify_until<R, S>(
        &self,
        pattern: &RequestPattern,
        range: R,
        max_attempts: u32,
        shutdown: S,
    ) -> Result<VerificationReport, VerificationError>
    where
        R: Into<VerificationRange>,
        S: Future<Output = ()>,
    {
        let poller = VerificationPoller {
            transport: &self.transport,
            uri: &self.endpoints.verify,
            interval: self.poll_interval,
            body_print_limit: self.body_print_limit,
            reporter: self.reporter.as_ref(),
        };
        let outcome = poller
            .run(pattern, range.into(), max_attempts, shutdown)
            .await;
        match &outcome {
            Ok(report) => self.reporter.log(&report.to_string()),
            // Cancellations are logged, never reported as failures.
            Err(e @ VerificationError::Cancelled { .. }) => {
                self.reporter.log(&e.to_string());
                return outcome;
            }
            Err(_) => {}
        }
        self.report(outcome)
    }

    /// Drop all expectations and recorded requests from the remote MockServer.
    ///
    /// Any answer other than `200 OK` is an error.
    pub async fn reset(&self) -> Result<(), ResetError> {
        let outcome = self.reset_expectations().await;
        self.report(outcome)
    }

    async fn reset_expectations(&self) -> Result<(), ResetError> {
        let response = self.transport.execute_empty(&self.endpoints.reset).await?;
        if response.status() != StatusCode::OK {
            return Err(ResetError::UnexpectedStatus {
                status: response.status(),
                body: response.body_with_limit(self.body_print_limit),
            });
        }
        self.reporter.log("Expectations have been reset");
        Ok(())
    }

    /// Hand terminal failures over to the reporter, exactly once.
    fn report<T, E: std::error::Error>(&self, outcome: Result<T, E>) -> Result<T, E> {
        if let Err(e) = &outcome {
            self.reporter.fail(&error_chain(e));
        }
        outcome
    }
}

impl fmt::Debug for MockServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockServerClient")
            .field("base", &self.base.as_str())
            .field("poll_interval", &self.poll_interval)
            .field("body_print_limit", &self.body_print_limit)
            .finish_non_exhaustive()
    }
}
