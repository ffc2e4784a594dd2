use crate::client::MockServerClient;
use crate::errors::ConfigError;
use crate::reporter::{LogReporter, Reporter};
use crate::transport::{
    BodyPrintLimit, HttpTransport, HyperTransport, TransportClient, BODY_PRINT_LIMIT,
};
use crate::verification::DEFAULT_POLL_INTERVAL;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A builder providing a fluent API to assemble a [`MockServerClient`] step-by-step.
/// Use [`MockServerClient::builder`] to get started.
pub struct MockServerClientBuilder {
    address: String,
    transport: Option<Arc<dyn HttpTransport>>,
    reporter: Arc<dyn Reporter>,
    poll_interval: Duration,
    body_print_limit: BodyPrintLimit,
}

impl MockServerClientBuilder {
    pub(super) fn new(address: String) -> Self {
        let body_print_limit = match env::var("MOCKSERVER_BODY_PRINT_LIMIT")
            .ok()
            .and_then(|x| x.parse::<usize>().ok())
        {
            Some(limit) => BodyPrintLimit::Limited(limit),
            None => BodyPrintLimit::Limited(BODY_PRINT_LIMIT),
        };
        Self {
            address,
            transport: None,
            reporter: Arc::new(LogReporter),
            poll_interval: DEFAULT_POLL_INTERVAL,
            body_print_limit,
        }
    }

    /// By default, requests are sent using [`HyperTransport`].
    /// Plug in any other [`HttpTransport`] implementation - e.g. one going through a proxy,
    /// or a scripted one in your own tests.
    pub fn transport<T: HttpTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Choose where terminal failures are reported. Defaults to [`LogReporter`].
    ///
    /// ### Example:
    /// ```rust
    /// use mockserver_client::{MockServerClient, PanicReporter};
    ///
    /// // Fail the test as soon as an operation fails, no `Result` juggling required.
    /// let client = MockServerClient::builder("localhost:1080")
    ///     .reporter(PanicReporter)
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn reporter<R: Reporter + 'static>(mut self, reporter: R) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// The delay between two verification attempts. Defaults to one second.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Failure messages embed the body MockServer answered with.
    /// By default, the size of the printed body is limited to 10 000 bytes, or to the value of
    /// the `MOCKSERVER_BODY_PRINT_LIMIT` environment variable if set.
    pub fn body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    /// Finalise the builder and get a [`MockServerClient`].
    ///
    /// It fails if the address cannot be turned into a base URL, or if it uses a scheme other
    /// than `http` while no custom [`HttpTransport`] was provided.
    pub fn build(self) -> Result<MockServerClient, ConfigError> {
        let base = parse_base_url(&self.address)?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                if base.scheme() != "http" {
                    return Err(ConfigError::UnsupportedScheme {
                        address: self.address,
                        scheme: base.scheme().to_string(),
                    });
                }
                Arc::new(HyperTransport::new())
            }
        };
        MockServerClient::new_with(
            base,
            TransportClient::new(transport),
            self.reporter,
            self.poll_interval,
            self.body_print_limit,
        )
    }
}

/// `host:port` gets an `http://` scheme; full URLs are taken as they are.
/// The path always ends with a `/` so that endpoints are resolved below it.
fn parse_base_url(address: &str) -> Result<Url, ConfigError> {
    let candidate = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };
    let mut url = Url::parse(&candidate).map_err(|source| ConfigError::InvalidAddress {
        address: address.to_string(),
        source,
    })?;
    if url.host().is_none() {
        return Err(ConfigError::MissingHost(address.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
