//! Everything that can go wrong while talking to a remote MockServer.
//!
//! Errors fall in four families:
//! - construction errors ([`BuildError`]), raised before any network call;
//! - transport errors ([`TransportError`]), when the server could not be reached at all;
//! - protocol errors, when the server answered with a status code we classify as a
//!   [`FailureReason`];
//! - configuration errors ([`ConfigError`]), raised when assembling a client.
use http::StatusCode;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Why the remote MockServer did not give us the answer we were hoping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// `400`: the server rejected the shape of the payload.
    MalformedRequest,
    /// `403` on verification, `406` on expectation creation: an unknown error on the server side.
    ServerRejected,
    /// `406` on verification: the expectation exists but the call-count condition is not met (yet).
    NotYetMet,
    /// Any other status code.
    Unclassified,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FailureReason::MalformedRequest => "Incorrect request format",
            FailureReason::ServerRejected => "MockServer unknown error",
            FailureReason::NotYetMet => {
                "Expectation was not met: the API did not receive the specified number of calls"
            }
            FailureReason::Unclassified => "Unknown error",
        };
        f.write_str(message)
    }
}

/// A payload could not be assembled from the caller's description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("failed to serialize body to JSON: {0}")]
    Body(String),
    #[error("a verification needs at least one attempt")]
    NoAttempts,
}

/// Returned when trying to build a [`VerificationRange`] whose lower bound exceeds its upper bound.
///
/// [`VerificationRange`]: crate::VerificationRange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid verification range: at least {at_least} is greater than at most {at_most}")]
pub struct InvalidRange {
    pub at_least: u64,
    pub at_most: u64,
}

/// We could not get an answer out of the MockServer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to serialize the payload to JSON")]
    Serialization(#[from] serde_json::Error),
    #[error("failed to build the HTTP request for {uri}")]
    InvalidRequest {
        uri: String,
        #[source]
        source: http::Error,
    },
    #[error("failed to reach the MockServer at {uri}")]
    Connection {
        uri: String,
        #[source]
        source: BoxError,
    },
    #[error("failed to read the response body returned by {uri}")]
    Body {
        uri: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{address}` is not a valid MockServer address")]
    InvalidAddress {
        address: String,
        #[source]
        source: url::ParseError,
    },
    #[error("`{0}` does not name a host")]
    MissingHost(String),
    #[error("the default transport only speaks plain HTTP, `{address}` uses `{scheme}`")]
    UnsupportedScheme { address: String, scheme: String },
}

/// Registering an expectation failed.
#[derive(Debug, Error)]
pub enum ExpectationError {
    #[error("unable to create expectation")]
    Build(#[from] BuildError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{reason} (status {status}): {body}")]
    Rejected {
        reason: FailureReason,
        status: StatusCode,
        body: String,
    },
}

impl ExpectationError {
    /// The classification of the server answer, if the server answered at all.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            ExpectationError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Verifying an expectation failed.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("unable to create verifier")]
    Build(#[from] BuildError),
    #[error("could not talk to the MockServer on attempt {attempt}")]
    Transport {
        attempt: u32,
        #[source]
        source: TransportError,
    },
    #[error("{reason} after {attempts} attempt(s). Last response status: {status}. Body:\n{body}")]
    Failed {
        reason: FailureReason,
        attempts: u32,
        status: StatusCode,
        body: String,
    },
    #[error("verification cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl VerificationError {
    /// The terminal classification of the verification.
    ///
    /// Transport failures are reported as [`FailureReason::Unclassified`]; construction
    /// errors and cancellations never reached a classification.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            VerificationError::Failed { reason, .. } => Some(*reason),
            VerificationError::Transport { .. } => Some(FailureReason::Unclassified),
            VerificationError::Build(_) | VerificationError::Cancelled { .. } => None,
        }
    }
}

/// Resetting the MockServer failed.
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("unable to reset expectations")]
    Transport(#[from] TransportError),
    #[error("unable to reset expectations: unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

/// Render an error together with the chain of its sources, one per line.
pub(crate) fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        message.push_str("\n\tcaused by: ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}
