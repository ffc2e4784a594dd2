//! Polling MockServer's `verify` endpoint until the expectation is met or we run out of attempts.
//!
//! The loop is split in two halves:
//! - [`Poll`], a pure state machine fed with one classified outcome per attempt;
//! - [`VerificationPoller`], which drives it: builds the payload, talks to the transport,
//!   sleeps between attempts and honours the shutdown signal.
use crate::errors::{BuildError, FailureReason, VerificationError};
use crate::reporter::Reporter;
use crate::transport::{BodyPrintLimit, TransportClient};
use crate::{RequestPattern, VerificationRange, VerificationRequest};
use http::StatusCode;
use log::{debug, info, warn};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// The delay between two verification attempts, unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What a single answer of the `verify` endpoint means for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Satisfied,
    Unmet(FailureReason),
}

impl Outcome {
    pub(crate) fn of(status: StatusCode) -> Self {
        match status.as_u16() {
            202 => Outcome::Satisfied,
            400 => Outcome::Unmet(FailureReason::MalformedRequest),
            403 => Outcome::Unmet(FailureReason::ServerRejected),
            406 => Outcome::Unmet(FailureReason::NotYetMet),
            _ => Outcome::Unmet(FailureReason::Unclassified),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollState {
    Polling { attempt: u32 },
    Satisfied { attempts: u32 },
    Failed { reason: FailureReason, attempts: u32 },
}

/// Book-keeping for one verification call: which attempt we are on and how the last one went.
#[derive(Debug)]
pub(crate) struct Poll {
    attempt: u32,
    max_attempts: u32,
    last_outcome: Option<Outcome>,
}

impl Poll {
    pub(crate) fn new(max_attempts: u32) -> Result<Self, BuildError> {
        if max_attempts == 0 {
            return Err(BuildError::NoAttempts);
        }
        Ok(Self {
            attempt: 1,
            max_attempts,
            last_outcome: None,
        })
    }

    pub(crate) fn attempt(&self) -> u32 {
        self.attempt
    }

    pub(crate) fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Record the outcome of the current attempt and compute the next state.
    ///
    /// Unmet outcomes are tolerated until the last attempt, whatever their reason.
    pub(crate) fn advance(&mut self, outcome: Outcome) -> PollState {
        self.last_outcome = Some(outcome);
        match outcome {
            Outcome::Satisfied => PollState::Satisfied {
                attempts: self.attempt,
            },
            Outcome::Unmet(reason) if self.attempt >= self.max_attempts => PollState::Failed {
                reason,
                attempts: self.attempt,
            },
            Outcome::Unmet(_) => {
                self.attempt += 1;
                PollState::Polling {
                    attempt: self.attempt,
                }
            }
        }
    }
}

/// Returned by a successful [`MockServerClient::verify`].
///
/// [`MockServerClient::verify`]: crate::MockServerClient::verify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationReport {
    range: VerificationRange,
    attempts: u32,
}

impl VerificationReport {
    /// The range that was verified.
    pub fn range(&self) -> VerificationRange {
        self.range
    }

    /// How many calls to the `verify` endpoint it took.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Expectation has been met ({}) after {} attempt(s)",
            self.range, self.attempts
        )
    }
}

pub(crate) struct VerificationPoller<'a> {
    pub(crate) transport: &'a TransportClient,
    pub(crate) uri: &'a Url,
    pub(crate) interval: Duration,
    pub(crate) body_print_limit: BodyPrintLimit,
    pub(crate) reporter: &'a dyn Reporter,
}

impl VerificationPoller<'_> {
    /// Poll until a terminal state is reached or `shutdown` resolves.
    ///
    /// `shutdown` is only watched while waiting between attempts: an in-flight request always
    /// completes and gets classified.
    pub(crate) async fn run<S>(
        &self,
        pattern: &RequestPattern,
        range: VerificationRange,
        max_attempts: u32,
        shutdown: S,
    ) -> Result<VerificationReport, VerificationError>
    where
        S: Future<Output = ()>,
    {
        let mut poll = Poll::new(max_attempts)?;
        tokio::pin!(shutdown);

        loop {
            let attempt = poll.attempt();
            self.reporter
                .log(&format!("Attempting {} of {}", attempt, max_attempts));

            // Rebuilt on every attempt, it's cheap.
            let payload = VerificationRequest::build(pattern, range)?;
            let response = self
                .transport
                .execute(&payload, self.uri)
                .await
                .map_err(|source| VerificationError::Transport { attempt, source })?;

            match poll.advance(Outcome::of(response.status())) {
                PollState::Satisfied { attempts } => {
                    let report = VerificationReport { range, attempts };
                    info!("{}", report);
                    return Ok(report);
                }
                PollState::Failed { reason, attempts } => {
                    return Err(VerificationError::Failed {
                        reason,
                        attempts,
                        status: response.status(),
                        body: response.body_with_limit(self.body_print_limit),
                    });
                }
                PollState::Polling { attempt: next } => {
                    if let Some(Outcome::Unmet(reason)) = poll.last_outcome() {
                        match reason {
                            FailureReason::NotYetMet => debug!(
                                "Attempt {} of {}: {} (status {}), retrying in {:?}",
                                attempt,
                                max_attempts,
                                reason,
                                response.status(),
                                self.interval
                            ),
                            _ => warn!(
                                "Attempt {} of {}: {} (status {}), retrying in {:?}",
                                attempt,
                                max_attempts,
                                reason,
                                response.status(),
                                self.interval
                            ),
                        }
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {
                            debug!("Starting attempt {}", next);
                        }
                        _ = shutdown.as_mut() => {
                            debug!("Verification cancelled after attempt {}", attempt);
                            return Err(VerificationError::Cancelled { attempts: attempt });
                        }
                    }
                }
            }
        }
    }
}
