mod common;

use common::{FailingTransport, RecordingReporter, ScriptedTransport};
use mockserver_client::http::StatusCode;
use mockserver_client::{
    BuildError, FailureReason, MockServerClient, PanicReporter, RequestPattern,
    VerificationError, VerificationRange,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn client(transport: &Arc<ScriptedTransport>) -> MockServerClient {
    MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .build()
        .unwrap()
}

fn pattern() -> RequestPattern {
    RequestPattern::new()
        .method("POST")
        .path("/notifications")
        .body_json(json!({ "to": "ada@example.com" }))
}

#[tokio::test(start_paused = true)]
async fn a_satisfied_verification_takes_a_single_call() {
    // Arrange
    let transport = ScriptedTransport::always(202);

    // Act
    let report = client(&transport)
        .verify(&pattern(), VerificationRange::once(), 5)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.attempts(), 1);
    assert_eq!(report.range(), VerificationRange::once());
    assert_eq!(transport.n_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn not_yet_met_is_retried_every_second() {
    // Arrange
    let transport = ScriptedTransport::new(&[406, 406, 406, 406, 202]);

    // Act
    let report = client(&transport)
        .verify(&pattern(), VerificationRange::once(), 5)
        .await
        .unwrap();

    // Assert
    assert_eq!(report.attempts(), 5);
    let calls = transport.calls();
    assert_eq!(calls.len(), 5);
    for pair in calls.windows(2) {
        let delay = pair[1].at - pair[0].at;
        assert!(delay >= Duration::from_secs(1), "Waited only {:?}", delay);
        assert!(delay < Duration::from_millis(1100), "Waited {:?}", delay);
    }
}

#[tokio::test(start_paused = true)]
async fn the_poll_interval_can_be_configured() {
    // Arrange
    let transport = ScriptedTransport::new(&[406, 202]);
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .poll_interval(Duration::from_millis(250))
        .build()
        .unwrap();

    // Act
    client
        .verify(&pattern(), VerificationRange::once(), 2)
        .await
        .unwrap();

    // Assert
    let calls = transport.calls();
    let delay = calls[1].at - calls[0].at;
    assert!(delay >= Duration::from_millis(250));
    assert!(delay < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn malformed_requests_are_only_reported_on_the_last_attempt() {
    // Arrange
    let transport = ScriptedTransport::always(400);
    let reporter = RecordingReporter::new(transport.clone());
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .reporter(reporter.clone())
        .build()
        .unwrap();

    // Act
    let outcome = client
        .verify(&pattern(), VerificationRange::once(), 3)
        .await;

    // Assert
    match outcome {
        Err(VerificationError::Failed {
            reason,
            attempts,
            status,
            ..
        }) => {
            assert_eq!(reason, FailureReason::MalformedRequest);
            assert_eq!(attempts, 3);
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
    assert_eq!(transport.n_calls(), 3);
    let failures = reporter.failures();
    assert_eq!(failures.len(), 1);
    // Reported once, after the third call.
    assert_eq!(failures[0].0, 3);
    assert!(failures[0].1.starts_with("Incorrect request format after 3 attempt(s)"));
    assert_eq!(
        reporter.logs()[..3],
        ["Attempting 1 of 3", "Attempting 2 of 3", "Attempting 3 of 3"]
    );
}

#[tokio::test(start_paused = true)]
async fn the_last_answer_decides_the_failure_reason() {
    let cases = [
        (vec![400u16, 406, 403], FailureReason::ServerRejected),
        (vec![403, 500, 406], FailureReason::NotYetMet),
        (vec![406, 406, 500], FailureReason::Unclassified),
        (vec![406, 406, 200], FailureReason::Unclassified),
    ];

    for (statuses, expected) in cases {
        // Arrange
        let transport = ScriptedTransport::new(&statuses);

        // Act
        let outcome = client(&transport)
            .verify(&pattern(), VerificationRange::once(), 3)
            .await;

        // Assert
        let error = outcome.unwrap_err();
        assert_eq!(error.reason(), Some(expected), "Statuses: {:?}", statuses);
        assert_eq!(transport.n_calls(), 3);
    }
}

#[tokio::test(start_paused = true)]
async fn an_unmet_expectation_carries_the_server_answer() {
    // Arrange
    let transport = ScriptedTransport::always(406);

    // Act
    let error = client(&transport)
        .verify(&pattern(), VerificationRange::twice(), 2)
        .await
        .unwrap_err();

    // Assert
    match &error {
        VerificationError::Failed { body, .. } => assert_eq!(body, "status 406"),
        other => panic!("Unexpected error: {:?}", other),
    }
    assert!(error.to_string().contains("Expectation was not met"));
}

#[tokio::test(start_paused = true)]
async fn transport_failures_abort_the_poll_immediately() {
    // Arrange
    let transport = Arc::new(FailingTransport::default());
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .build()
        .unwrap();

    // Act
    let error = client
        .verify(&pattern(), VerificationRange::once(), 5)
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(error, VerificationError::Transport { attempt: 1, .. }));
    assert_eq!(error.reason(), Some(FailureReason::Unclassified));
    assert_eq!(transport.n_calls(), 1);
}

#[tokio::test]
async fn zero_attempts_is_rejected_before_any_call() {
    // Arrange
    let transport = ScriptedTransport::always(202);

    // Act
    let error = client(&transport)
        .verify(&pattern(), VerificationRange::once(), 0)
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(error, VerificationError::Build(BuildError::NoAttempts)));
    assert_eq!(transport.n_calls(), 0);
}

#[tokio::test]
async fn the_verify_payload_carries_the_body_as_a_json_string() {
    // Arrange
    let transport = ScriptedTransport::always(202);

    // Act
    client(&transport)
        .verify(&pattern(), VerificationRange::between(1, 3), 1)
        .await
        .unwrap();

    // Assert
    let calls = transport.calls();
    let call = &calls[0];
    assert_eq!(call.uri, "http://localhost:1080/mockserver/verify");
    let payload = call.body.as_ref().unwrap();
    assert_eq!(
        payload,
        &json!({
            "httpRequest": {
                "method": "POST",
                "path": "/notifications",
                "body": {
                    "contentType": "application/json",
                    "type": "JSON",
                    "matchType": "STRICT",
                    "json": "{\"to\":\"ada@example.com\"}"
                }
            },
            "times": { "atLeast": 1, "atMost": 3 }
        })
    );
    let decoded: Value =
        serde_json::from_str(payload["httpRequest"]["body"]["json"].as_str().unwrap()).unwrap();
    assert_eq!(decoded, json!({ "to": "ada@example.com" }));
}

#[tokio::test(start_paused = true)]
async fn verification_stops_when_the_shutdown_signal_fires() {
    // Arrange
    let transport = ScriptedTransport::always(406);

    // Act - calls happen at 0s, 1s and 2s; the signal fires while waiting for the fourth.
    let error = client(&transport)
        .verify_until(
            &pattern(),
            VerificationRange::once(),
            10,
            tokio::time::sleep(Duration::from_millis(2500)),
        )
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(error, VerificationError::Cancelled { attempts: 3 }));
    assert_eq!(error.reason(), None);
    assert_eq!(transport.n_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn a_cancelled_verification_is_not_reported_as_a_failure() {
    // Arrange
    let transport = ScriptedTransport::always(406);
    let reporter = RecordingReporter::new(transport.clone());
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .reporter(reporter.clone())
        .build()
        .unwrap();

    // Act
    let error = client
        .verify_until(
            &pattern(),
            VerificationRange::once(),
            10,
            tokio::time::sleep(Duration::from_millis(1500)),
        )
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(error, VerificationError::Cancelled { attempts: 2 }));
    assert!(reporter.failures().is_empty());
    assert!(reporter
        .logs()
        .contains(&"verification cancelled after 2 attempt(s)".to_string()));
}

#[tokio::test(start_paused = true)]
async fn cancelling_does_not_trip_the_panic_reporter() {
    // Arrange
    let transport = ScriptedTransport::always(406);
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport.clone())
        .reporter(PanicReporter)
        .build()
        .unwrap();

    // Act
    let outcome = client
        .verify_until(
            &pattern(),
            VerificationRange::once(),
            10,
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await;

    // Assert
    assert!(matches!(
        outcome,
        Err(VerificationError::Cancelled { attempts: 1 })
    ));
    assert_eq!(transport.n_calls(), 1);
}

#[tokio::test(start_paused = true)]
#[should_panic(expected = "MockServer unknown error after 1 attempt(s)")]
async fn the_panic_reporter_fails_the_test() {
    let transport = ScriptedTransport::always(403);
    let client = MockServerClient::builder("localhost:1080")
        .transport(transport)
        .reporter(PanicReporter)
        .build()
        .unwrap();

    let _ = client
        .verify(&pattern(), VerificationRange::once(), 1)
        .await;
}
