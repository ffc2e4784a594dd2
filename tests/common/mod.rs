#![allow(dead_code)]
use async_trait::async_trait;
use mockserver_client::http::{StatusCode, Url};
use mockserver_client::{HttpTransport, Reporter, ServerResponse, TransportError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Call {
    pub uri: String,
    pub body: Option<Value>,
    pub at: Instant,
}

/// Answers with a scripted sequence of status codes, repeating the last one once exhausted.
/// The body of each answer is `status <code>`.
#[derive(Debug)]
pub struct ScriptedTransport {
    statuses: Vec<u16>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new(statuses: &[u16]) -> Arc<Self> {
        assert!(!statuses.is_empty(), "Script at least one status code!");
        Arc::new(Self {
            statuses: statuses.to_vec(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn always(status: u16) -> Arc<Self> {
        Self::new(&[status])
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn n_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn put(&self, uri: &Url, body: Option<Vec<u8>>) -> Result<ServerResponse, TransportError> {
        let status = {
            let mut calls = self.calls.lock().unwrap();
            let status = self.statuses[calls.len().min(self.statuses.len() - 1)];
            calls.push(Call {
                uri: uri.to_string(),
                body: body.map(|b| serde_json::from_slice(&b).unwrap()),
                at: Instant::now(),
            });
            status
        };
        Ok(ServerResponse::new(
            StatusCode::from_u16(status).unwrap(),
            format!("status {}", status),
        ))
    }
}

/// Never reaches the server.
#[derive(Debug, Default)]
pub struct FailingTransport {
    calls: Mutex<usize>,
}

impl FailingTransport {
    pub fn n_calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl HttpTransport for FailingTransport {
    async fn put(&self, uri: &Url, _body: Option<Vec<u8>>) -> Result<ServerResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        Err(TransportError::Connection {
            uri: uri.to_string(),
            source: "connection refused".into(),
        })
    }
}

/// Records failures together with the number of transport calls made when they were reported.
#[derive(Debug)]
pub struct RecordingReporter {
    transport: Arc<ScriptedTransport>,
    failures: Mutex<Vec<(usize, String)>>,
    logs: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new(transport: Arc<ScriptedTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            failures: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
        })
    }

    pub fn failures(&self) -> Vec<(usize, String)> {
        self.failures.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn log(&self, message: &str) {
        self.logs.lock().unwrap().push(message.to_string());
    }

    fn fail(&self, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((self.transport.n_calls(), message.to_string()));
    }
}
