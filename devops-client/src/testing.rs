//! In-memory transport that records calls and replays scripted replies.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::{ClientConfig, Credentials};
use crate::connection::Connection;
use crate::error::TransportError;
use crate::transport::{Method, Transport};

/// One recorded call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

/// Scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
}

struct Route {
    method: Method,
    fragment: String,
    replies: VecDeque<Reply>,
}

/// Transport matching calls by method and URL fragment.
///
/// Routes are tried in registration order. Each route replays its replies in order
/// and keeps repeating the last one.
#[derive(Default)]
pub struct RecordingTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, fragment: &str, replies: Vec<Reply>) -> &Self {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            replies: replies.into(),
        });
        self
    }

    pub fn on_json(&self, method: Method, fragment: &str, value: Value) -> &Self {
        self.on(method, fragment, vec![Reply::Json(value)])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, method: Method, fragment: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method && call.url.contains(fragment))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn call(
        &self,
        method: Method,
        url: &str,
        _credentials: &Credentials,
        body: Option<&Value>,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter_mut()
                .find(|route| route.method == method && url.contains(&route.fragment))
                .and_then(|route| {
                    if route.replies.len() > 1 {
                        route.replies.pop_front()
                    } else {
                        route.replies.front().cloned()
                    }
                })
        };

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Status(status)) => Err(TransportError::ApiError {
                status,
                message: format!("scripted {}", status),
            }),
            None => Err(TransportError::ApiError {
                status: 404,
                message: format!("no route for {} {}", method, url),
            }),
        }
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::for_account("fabrikam", "test-pat").with_instance_url("https://fabrikam.example.com")
}

pub fn connection(transport: Arc<RecordingTransport>) -> Connection {
    Connection::new(&test_config(), transport).unwrap()
}
