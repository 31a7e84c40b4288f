//! In-process [`Fetch`] double for unit tests.

use crate::errors::{Result, SwapError};
use crate::transport::Fetch;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response};
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub(crate) enum MockReply {
    Http {
        status: u16,
        body: String,
        headers: Vec<(String, String)>,
    },
    Fail(String),
}

impl MockReply {
    pub(crate) fn json(status: u16, body: impl Into<String>) -> Self {
        MockReply::Http {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub(crate) fn with_header(self, name: &str, value: &str) -> Self {
        match self {
            MockReply::Http {
                status,
                body,
                mut headers,
            } => {
                headers.push((name.to_string(), value.to_string()));
                MockReply::Http {
                    status,
                    body,
                    headers,
                }
            }
            fail => fail,
        }
    }
}

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RecordedCall {
    pub(crate) fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub(crate) fn json_body(&self) -> Option<Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

type Handler = Box<dyn Fn(&RecordedCall, usize) -> MockReply + Send + Sync>;

/// Records every request and answers from a handler.
pub(crate) struct MockFetch {
    handler: Handler,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
}

impl MockFetch {
    /// Answers every request with the same reply.
    pub(crate) fn always(reply: MockReply) -> Self {
        Self::routed(move |_, _| reply.clone())
    }

    /// Answers the n-th request with the n-th reply, repeating the last one.
    pub(crate) fn sequence(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty());
        Self::routed(move |_, n| replies[n.min(replies.len() - 1)].clone())
    }

    /// Answers with `handler(call, index)`.
    pub(crate) fn routed<F>(handler: F) -> Self
    where
        F: Fn(&RecordedCall, usize) -> MockReply + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Sleeps before answering.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn fetch(&self, request: Request) -> Result<Response> {
        let call = RecordedCall {
            method: request.method().clone(),
            path: request.url().path().to_string(),
            headers: request.headers().clone(),
            body: request.body().and_then(|b| b.as_bytes()).map(<[u8]>::to_vec),
        };
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call.clone());
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match (self.handler)(&call, index) {
            MockReply::Http {
                status,
                body,
                headers,
            } => {
                let mut builder = http::Response::builder().status(status);
                for (name, value) in headers {
                    builder = builder.header(name, value);
                }
                Ok(Response::from(builder.body(body).unwrap()))
            }
            MockReply::Fail(message) => Err(SwapError::network(message)),
        }
    }
}
