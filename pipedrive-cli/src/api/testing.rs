//! In-memory transport for tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::client::PipedriveClient;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{Error, Result};

/// Records every request and answers with queued canned responses
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_raw(status, body.to_string().into_bytes());
    }

    pub fn push_raw(&self, status: u16, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse { status, body });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    pub fn client(self: &Arc<Self>) -> PipedriveClient {
        let transport: Arc<dyn Transport> = self.clone();
        PipedriveClient::with_transport(transport, "test-token").unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::UnexpectedResponse("no canned response queued".to_string()))
    }
}
