//! In-memory transport for exercising request sequences.

use std::collections::VecDeque;

use adtstack_core::{AdtRequest, AdtResponse, Transport, TransportError};
use parking_lot::Mutex;

/// Replays queued responses in order and records every request it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    replies: Mutex<VecDeque<Result<String, u16>>>,
    requests: Mutex<Vec<AdtRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        let transport = Self::default();
        for text in texts {
            transport.reply(text);
        }
        transport
    }

    pub(crate) fn reply(&self, text: impl Into<String>) {
        self.replies.lock().push_back(Ok(text.into()));
    }

    pub(crate) fn fail(&self, status: u16) {
        self.replies.lock().push_back(Err(status));
    }

    pub(crate) fn requests(&self) -> Vec<AdtRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &AdtRequest) -> Result<AdtResponse, TransportError> {
        self.requests.lock().push(request.clone());
        match self.replies.lock().pop_front() {
            Some(Ok(text)) => Ok(AdtResponse::ok(text)),
            Some(Err(status)) => Err(TransportError::Status {
                method: request.method().to_string(),
                url: request.path().to_owned(),
                status,
                body: String::new(),
            }),
            None => Err(TransportError::Status {
                method: request.method().to_string(),
                url: request.path().to_owned(),
                status: 599,
                body: "no reply queued".to_owned(),
            }),
        }
    }
}
