#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use dtf_ui::client::{ApiRequest, Backend};
use dtf_ui::error::{ClientError, Result};
use serde_json::Value;

/// Backend that records requests and answers from a scripted queue.
#[derive(Default)]
pub struct FakeBackend {
    responses: RefCell<VecDeque<Result<Value>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(body));
        self
    }

    pub fn fail_with_status(self, code: u16) -> Self {
        self.responses.borrow_mut().push_back(Err(ClientError::Status {
            url: "fake".to_string(),
            code,
            body: String::new(),
        }));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Backend for FakeBackend {
    fn send(&self, request: &ApiRequest) -> Result<Value> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport {
                url: request.path.clone(),
                message: "no scripted response".to_string(),
            }))
    }
}
