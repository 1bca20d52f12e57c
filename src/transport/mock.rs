//! Mock transport for testing
//!
//! Replies are scripted up front and every envelope sent is captured for assertions.
//! Clones share the same script and capture, so a test can keep one clone after handing
//! another to a session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};

use crate::errors::ClientError;
use crate::rpc::request::RequestEnvelope;

use super::Transport;

#[derive(Debug, Clone)]
pub enum MockReply {
    /// Raw response mapping; an `id` of `null` is replaced by the request id.
    Response(Value),
    /// Non-JSON body with the given HTTP status.
    Status(u16, String),
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    sent: Arc<Mutex<Vec<RequestEnvelope>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result object of the next successful call.
    pub fn queue_result(&self, result: Value) {
        self.queue(MockReply::Response(Self::success_response(Value::Null, result)));
    }

    /// Queue an RPC error for the next call.
    pub fn queue_error(&self, code: i64, message: &str) {
        self.queue(MockReply::Response(Self::error_response(
            Value::Null,
            code,
            message,
        )));
    }

    pub fn queue(&self, reply: MockReply) {
        lock(&self.replies).push_back(reply);
    }

    pub fn success_response(id: Value, result: Value) -> Value {
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "result": result
        })
    }

    pub fn error_response(id: Value, code: i64, message: &str) -> Value {
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "error": {
                "code": code,
                "message": message
            }
        })
    }

    pub fn sent(&self) -> Vec<RequestEnvelope> {
        lock(&self.sent).clone()
    }

    pub fn sent_methods(&self) -> Vec<&'static str> {
        lock(&self.sent)
            .iter()
            .map(RequestEnvelope::method)
            .collect()
    }

    pub fn sent_ids(&self) -> Vec<u64> {
        lock(&self.sent).iter().map(|envelope| envelope.id).collect()
    }
}

impl Transport for MockTransport {
    fn call(&mut self, envelope: &RequestEnvelope) -> Result<Value, ClientError> {
        lock(&self.sent).push(envelope.clone());

        // An empty script answers every call with an empty result.
        let reply = lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| MockReply::Response(Self::success_response(Value::Null, json!({}))));

        match reply {
            MockReply::Response(mut value) => {
                if let Some(id) = value.get_mut("id").filter(|id| id.is_null()) {
                    *id = Value::String(envelope.id.to_string());
                }
                Ok(value)
            }
            MockReply::Status(status, body) => Err(ClientError::HttpStatus { status, body }),
        }
    }

    fn transport_type(&self) -> &'static str {
        "mock"
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::request::Request;

    #[test]
    fn replays_script_in_order_and_fills_ids() {
        let mock = MockTransport::new();
        mock.queue_result(json!({"session_id": "_session1"}));
        mock.queue_error(-1, "nope");

        let mut transport = mock.clone();
        let first = transport
            .call(&RequestEnvelope::new(1, Request::close("_s")))
            .expect("first");
        let second = transport
            .call(&RequestEnvelope::new(2, Request::abort("_s")))
            .expect("second");
        let third = transport
            .call(&RequestEnvelope::new(3, Request::close("_s")))
            .expect("third");

        assert_eq!(first["id"], json!("1"));
        assert_eq!(first["result"]["session_id"], json!("_session1"));
        assert_eq!(second["error"]["message"], json!("nope"));
        assert_eq!(third["result"], json!({}));
        assert_eq!(mock.sent_ids(), vec![1, 2, 3]);
        assert_eq!(
            mock.sent_methods(),
            vec!["closeSession", "abortSession", "closeSession"]
        );
    }

    #[test]
    fn status_reply_is_a_transport_error() {
        let mock = MockTransport::new();
        mock.queue(MockReply::Status(503, "busy".to_string()));

        let mut transport = mock.clone();
        let err = transport
            .call(&RequestEnvelope::new(1, Request::close("_s")))
            .expect_err("expected status error");
        assert!(matches!(err, ClientError::HttpStatus { status: 503, .. }));
        assert_eq!(mock.sent().len(), 1);
    }
}
