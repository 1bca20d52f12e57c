//! Local stand-in chassis for HTTP tests
//!
//! Serves `/nislsc/call` from an axum router on a background tokio runtime. Two extra routes
//! misbehave on purpose: `/garbage` answers 200 with a non-JSON body, `/broken` answers 500.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::rpc::request::RequestEnvelope;

type Responder = Arc<dyn Fn(&RequestEnvelope) -> Value + Send + Sync>;

#[derive(Clone)]
struct ChassisState {
    responder: Responder,
    received: Arc<Mutex<Vec<RequestEnvelope>>>,
}

pub struct TestChassis {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<RequestEnvelope>>>,
}

impl TestChassis {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.addr.to_string())
    }

    pub fn received(&self) -> Vec<RequestEnvelope> {
        self.received.lock().expect("received lock").clone()
    }
}

pub fn spawn_chassis(
    responder: impl Fn(&RequestEnvelope) -> Value + Send + Sync + 'static,
) -> TestChassis {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ChassisState {
        responder: Arc::new(responder),
        received: received.clone(),
    };

    let app = Router::new()
        .route("/nislsc/call", post(rpc_call))
        .route("/garbage", post(|| async { "<html>not json</html>" }))
        .route(
            "/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .with_state(state);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("test runtime");
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .expect("bind test chassis");
    let addr = listener.local_addr().expect("local addr");

    std::thread::spawn(move || {
        runtime.block_on(async move {
            axum::serve(listener, app.into_make_service())
                .await
                .expect("serve test chassis");
        });
    });

    TestChassis { addr, received }
}

async fn rpc_call(State(state): State<ChassisState>, body: Bytes) -> Json<Value> {
    let envelope = match RequestEnvelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32700, "message": "Parse error"}
            }))
        }
    };

    let reply = (state.responder)(&envelope);
    state
        .received
        .lock()
        .expect("received lock")
        .push(envelope);
    Json(reply)
}
