use std::time::Instant;

use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::rpc::request::RequestEnvelope;

/// Installs a compact stderr subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Summary of one RPC round trip, emitted once the response is in hand.
pub(crate) fn log_call(envelope: &RequestEnvelope, started_at: Instant, has_error: bool) {
    let elapsed_ms = started_at.elapsed().as_millis();
    let method = envelope.method();
    let id = envelope.id;
    let session_id = envelope.request.session_id().unwrap_or("-");

    debug!(
        method = %method,
        id = id,
        session_id = %session_id,
        duration_ms = elapsed_ms,
        "rpc call summary"
    );

    if has_error {
        warn!(
            method = %method,
            id = id,
            session_id = %session_id,
            "chassis returned an rpc error"
        );
    }
}
