use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::warn;

#[derive(Debug)]
struct Window {
    start: Instant,
    count: u32,
}

/// Fixed one-second window counter, shared per route group. The form
/// surface and the dashboard/webhook APIs each get their own budget.
#[derive(Clone, Debug)]
pub struct Throttle {
    scope: &'static str,
    rps: u32,
    window: Arc<Mutex<Window>>,
}

impl Throttle {
    pub fn new(scope: &'static str, rps: u32) -> Self {
        Self {
            scope,
            rps: rps.max(1),
            window: Arc::new(Mutex::new(Window {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    fn allow(&self) -> bool {
        let mut guard = self.window.lock().expect("throttle mutex poisoned");
        let now = Instant::now();
        if now.duration_since(guard.start) >= Duration::from_secs(1) {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.rps {
            guard.count += 1;
            true
        } else {
            false
        }
    }
}

pub async fn throttle_middleware(
    State(throttle): State<Throttle>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !throttle.allow() {
        warn!(
            "Throttling {} request: {} rps budget exhausted",
            throttle.scope, throttle.rps
        );
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests" })),
        )
            .into_response();
    }
    next.run(req).await
}
