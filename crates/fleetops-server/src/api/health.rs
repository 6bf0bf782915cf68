use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness check body; does not touch the database
#[derive(Debug, Serialize)]
struct Liveness {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

impl Liveness {
    fn current() -> Self {
        Self {
            status: "ok",
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

async fn liveness() -> Json<Liveness> {
    Json(Liveness::current())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}
