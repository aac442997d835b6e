use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::{header::ORIGIN, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::sync::watch;

use crate::assembler::SignalAssembler;
use crate::config::ServerConfig;
use crate::market_data::PriceSource;
use crate::session::{run_session, SessionContext, StreamQuery};

/// Which browser origins may open a stream. Requests without an `Origin`
/// header are always accepted; an empty allow-list accepts every origin.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed: allowed
                .iter()
                .map(|o| normalize_origin(o))
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }

    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn allows(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(_) if self.allowed.is_empty() => true,
            Some(origin) => {
                let origin = normalize_origin(origin);
                self.allowed.iter().any(|a| a == &origin)
            }
        }
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Immutable state shared by every request.
pub struct AppState<S> {
    pub assembler: Arc<SignalAssembler<S>>,
    pub origins: Arc<OriginPolicy>,
    pub shutdown: watch::Receiver<bool>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            assembler: Arc::clone(&self.assembler),
            origins: Arc::clone(&self.origins),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(
        assembler: SignalAssembler<S>,
        server: &ServerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            assembler: Arc::new(assembler),
            origins: Arc::new(OriginPolicy::new(&server.allowed_origins)),
            shutdown,
        }
    }
}

pub fn router<S>(state: AppState<S>, stream_path: &str) -> Router
where
    S: PriceSource + 'static,
{
    Router::new()
        .route(stream_path, get(stream_handler::<S>))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

async fn stream_handler<S>(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
    State(state): State<AppState<S>>,
) -> Response
where
    S: PriceSource + 'static,
{
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.origins.allows(origin) {
        tracing::warn!(origin = origin.unwrap_or(""), "Rejected stream from disallowed origin");
        return StatusCode::FORBIDDEN.into_response();
    }

    let query = StreamQuery::from_pairs(pairs);
    let ctx = SessionContext {
        assembler: Arc::clone(&state.assembler),
        shutdown: state.shutdown.clone(),
    };
    ws.on_upgrade(move |socket| async move {
        run_session(socket, query, ctx).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_policy_accepts_any_origin() {
        let policy = OriginPolicy::allow_all();
        assert!(policy.allows(Some("https://evil.example")));
        assert!(policy.allows(None));
    }

    #[test]
    fn allow_list_matches_normalized_origins() {
        let policy = OriginPolicy::new(&[
            "http://localhost:3000/".to_string(),
            "  ".to_string(),
        ]);
        assert!(policy.allows(Some("HTTP://LOCALHOST:3000")));
        assert!(!policy.allows(Some("http://localhost:5173")));
        assert!(policy.allows(None));
    }
}
