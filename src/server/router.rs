use crate::artwork::ArtworkStore;
use crate::artwork::filename::random_token;
use crate::config::{Config, CorsConfig};
use crate::error::PantryError;
use crate::server::routes::{art, health};

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{HeaderName, HeaderValue, Method, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Level, event, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct PantryState {
    pub store: ArtworkStore,
}

impl PantryState {
    pub fn new(store: ArtworkStore) -> Self {
        Self { store }
    }
}

async fn not_found_handler() -> PantryError {
    PantryError::RouteNotFound
}

async fn method_not_allowed_handler() -> PantryError {
    PantryError::MethodNotAllowed
}

/// One structured event per request; the level follows the status class.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let version = req.version();

    // Client ids are echoed back when sane; otherwise 96 random bits.
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(random_token::<12>, str::to_owned);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let started = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    macro_rules! served {
        ($level:expr) => {
            event!(
                $level,
                status = status.as_u16(),
                %request_id,
                %method,
                ?version,
                %path,
                latency_ms,
                user_agent = user_agent.as_deref().unwrap_or("-"),
                "served"
            )
        };
    }

    if status.is_server_error() {
        served!(Level::ERROR);
    } else if status.is_client_error() {
        served!(Level::WARN);
    } else {
        served!(Level::INFO);
    }

    resp
}

/// `None` when no origins are configured.
fn cors_layer(cfg: &CorsConfig) -> Option<CorsLayer> {
    if cfg.allow_origins.is_empty() {
        return None;
    }

    let allow_origin = if cfg.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = cfg
            .allow_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any),
    )
}

pub fn pantry_router(state: PantryState, cfg: &Config) -> Router {
    let mut router = Router::new()
        .merge(art::router())
        .merge(health::router())
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state);

    if let Some(cors) = cors_layer(&cfg.cors) {
        router = router.layer(cors);
    }

    router
        .layer(DefaultBodyLimit::max(cfg.storage.max_upload_bytes))
        .layer(middleware::from_fn(access_log))
}
