use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::CorsConfig;

/// Builds the CORS layer: the configured allow-list, or any origin when empty.
///
/// Disallowed origins get no CORS headers; the browser then blocks the
/// response.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = config.normalized_origins();
    let allow_origin = if origins.is_empty() {
        info!("CORS: allowing any origin");
        AllowOrigin::any()
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .inspect_err(|e| warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin"))
                    .ok()
            })
            .collect();
        info!(origins = ?origins, "CORS: allow-list");
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
