//! Permissive CORS for browser clients.
//!
//! The service is called directly from frontend code, so every response
//! carries `Access-Control-Allow-Origin: *`, and preflights are answered
//! with 204 regardless of path or body. Implemented as middleware rather
//! than `tower_http::cors::CorsLayer` because the contract pins preflight
//! responses to 204, while the layer answers them with 200.

use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Answer preflights; stamp the allow-origin header on everything else.
pub async fn permissive_cors(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return (
            StatusCode::NO_CONTENT,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET, OPTIONS"),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
                (header::ACCESS_CONTROL_MAX_AGE, "3600"),
            ],
        )
            .into_response();
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
