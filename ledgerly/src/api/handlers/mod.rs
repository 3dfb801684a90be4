//! Axum route handlers for all API endpoints.
//!
//! Handlers stay thin: extract, validate, call the repository, translate the
//! result. Ownership scoping happens in the repositories via the
//! authenticated [`crate::api::models::auth::CurrentUser`].

use axum::{
    extract::Request,
    http::{HeaderName, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod transfers;
pub mod wallets;

/// Header carrying the comma-separated methods a resource supports.
pub static X_OPTIONS: HeaderName = HeaderName::from_static("x-options");

/// Respond to a method-discovery OPTIONS request with the supported methods.
pub(crate) fn options_response(methods: &'static str) -> (StatusCode, [(HeaderName, &'static str); 1]) {
    (StatusCode::OK, [(X_OPTIONS.clone(), methods)])
}

/// Serve method-discovery OPTIONS requests ahead of the CORS layer.
///
/// The CORS layer short-circuits every OPTIONS request with a preflight
/// response, which would swallow the `X-Options` contract. A preflight always
/// carries `Access-Control-Request-Method`; an OPTIONS request without it is
/// a discovery request and is answered here, from outside that layer.
pub async fn method_discovery(request: Request, next: Next) -> Response {
    let discovery = request.method() == Method::OPTIONS
        && !request.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    if discovery {
        match request.uri().path() {
            "/api/categories" => return categories::category_options().await.into_response(),
            "/api/wallets" => return wallets::wallet_options().await.into_response(),
            "/api/transfers" => return transfers::transfer_options().await.into_response(),
            _ => {}
        }
    }

    next.run(request).await
}
