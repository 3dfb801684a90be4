//! OpenAPI documentation configuration.
//!
//! The whole API lives under `/api`; interactive docs are served at `/docs`
//! and the raw spec at `/api-docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer token security scheme shared by every authenticated endpoint.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "JWT access token from the login or refresh endpoint:\n\n\
                            ```\nAuthorization: Bearer YOUR_ACCESS_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledgerly API",
        description = "Personal finance tracking: wallets, categorized transfers, dashboards and monthly reports.",
    ),
    servers((url = "/api")),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::register,
        api::handlers::auth::refresh,
        api::handlers::auth::confirm_email,
        api::handlers::auth::reset_password,
        api::handlers::auth::confirm_reset_password,
        api::handlers::categories::list_categories,
        api::handlers::categories::create_category,
        api::handlers::categories::get_category,
        api::handlers::categories::list_category_transfers,
        api::handlers::categories::update_category,
        api::handlers::categories::delete_category,
        api::handlers::categories::category_options,
        api::handlers::wallets::list_wallets,
        api::handlers::wallets::create_wallet,
        api::handlers::wallets::get_wallet,
        api::handlers::wallets::update_wallet,
        api::handlers::wallets::delete_wallet,
        api::handlers::wallets::wallet_options,
        api::handlers::transfers::list_transfers,
        api::handlers::transfers::create_transfer,
        api::handlers::transfers::get_transfer,
        api::handlers::transfers::update_transfer,
        api::handlers::transfers::delete_transfer,
        api::handlers::transfers::transfer_options,
        api::handlers::dashboard::get_dashboard,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token management"),
        (name = "categories", description = "Income/expense categories"),
        (name = "wallets", description = "Wallets and balances"),
        (name = "transfers", description = "Money movements"),
        (name = "dashboard", description = "Aggregated overview"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_contains_all_resources() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in [
            "/auth/login",
            "/auth/register",
            "/categories",
            "/categories/{id}",
            "/categories/{id}/transfers",
            "/wallets/{id}",
            "/transfers",
            "/dashboard",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing path {expected}");
        }
    }
}
