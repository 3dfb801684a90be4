//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/auth/*`): registration, login, token refresh,
//!   email confirmation, password reset
//! - **Categories** (`/api/categories/*`): income/expense categories
//! - **Wallets** (`/api/wallets/*`): wallets and balances
//! - **Transfers** (`/api/transfers/*`): money movements, paginated listing
//! - **Dashboard** (`/api/dashboard`): aggregated overview
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`;
//! interactive documentation is served at `/docs`.

pub mod handlers;
pub mod models;
