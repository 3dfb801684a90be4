//! Database record models matching table schemas.
//!
//! Each struct here corresponds to a table row (deriving `sqlx::FromRow`) or
//! to the payload of an insert/update. They stay separate from the API models
//! so the storage and wire representations can evolve independently; row
//! types convert into API responses via `From` impls on the API side.

pub mod categories;
pub mod password_reset_tokens;
pub mod refresh_tokens;
pub mod transfers;
pub mod users;
pub mod wallets;
