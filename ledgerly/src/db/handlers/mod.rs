//! Database repositories, one per table.
//!
//! Every repository borrows a `PgConnection` so callers decide whether an
//! operation runs on a pool connection or inside a transaction. The
//! finance entities (categories, wallets, transfers) implement
//! [`repository::OwnedRepository`], whose every method is scoped by the
//! owning user; rows belonging to other users are indistinguishable from
//! rows that do not exist.

pub mod categories;
pub mod password_reset_tokens;
pub mod refresh_tokens;
pub mod repository;
pub mod transfers;
pub mod users;
pub mod wallets;
