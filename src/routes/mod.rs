//! The request handlers, grouped by resource.

pub mod auth;
pub mod categories;
pub mod transactions;
pub mod users;
