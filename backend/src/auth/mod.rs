//! Identity module: account registration, email verification, login and
//! password reset.
//!
//! Verification and reset links carry signed, expiring tokens. Only the most
//! recently issued token of an account is ever accepted, and at most once.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod service;
