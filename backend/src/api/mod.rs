//! Central module for organizing the application's API endpoints.
//!
//! Identity routes (signup, verification, login, password reset) live in
//! `crate::auth`; this module holds the shared response envelope and the
//! user profile endpoints.

pub mod common;
pub mod user;
