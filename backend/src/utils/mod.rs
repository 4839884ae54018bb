//! Collection of general utility functions and common traits.
//!
//! Token signing and password hashing live here so that services can take
//! them as injected dependencies.

pub mod jwt;
pub mod password;
