//! Module for core business logic services.
//!
//! This module holds the user profile service and the outbound notification
//! channel used by the identity flows.

pub mod email_service;
pub mod notifier;
pub mod user_service;
