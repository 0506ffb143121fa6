//! Middleware module
//!
//! Contains Tower middleware for CORS handling and API-key checks.

pub mod auth;
pub mod cors;
