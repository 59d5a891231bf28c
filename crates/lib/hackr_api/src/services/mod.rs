//! Request orchestration between handlers and the core services.

pub mod auth;
pub mod logs;
