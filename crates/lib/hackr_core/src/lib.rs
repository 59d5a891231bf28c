//! # hackr_core
//!
//! Core domain logic for hackr: credential storage, bearer tokens, the
//! request-level auth gateway, and the append-only audit log.

pub mod audit;
pub mod auth;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
