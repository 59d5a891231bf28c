//! Domain models shared by the store, auth, and audit layers.

pub mod audit;
pub mod auth;
