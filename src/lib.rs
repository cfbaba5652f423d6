//! Backend for a developer social network: accounts, developer profiles
//! (skills, experience, education, social links), posts and a follow graph,
//! stored in MongoDB and served as a JSON API.
//!
//! The `store` module is the client-side counterpart: it mirrors the server
//! payload shapes and implements the pure state transitions a native client
//! uses to cache the current user.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;
