//! End-to-end tests against a running server.
//!
//! Start the server and its database, then run with: cargo test -- --ignored

mod api_tests;
mod common;
