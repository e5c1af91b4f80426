//! rustbb/crates/api-adapters/src/lib.rs
//!
//! The HTTP surface over the `services` engines. The axum router is gated
//! behind the `web-axum` feature so headless embedders can depend on this
//! crate without pulling in the web stack.

#[cfg(feature = "web-axum")]
pub mod web;
