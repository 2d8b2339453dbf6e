//! Indoor Comfort API - library crate for the HTTP service.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `ic-e2e-tests`) can reach `AppState`, `build_router` and the
//! normalization helpers.

pub mod config;
pub mod error;
pub mod normalize;
pub mod routes;
pub mod state;
