//! Indoor Comfort advisor core.
//!
//! Turns a room's environment snapshot into validated appliance settings
//! via a remote generative model, keeps the latest result in a
//! concurrently readable store refreshed on a fixed interval, and routes
//! free-form chat between a conversational reply and a recommendation
//! action.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod mock;
pub mod model;
pub mod prompt;
pub mod refresh;
pub mod router;
pub mod schema;
pub mod store;

pub use client::RecommendationClient;
pub use error::{AdvisorError, AdvisorResult, FailureKind, ValidationError};
pub use model::{GeminiClient, GenerativeModel};
pub use refresh::{Advisor, CycleOutcome, RoomContext, SharedEnvironment};
pub use router::{IntentRouter, RecommendAction, RouteOutcome};
pub use schema::{RecommendationContract, build_schema};
pub use store::RecommendationStore;
