//! Trip itinerary service: paginated PDF export of rendered itinerary
//! snapshots, an SMTP mail relay, trip summaries and the community feed.
//!
//! The binary in `main.rs` wires these together behind [`api::router`].

pub mod api;
pub mod backend;
pub mod community;
pub mod config;
pub mod error;
pub mod export;
pub mod itinerary;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use state::AppState;
