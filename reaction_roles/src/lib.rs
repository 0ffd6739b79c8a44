//! # Reaction Roles
//!
//! Grants a guild role when a member reacts to a tracked message and revokes
//! it when the reaction is removed. Mapping state lives in `role_mappings`;
//! this crate wires it to the chat platform and the process lifecycle.
//!
//! ## Core Components
//!
//! - **events**: Reaction notifications from the platform's event stream
//! - **gateway**: The platform operations used to look up members and change roles
//! - **handler**: Looks up each reaction and dispatches grants/revokes
//! - **lifecycle**: Loads the store at startup and saves it at shutdown
//! - **config** / **telemetry**: TOML configuration and tracing setup
//!
//! ## Design Philosophy
//!
//! - **Read-only hot path**: Reaction handling never mutates the store or touches disk
//! - **Fire-and-forget**: Role changes are dispatched, never awaited or retried
//! - **Available over durable**: Persistence failures are logged, never fatal

pub mod config;
pub mod events;
pub mod gateway;
pub mod handler;
pub mod lifecycle;
pub mod telemetry;

pub use config::*;
pub use events::*;
pub use gateway::*;
pub use handler::*;
pub use lifecycle::*;
pub use role_mappings;
